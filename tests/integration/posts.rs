use crate::utils::{draft, identity, register, setup};
use quill::error::BlogError;
use quill::posts;

#[tokio::test]
async fn dashboard_lists_only_own_posts_newest_first() {
    let storage = setup().await;
    let alice = identity(&register(&storage, "alice", "pw1").await);
    let bob = identity(&register(&storage, "bob", "pw2").await);

    let first = posts::create_post(storage.as_ref(), Some(&alice), &draft("First", "a"))
        .await
        .unwrap();
    posts::create_post(storage.as_ref(), Some(&bob), &draft("Bob's", "b"))
        .await
        .unwrap();
    let second = posts::create_post(storage.as_ref(), Some(&alice), &draft("Second", "c"))
        .await
        .unwrap();

    let mine = posts::dashboard(storage.as_ref(), Some(&alice)).await.unwrap();
    let ids: Vec<_> = mine.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(mine.iter().all(|p| p.user_id == alice.user_id));

    let all = posts::list_posts(storage.as_ref()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, second.id);
}

#[tokio::test]
async fn dashboard_requires_a_session() {
    let storage = setup().await;
    let err = posts::dashboard(storage.as_ref(), None).await.unwrap_err();
    assert!(matches!(err, BlogError::NotAuthenticated));
}

#[tokio::test]
async fn created_post_is_visible_with_owner() {
    let storage = setup().await;
    let alice = identity(&register(&storage, "alice", "pw1").await);

    let post = posts::create_post(storage.as_ref(), Some(&alice), &draft("Hello", "World"))
        .await
        .unwrap();
    assert_eq!(post.user_id, alice.user_id);
    assert_eq!(post.author, "alice");

    let dashboard = posts::dashboard(storage.as_ref(), Some(&alice)).await.unwrap();
    assert_eq!(dashboard, vec![post.clone()]);
    let public = posts::list_posts(storage.as_ref()).await.unwrap();
    assert_eq!(public, vec![post]);
}

#[tokio::test]
async fn non_owner_cannot_edit_or_delete() {
    let storage = setup().await;
    let alice = identity(&register(&storage, "alice", "pw1").await);
    let bob = identity(&register(&storage, "bob", "pw2").await);
    let post = posts::create_post(storage.as_ref(), Some(&alice), &draft("Hello", "World"))
        .await
        .unwrap();

    let edit = posts::edit_post(storage.as_ref(), Some(&bob), post.id, &draft("Pwned", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        edit,
        BlogError::NotAuthorized { user, post: p } if user == bob.user_id && p == post.id
    ));

    let form = posts::post_for_edit(storage.as_ref(), Some(&bob), post.id)
        .await
        .unwrap_err();
    assert!(matches!(form, BlogError::NotAuthorized { .. }));

    let delete = posts::delete_post(storage.as_ref(), Some(&bob), post.id)
        .await
        .unwrap_err();
    assert!(matches!(delete, BlogError::NotAuthorized { .. }));

    let stored = storage.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);
}

#[tokio::test]
async fn owner_edit_keeps_creation_time() {
    let storage = setup().await;
    let alice = identity(&register(&storage, "alice", "pw1").await);
    let post = posts::create_post(storage.as_ref(), Some(&alice), &draft("Hello", "World"))
        .await
        .unwrap();

    let edited = posts::edit_post(storage.as_ref(), Some(&alice), post.id, &draft("Hi", "There"))
        .await
        .unwrap();
    let stored = storage.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored, edited);
    assert_eq!(stored.title, "Hi");
    assert_eq!(stored.content, "There");
    assert_eq!(stored.created_at, post.created_at);
    assert_eq!(stored.user_id, alice.user_id);
}

#[tokio::test]
async fn owner_can_delete() {
    let storage = setup().await;
    let alice = identity(&register(&storage, "alice", "pw1").await);
    let post = posts::create_post(storage.as_ref(), Some(&alice), &draft("Hello", "World"))
        .await
        .unwrap();

    posts::delete_post(storage.as_ref(), Some(&alice), post.id)
        .await
        .unwrap();
    assert!(storage.get_post(post.id).await.unwrap().is_none());

    let again = posts::delete_post(storage.as_ref(), Some(&alice), post.id)
        .await
        .unwrap_err();
    assert!(matches!(again, BlogError::NotFound(id) if id == post.id));
}

#[tokio::test]
async fn checks_run_in_order() {
    let storage = setup().await;
    let alice = identity(&register(&storage, "alice", "pw1").await);

    let anonymous = posts::edit_post(storage.as_ref(), None, 999, &draft("x", ""))
        .await
        .unwrap_err();
    assert!(matches!(anonymous, BlogError::NotAuthenticated));

    let missing = posts::edit_post(storage.as_ref(), Some(&alice), 999, &draft("x", ""))
        .await
        .unwrap_err();
    assert!(matches!(missing, BlogError::NotFound(999)));
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let storage = setup().await;
    let alice = identity(&register(&storage, "alice", "pw1").await);
    let err = posts::create_post(storage.as_ref(), Some(&alice), &draft("   ", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::Validation(_)));
    assert!(posts::list_posts(storage.as_ref()).await.unwrap().is_empty());
}
