use crate::utils::{register, setup};
use quill::auth::{self, verify_password};
use quill::error::{BlogError, ValidationError};
use quill::models::{Credentials, Registration};

fn registration(username: &str, email: &str, password: &str) -> Registration {
    Registration {
        username: username.into(),
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn duplicate_username_or_email_is_rejected() {
    let storage = setup().await;
    let alice = register(&storage, "alice", "pw1").await;

    let same_name = auth::register(
        storage.as_ref(),
        &registration("alice", "other@example.com", "pw2"),
    )
    .await;
    assert!(matches!(same_name, Err(BlogError::DuplicateCredential)));

    let same_email = auth::register(
        storage.as_ref(),
        &registration("alicia", "alice@example.com", "pw2"),
    )
    .await;
    assert!(matches!(same_email, Err(BlogError::DuplicateCredential)));

    let stored = storage
        .find_user_by_username("alice")
        .await
        .unwrap()
        .expect("first user kept");
    assert_eq!(stored, alice);
    assert!(verify_password("pw1", &stored.password_hash));
    assert!(storage.find_user_by_username("alicia").await.unwrap().is_none());
}

#[tokio::test]
async fn password_is_stored_hashed() {
    let storage = setup().await;
    let user = register(&storage, "alice", "pw1").await;
    assert_ne!(user.password_hash, "pw1");
    assert!(user.password_hash.starts_with("$argon2"));
    assert!(verify_password("pw1", &user.password_hash));
    assert!(!verify_password("pw2", &user.password_hash));
}

#[tokio::test]
async fn login_resolves_identity() {
    let storage = setup().await;
    let user = register(&storage, "alice", "pw1").await;

    let identity = auth::login(
        storage.as_ref(),
        &Credentials {
            username: "alice".into(),
            password: "pw1".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(identity.user_id, user.id);
    assert_eq!(identity.username, "alice");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let storage = setup().await;
    register(&storage, "alice", "pw1").await;

    for (username, password) in [("alice", "wrong"), ("nobody", "pw1")] {
        let err = auth::login(
            storage.as_ref(),
            &Credentials {
                username: username.into(),
                password: password.into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BlogError::InvalidCredentials(ref u) if u == username));
        assert_eq!(err.to_string(), format!("invalid credentials for user: {username}"));
    }
}

#[tokio::test]
async fn blank_registration_is_rejected_before_lookup() {
    let storage = setup().await;
    let err = auth::register(storage.as_ref(), &registration("bob", " ", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BlogError::Validation(ValidationError::Empty("email"))
    ));
    assert!(storage.find_user_by_username("bob").await.unwrap().is_none());
}
