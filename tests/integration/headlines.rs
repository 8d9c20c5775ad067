use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use quill::config::ScraperConfig;
use quill::error::ScrapeError;
use quill::headlines::{self, Headline};
use tempfile::TempDir;
use tokio::net::TcpListener;

const FRONT_PAGE: &str = r#"<html><body>
<span class="titleline"><a href="https://one.example/">First, with comma</a></span>
<span class="titleline"><a href="item?id=2">Second "quoted"</a></span>
</body></html>"#;

/// Serve a fixture page on an ephemeral port and return its base URL.
async fn serve() -> String {
    let app = Router::new()
        .route("/", get(|| async { FRONT_PAGE }))
        .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(url: String, dir: &TempDir) -> ScraperConfig {
    ScraperConfig {
        url,
        output_dir: dir.path().display().to_string(),
        ..ScraperConfig::default()
    }
}

#[tokio::test]
async fn scrape_writes_numbered_rows() {
    let base = serve().await;
    let dir = TempDir::new().unwrap();

    let (count, path) = headlines::run(&config(format!("{base}/"), &dir))
        .await
        .unwrap();
    assert_eq!(count, 2);
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("news_headlines_"), "{name}");
    assert!(name.ends_with(".csv"));
    assert_eq!(name.len(), "news_headlines_YYYYmmdd_HHMMSS.csv".len());

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "S.No,Title,Link",
            "1,\"First, with comma\",https://one.example/",
            "2,\"Second \"\"quoted\"\"\",item?id=2",
        ]
    );
}

#[tokio::test]
async fn non_200_is_reported_without_writing() {
    let base = serve().await;
    let dir = TempDir::new().unwrap();

    let err = headlines::run(&config(format!("{base}/down"), &dir))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Status(503)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_page_is_a_status_error() {
    let base = serve().await;
    let err = headlines::fetch(&format!("{base}/nowhere"), "test-agent")
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Status(404)));
}

#[test]
fn empty_result_still_has_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    headlines::write_csv(&path, &[]).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), vec!["S.No,Title,Link"]);
}

#[test]
fn missing_link_is_an_empty_cell() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rows.csv");
    let rows = [Headline {
        index: 1,
        title: "No link".into(),
        link: None,
    }];
    headlines::write_csv(&path, &rows).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().nth(1), Some("1,No link,"));
}
