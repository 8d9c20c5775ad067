use quill::config::{Config, listen_addr};
use quill::error::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn empty_file_uses_defaults() {
    let cfg = Config::from_toml("").unwrap();
    assert_eq!(cfg.addr, "127.0.0.1:5000");
    assert_eq!(cfg.db_path, "sqlite://blog.db");
    assert_eq!(cfg.session.cookie_name, "quill_session");
    assert!(!cfg.session.secure_cookies);
    assert_eq!(cfg.session.idle_timeout_mins, None);
    assert_eq!(cfg.scraper.url, "https://news.ycombinator.com/");
    assert_eq!(cfg.scraper.selector, ".titleline a");
    assert_eq!(cfg.scraper.output_dir, ".");
    assert_eq!(cfg.scraper.file_prefix, "news_headlines");
}

#[test]
fn sections_override_defaults() {
    let toml = r#"addr = ":8080"
db_path = "sqlite:///var/lib/quill/blog.db"
[session]
secure_cookies = true
idle_timeout_mins = 30
[scraper]
selector = "h2 a"
"#;
    let cfg = Config::from_toml(toml).unwrap();
    assert_eq!(cfg.addr, ":8080");
    assert_eq!(cfg.db_path, "sqlite:///var/lib/quill/blog.db");
    assert!(cfg.session.secure_cookies);
    assert_eq!(cfg.session.idle_timeout_mins, Some(30));
    assert_eq!(cfg.session.cookie_name, "quill_session");
    assert_eq!(cfg.scraper.selector, "h2 a");
    assert_eq!(cfg.scraper.file_prefix, "news_headlines");
}

#[test]
fn placeholders_are_expanded() {
    let mut secret = NamedTempFile::new().unwrap();
    writeln!(secret, "postgres://blog@db/blog").unwrap();
    let path = std::env::var("PATH").unwrap();

    let toml = format!(
        "db_path = \"$FILE{{{}}}\"\n[scraper]\noutput_dir = \"$ENV{{PATH}}\"\n",
        secret.path().display()
    );
    let cfg = Config::from_toml(&toml).unwrap();
    assert_eq!(cfg.db_path, "postgres://blog@db/blog");
    assert_eq!(cfg.scraper.output_dir, path);
}

#[test]
fn unknown_variable_is_an_error() {
    let err = Config::from_toml("addr = \"$ENV{QUILL_SURELY_UNSET_VARIABLE}\"").unwrap_err();
    assert!(matches!(err, ConfigError::Placeholder(_)));
}

#[test]
fn missing_file_is_an_error() {
    let err = Config::from_file("/nonexistent/quill.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("/nonexistent/quill.toml"));
}

#[test]
fn malformed_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "addr = [").unwrap();
    let err = Config::from_file(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn no_file_means_defaults() {
    let cfg = Config::load(None).unwrap();
    assert_eq!(cfg.addr, "127.0.0.1:5000");
}

#[test]
fn listen_addresses_are_normalised() {
    assert_eq!(listen_addr("127.0.0.1:5000"), "127.0.0.1:5000");
    assert_eq!(listen_addr(":8080"), "0.0.0.0:8080");
    assert_eq!(listen_addr("8080"), "0.0.0.0:8080");
    assert_eq!(listen_addr("localhost:5000"), "localhost:5000");
}
