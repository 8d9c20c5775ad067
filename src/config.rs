use regex::{Captures, Regex};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::error::ConfigError;

fn default_addr() -> String {
    "127.0.0.1:5000".into()
}

fn default_db_path() -> String {
    "sqlite://blog.db".into()
}

fn default_cookie_name() -> String {
    "quill_session".into()
}

fn default_scrape_url() -> String {
    "https://news.ycombinator.com/".into()
}

fn default_selector() -> String {
    ".titleline a".into()
}

fn default_output_dir() -> String {
    ".".into()
}

fn default_file_prefix() -> String {
    "news_headlines".into()
}

fn default_user_agent() -> String {
    concat!("quill-headlines/", env!("CARGO_PKG_VERSION")).into()
}

/// Replace `$ENV{NAME}` with the environment variable and `$FILE{path}` with
/// the contents of the file. Environment placeholders are expanded first, so
/// a file path may itself come from the environment.
fn expand_placeholders(text: &str) -> Result<String, ConfigError> {
    let env_re = Regex::new(r"\$ENV\{([^}]+)\}")
        .map_err(|e| ConfigError::Placeholder(e.to_string()))?;
    let file_re = Regex::new(r"\$FILE\{([^}]+)\}")
        .map_err(|e| ConfigError::Placeholder(e.to_string()))?;

    let text = replace_all(&env_re, text, |caps| {
        std::env::var(&caps[1])
            .map_err(|e| ConfigError::Placeholder(format!("$ENV{{{}}}: {e}", &caps[1])))
    })?;
    replace_all(&file_re, &text, |caps| {
        std::fs::read_to_string(&caps[1])
            .map(|s| s.trim_end_matches(['\r', '\n']).to_string())
            .map_err(|e| ConfigError::Placeholder(format!("$FILE{{{}}}: {e}", &caps[1])))
    })
}

fn replace_all<F>(re: &Regex, text: &str, mut value: F) -> Result<String, ConfigError>
where
    F: FnMut(&Captures<'_>) -> Result<String, ConfigError>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&text[last..m.start()]);
        out.push_str(&value(&caps)?);
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Normalise a listen address: `host:port` is used as is, while `:port` and
/// a bare `port` bind every interface.
#[must_use]
pub fn listen_addr(raw: &str) -> String {
    if raw.parse::<SocketAddr>().is_ok() {
        raw.to_string()
    } else if let Some(port) = raw.strip_prefix(':') {
        format!("0.0.0.0:{port}")
    } else if raw.chars().all(|c| c.is_ascii_digit()) {
        format!("0.0.0.0:{raw}")
    } else {
        raw.to_string()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub secure_cookies: bool,
    /// Expire a session after this many idle minutes. Without it the cookie
    /// lives for the browser session.
    #[serde(default)]
    pub idle_timeout_mins: Option<i64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ScraperConfig {
    #[serde(default = "default_scrape_url")]
    pub url: String,
    #[serde(default = "default_selector")]
    pub selector: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            db_path: default_db_path(),
            session: SessionConfig::default(),
            scraper: ScraperConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure_cookies: false,
            idle_timeout_mins: None,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: default_scrape_url(),
            selector: default_selector(),
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// expanded, or the result is not valid configuration.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse configuration text after placeholder expansion.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder cannot be expanded or the text is
    /// not valid configuration.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let text = expand_placeholders(text)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load `path` when given, otherwise fall back to the defaults.
    ///
    /// # Errors
    ///
    /// See [`Config::from_file`].
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
