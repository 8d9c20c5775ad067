//! One-shot headline scraper: fetch a page, pick headline links with a CSS
//! selector and write them to a timestamped CSV file.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;

/// Column names of the output file, in order.
pub const CSV_HEADER: [&str; 3] = ["S.No", "Title", "Link"];

/// One row of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headline {
    /// Position on the page, starting at 1.
    pub index: usize,
    pub title: String,
    /// The `href` attribute; written as an empty cell when absent.
    pub link: Option<String>,
}

/// Fetch `url` and return its body. Anything other than `200 OK` is an
/// error carrying the status code; no retry is attempted.
///
/// # Errors
///
/// [`ScrapeError::Http`] on transport failure, [`ScrapeError::Status`] on a
/// non-200 response.
#[tracing::instrument(skip(user_agent))]
pub async fn fetch(url: &str, user_agent: &str) -> Result<String, ScrapeError> {
    let client = reqwest::Client::builder().user_agent(user_agent).build()?;
    let response = client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(ScrapeError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}

/// Every element matching `selector`, in document order. The title is the
/// element's text fragments, each trimmed, joined without separators.
///
/// # Errors
///
/// [`ScrapeError::Selector`] if `selector` is not valid CSS.
pub fn parse_headlines(html: &str, selector: &str) -> Result<Vec<Headline>, ScrapeError> {
    let parsed = Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&parsed)
        .enumerate()
        .map(|(i, element)| Headline {
            index: i + 1,
            title: element.text().map(str::trim).collect(),
            link: element.value().attr("href").map(str::to_string),
        })
        .collect())
}

/// `<prefix>_<YYYYmmdd_HHMMSS>.csv`
#[must_use]
pub fn output_file_name(prefix: &str, at: NaiveDateTime) -> String {
    format!("{prefix}_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write the header row followed by one row per headline. An existing file
/// is overwritten.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_csv(path: &Path, headlines: &[Headline]) -> Result<(), ScrapeError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for headline in headlines {
        writer.serialize(headline)?;
    }
    writer.flush()?;
    Ok(())
}

/// Fetch, parse and write in one go, naming the file after the current
/// local time. Returns the number of rows written and the file path.
///
/// # Errors
///
/// Any [`ScrapeError`] from the individual steps.
pub async fn run(cfg: &ScraperConfig) -> Result<(usize, PathBuf), ScrapeError> {
    let body = fetch(&cfg.url, &cfg.user_agent).await?;
    let headlines = parse_headlines(&body, &cfg.selector)?;
    tracing::debug!(count = headlines.len(), "parsed headlines");

    let path = Path::new(&cfg.output_dir)
        .join(output_file_name(&cfg.file_prefix, Local::now().naive_local()));
    write_csv(&path, &headlines)?;
    tracing::info!(path = %path.display(), count = headlines.len(), "wrote headlines");
    Ok((headlines.len(), path))
}
