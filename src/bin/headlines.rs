use std::process::ExitCode;

use clap::Parser;

use quill::config::{Config, ScraperConfig};
use quill::error::ScrapeError;
use quill::headlines;

#[derive(Parser)]
#[command(name = "headlines", version, about = "Save a page's headlines to a CSV file")]
struct Args {
    /// Path to the configuration file
    #[arg(long, env = "QUILL_CONFIG")]
    config: Option<String>,

    /// Page to scrape
    #[arg(long)]
    url: Option<String>,

    /// CSS selector matching the headline links
    #[arg(long)]
    selector: Option<String>,

    /// Directory the CSV file is written to
    #[arg(long)]
    output_dir: Option<String>,

    /// File name prefix; the timestamp and `.csv` are appended
    #[arg(long)]
    file_prefix: Option<String>,

    /// User-Agent header sent with the request
    #[arg(long)]
    user_agent: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Flags win over the configuration file.
    fn apply(self, cfg: &mut ScraperConfig) {
        if let Some(url) = self.url {
            cfg.url = url;
        }
        if let Some(selector) = self.selector {
            cfg.selector = selector;
        }
        if let Some(dir) = self.output_dir {
            cfg.output_dir = dir;
        }
        if let Some(prefix) = self.file_prefix {
            cfg.file_prefix = prefix;
        }
        if let Some(agent) = self.user_agent {
            cfg.user_agent = agent;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    quill::init_tracing("quill=warn", args.log_json);

    let mut cfg = Config::load(args.config.as_deref())?.scraper;
    args.apply(&mut cfg);

    match headlines::run(&cfg).await {
        Ok((count, path)) => {
            println!(
                "Scraping complete! {count} headlines saved to {}",
                path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ScrapeError::Status(code)) => {
            println!("Failed to retrieve the page. Status code: {code}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
