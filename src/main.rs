use clap::Parser;

use quill::config::Config;

#[derive(Parser)]
#[command(name = "quill", version, about = "A small multi-user blog server")]
struct Args {
    /// Path to the configuration file
    #[arg(long, env = "QUILL_CONFIG")]
    config: Option<String>,

    /// Listen address, overriding the configuration
    #[arg(long)]
    addr: Option<String>,

    /// Database URI, overriding the configuration
    #[arg(long)]
    db_path: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    quill::init_tracing("quill=info,tower_http=info", args.log_json);

    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        cfg.addr = addr;
    }
    if let Some(db_path) = args.db_path {
        cfg.db_path = db_path;
    }

    quill::server::run(cfg).await
}
