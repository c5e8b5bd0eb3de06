use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feed_notifier::traits::Notify;
use feed_notifier::{
    Config, FetchConfig, FileStore, LogNotifier, NotificationPipeline, Poller, RssFeedSource,
};

#[derive(Parser)]
#[command(about = "Polls RSS/Atom feeds and notifies subscribers about new items")]
struct Cli {
    /// Path to the config file.
    #[arg(short = 'f', long, default_value = "./config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!("Starting feed notifier");
    let config = Config::load(&cli.config)
        .with_context(|| format!("read config {}", cli.config.display()))?;

    let store = Arc::new(
        FileStore::open(&config.data_file)
            .await
            .context("init state storage")?,
    );

    // The real outbound transport is wired in by deployments; the stock
    // binary logs every delivered item.
    let sink: Arc<dyn Notify> = Arc::new(LogNotifier::new());

    let fetch_config = FetchConfig::default();
    let mut pipeline = NotificationPipeline::new(sink);
    for feed in &config.feeds {
        let source = RssFeedSource::new(feed.url.clone(), &fetch_config)
            .with_context(|| format!("init feed source {}", feed.url))?;
        pipeline.add_poller(Poller::new(
            Arc::new(source),
            store.clone(),
            config.feed_interval(feed),
        ));
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_cancel.cancel();
        }
    });

    pipeline.run(cancel).await;

    info!("Shutdown");
    Ok(())
}
