mod app;
mod config;
mod error;
mod identity;
mod reddit;
mod store;

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::app::{App, RunRequest};
use crate::reddit::client::FeedClient;
use crate::store::JsonFileStorage;

#[derive(Parser, Debug)]
#[command(name = "reddit-save-backup")]
#[command(about = "Incrementally back up your saved Reddit posts from the JSON feed")]
#[command(version)]
struct Args {
  /// URL of JSON RSS feed
  #[arg(long)]
  url: Option<String>,

  /// Username in the case of multiple accounts
  #[arg(long)]
  user: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .init();

  let args = Args::parse();
  let request = RunRequest {
    user: args.user,
    url: args.url,
  };

  let config = config::Config::load()?;
  let storage = JsonFileStorage::open(&config.config_dir)?;
  let client = FeedClient::new(&config)?;

  let app = App::new(storage);
  app
    .run(&request, |url| async move { client.fetch_saved(&url).await })
    .await?;

  Ok(())
}
