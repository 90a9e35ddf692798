use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use folio::config::{self, Config};
use folio::content::ordering::{sort_posts_by_published_date, sort_projects_for_listing, sort_services};
use folio::content::{CachedContentClient, DEFAULT_ABOUT_SLUG};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Print normalized content from a CMS API, preferring prefetched snapshots")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./folio.yaml or $XDG_CONFIG_HOME/folio/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Content API base URL (overrides config and environment)
  #[arg(long)]
  base_url: Option<String>,

  /// Snapshot directory (overrides config)
  #[arg(long)]
  cache_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Blog posts, newest first
  Posts,
  /// A single blog post
  Post { slug_or_id: String },
  /// Portfolio projects in listing order
  Portfolio,
  /// A single portfolio project
  Project { slug_or_id: String },
  /// Services in listing order
  Services,
  /// A single service
  Service { slug: String },
  /// About content
  About {
    #[arg(long, default_value = DEFAULT_ABOUT_SLUG)]
    slug: String,
  },
  /// Homepage sections
  Homepage,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Command line wins over file and environment
  if let Some(raw) = args.base_url.as_deref() {
    config.api.base_url = Some(config::parse_base_url(raw)?);
  }
  if let Some(dir) = args.cache_dir {
    config.cache_dir = dir;
  }

  let _guard = init_tracing(config.log_file.as_deref())?;

  let client = CachedContentClient::new(&config)?;
  run(&client, args.command).await
}

async fn run(client: &CachedContentClient, command: Command) -> Result<()> {
  match command {
    Command::Posts => print_json(&sort_posts_by_published_date(&client.posts().await?)),
    Command::Post { slug_or_id } => {
      let post = client
        .post(&slug_or_id)
        .await?
        .ok_or_else(|| eyre!("No post found for '{}'", slug_or_id))?;
      print_json(&post)
    }
    Command::Portfolio => print_json(&sort_projects_for_listing(&client.portfolio().await?)),
    Command::Project { slug_or_id } => {
      let project = client
        .project(&slug_or_id)
        .await?
        .ok_or_else(|| eyre!("No portfolio project found for '{}'", slug_or_id))?;
      print_json(&project)
    }
    Command::Services => print_json(&sort_services(&client.services().await?)),
    Command::Service { slug } => {
      let service = client
        .service(&slug)
        .await?
        .ok_or_else(|| eyre!("No service found for '{}'", slug))?;
      print_json(&service)
    }
    Command::About { slug } => print_json(&client.about(&slug).await?),
    Command::Homepage => print_json(&client.homepage().await?),
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let json = serde_json::to_string_pretty(value)?;
  println!("{}", json);
  Ok(())
}

/// Log to stderr, or to `log_file` when configured. Keep the guard alive
/// until exit so buffered file output is flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  match log_file {
    Some(path) => {
      let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
      let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
      std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

      let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
      Ok(Some(guard))
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
      Ok(None)
    }
  }
}
