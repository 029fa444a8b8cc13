//! CLI entry point for known-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "known-rs")]
#[command(version)]
#[command(about = "A server-rendered notes app with an MDX blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.host)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Create a new MDX post
    New {
        /// Title of the new post
        title: String,

        /// Slug for the post (derived from the title if omitted)
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// List blog posts
    List,

    /// Print the pre-rendered paths and fallback policy
    Paths,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    // Initialize logging
    let filter = if cli.debug {
        "known_rs=debug,info"
    } else {
        "known_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    match cli.command {
        Commands::Server { port, ip } => {
            let known = known_rs::Known::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| known.config.server.host.clone());
            let port = port.unwrap_or(known.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            known_rs::server::start(&known, &ip, port).await?;
        }

        Commands::New { title, slug } => {
            let known = known_rs::Known::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            known_rs::commands::new::create_post(&known, &title, slug.as_deref())?;
        }

        Commands::List => {
            let known = known_rs::Known::new(&base_dir)?;
            known_rs::commands::list::run(&known)?;
        }

        Commands::Paths => {
            let known = known_rs::Known::new(&base_dir)?;
            known_rs::commands::paths::run(&known)?;
        }

        Commands::Version => {
            println!("known-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
