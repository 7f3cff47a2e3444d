mod config;
mod errors;
mod models;
mod pipeline;
mod scraper;
mod server;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "sports-scraper", about = "KBO news and schedule scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape the Naver baseball news feed
    News {
        /// Maximum number of articles (default: news.feed_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Short news digest (news.digest_limit articles)
    Digest,

    /// Scrape the KBO game schedule
    Schedule,

    /// News feed and schedule, fetched concurrently
    All,

    /// Serve the JSON endpoints over HTTP
    Serve {
        /// Listen address (default: server.bind)
        #[arg(short, long, env = "SPORTS_BIND")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "sports_scraper=info,warn",
        1 => "sports_scraper=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let pipeline = Arc::new(Pipeline::new(config)?);

    match cli.command {
        Command::News { limit } => {
            let _t = utils::Timer::start("News feed");
            let limit = limit.unwrap_or(pipeline.config().news.feed_limit);
            print_json(&pipeline.news(limit).await)?;
        }

        Command::Digest => {
            let _t = utils::Timer::start("News digest");
            print_json(&pipeline.news(pipeline.config().news.digest_limit).await)?;
        }

        Command::Schedule => {
            let _t = utils::Timer::start("KBO schedule");
            print_json(&pipeline.schedule().await)?;
        }

        Command::All => {
            let _t = utils::Timer::start("News + schedule");
            print_json(&Arc::clone(&pipeline).run_all().await)?;
        }

        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| pipeline.config().server.bind.clone());
            info!("Serving sports-scraper on {}", bind);
            server::serve(pipeline, &bind).await?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
