// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Resolve the crawl settings and collect the seed URLs
// 4. Crawl each seed with a fresh crawler, one after another
// 5. Print a summary (or JSON report)
// 6. Exit with proper code (0 = every seed saved pages, 1 = some seed saved
//    nothing, 2 = error)
//
// The process runs to completion and exits; whatever launches it (a queue
// consumer, a task runner, a shell) only has to pass seeds and an output dir.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod extract;
mod logging;
mod seeds;
mod sink;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::debug;

use cli::{Cli, Commands, CrawlArgs, Settings};
use crawl::{CrawlOutcome, Crawler};
use sink::{HttpPutUploader, NoopUploader, Uploader};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::setup_logging(cli.log_dir.as_deref()).context("failed to set up logging")?;

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: CrawlArgs) -> Result<i32> {
    let settings = args.resolve().context("invalid configuration")?;
    let seeds = seeds::collect_seeds(&args.urls, args.seeds.as_deref()).await?;
    if seeds.is_empty() {
        bail!("no seed URLs given; pass URLs as arguments or use --seeds");
    }

    let uploader = build_uploader(&settings)?;
    let mut outcomes = Vec::with_capacity(seeds.len());

    for seed in &seeds {
        if !args.json {
            println!("🔍 Crawling: {}", seed);
        }

        let mut crawler = Crawler::new(settings.crawl.clone(), uploader.clone())
            .context("failed to create crawler")?;
        let outcome = crawler
            .crawl(seed, &settings.output_dir)
            .await
            .with_context(|| format!("crawl of {} failed", seed))?;
        debug!(seed = %seed, state = ?crawler.state(), "crawler finished");

        if !args.json {
            println!(
                "📄 Crawled {} page(s) in {} wave(s)",
                outcome.crawled.len(),
                outcome.waves
            );
        }
        outcomes.push(outcome);
    }

    print_results(&outcomes, &settings, args.json)?;

    let empty_seeds = outcomes.iter().filter(|o| o.crawled.is_empty()).count();
    if empty_seeds > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn build_uploader(settings: &Settings) -> Result<Arc<dyn Uploader>> {
    match &settings.upload {
        Some(target) => {
            let client = settings
                .crawl
                .http_client()
                .context("failed to build upload client")?;
            Ok(Arc::new(HttpPutUploader::new(
                client,
                target.endpoint.clone(),
                target.bucket.clone(),
            )))
        }
        None => Ok(Arc::new(NoopUploader)),
    }
}

// Prints the results either as a table or JSON
fn print_results(outcomes: &[CrawlOutcome], settings: &Settings, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(outcomes)?;
        println!("{}", json_output);
    } else {
        print_table(outcomes, settings);
    }
    Ok(())
}

fn print_table(outcomes: &[CrawlOutcome], settings: &Settings) {
    println!();
    println!("{:<60} {:>8} {:>6}", "SEED", "PAGES", "WAVES");
    println!("{}", "=".repeat(76));

    for outcome in outcomes {
        // Truncate long seeds for display
        let seed_display = if outcome.seed.chars().count() > 57 {
            format!("{}...", outcome.seed.chars().take(57).collect::<String>())
        } else {
            outcome.seed.clone()
        };
        println!(
            "{:<60} {:>8} {:>6}",
            seed_display,
            outcome.crawled.len(),
            outcome.waves
        );
    }

    println!();

    let total_pages: usize = outcomes.iter().map(|o| o.crawled.len()).sum();
    let empty = outcomes.iter().filter(|o| o.crawled.is_empty()).count();

    println!("📊 Summary:");
    println!("   ✅ Pages saved: {}", total_pages);
    println!("   ⚠️  Seeds with no pages: {}", empty);
    println!("   📁 Output: {}", settings.output_dir.display());
}
