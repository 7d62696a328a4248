// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load settings (defaults <- YAML file <- flags) and set up logging
// 3. Dispatch to the crawl or pipeline handler
// 4. Print the report as a summary or JSON
// 5. Exit with proper code (0 = success, 2 = error)
//
// Neither exercise "fails" because of its data: a missing page or the end
// of the tweet stream is reported, not turned into an error exit.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - settings and validation
mod crawl;         // src/crawl/ - rate-limited recursive crawler
mod logging;       // src/logging.rs - tracing subscriber setup
mod pipeline;      // src/pipeline/ - producer/consumer pipeline

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use url::Url;

use cli::{Cli, Commands};
use config::Settings;
use crawl::{CrawlEvent, CrawlOptions, CrawlReport, Crawler, Fetcher, MockFetcher, RateGate};
use pipeline::{Classifier, MockStream, PipelineReport, Verdict};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).with_context(|| {
        format!(
            "failed to load settings from {}",
            cli.config.as_deref().map(|p| p.display().to_string()).unwrap_or_default()
        )
    })?;
    cli.command.apply_to(&mut settings);
    settings.validate()?;

    match cli.command {
        Commands::Crawl { json, .. } => handle_crawl(&settings, json).await,
        Commands::Pipeline {
            sequential, json, ..
        } => handle_pipeline(&settings, sequential, json).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(settings: &Settings, json: bool) -> Result<i32> {
    let crawl = &settings.crawl;

    // The crawl root has to look like a URL, even for the mock website
    Url::parse(&crawl.root).map_err(|e| anyhow!("Invalid URL '{}': {}", crawl.root, e))?;

    let fetcher: Arc<dyn Fetcher> = match &crawl.site_map {
        Some(path) => {
            let site = MockFetcher::from_yaml_file(path)
                .with_context(|| format!("failed to load site map {}", path.display()))?;
            if site.is_empty() {
                return Err(anyhow!("site map {} has no pages", path.display()));
            }
            tracing::info!(pages = site.len(), path = %path.display(), "loaded site map");
            Arc::new(site)
        }
        None => Arc::new(MockFetcher::golang_org()),
    };

    let gate = Arc::new(RateGate::new(crawl.interval()));

    if !json {
        println!("🔍 Crawling: {}", crawl.root);
        println!(
            "📊 Max depth: {}, one fetch per {:?}",
            crawl.depth,
            gate.period()
        );
    }

    let options = CrawlOptions {
        max_concurrency: crawl.max_concurrency,
        fetch_signal: None,
        echo: !json,
    };
    let crawler = Arc::new(Crawler::new(fetcher, gate, options));
    let report = crawl::crawl_site(crawler, &crawl.root, crawl.depth).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_crawl_summary(&report);
    }
    Ok(0)
}

// Handles the 'pipeline' subcommand
async fn handle_pipeline(settings: &Settings, sequential: bool, json: bool) -> Result<i32> {
    let pipeline = &settings.pipeline;
    let stream = MockStream::sample(pipeline.produce_delay());
    let classifier = Classifier::new(&pipeline.topics, pipeline.classify_delay());

    if !json {
        println!(
            "🐦 Streaming {} tweet(s), looking for '{}' ({})",
            stream.remaining(),
            classifier.topic(),
            if sequential { "sequential" } else { "concurrent" }
        );
    }

    let report = if sequential {
        pipeline::run_sequential(stream, &classifier, !json).await
    } else {
        pipeline::run_pipeline(stream, &classifier, !json).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_pipeline_summary(&report, classifier.topic());
    }
    Ok(0)
}

fn print_crawl_summary(report: &CrawlReport) {
    println!();
    println!("{:<45} {:<7} {:<30}", "URL", "DEPTH", "RESULT");
    println!("{}", "=".repeat(82));

    for event in &report.events {
        let (depth, result) = match event {
            CrawlEvent::Found { depth, body, .. } => (*depth, format!("✅ {}", body)),
            CrawlEvent::Failed { depth, error, .. } => (*depth, format!("❌ {}", error)),
        };
        println!("{:<45} {:<7} {:<30}", event.url(), depth, result);
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Found: {}", report.found);
    println!("   ❌ Failed: {}", report.failed);
    println!("   📋 Fetches: {}", report.fetches);
    println!("Crawl took {}ms", report.elapsed_ms);
}

fn print_pipeline_summary(report: &PipelineReport, topic: &str) {
    let others = report
        .items
        .iter()
        .filter(|c| c.verdict == Verdict::Other)
        .count();

    println!();
    println!("📊 Summary:");
    println!("   💬 About {}: {}", topic, report.mentioning());
    println!("   🔇 Other: {}", others);
    println!("   📋 Total: {}", report.items.len());
    println!("Process took {}ms", report.elapsed_ms);
}
