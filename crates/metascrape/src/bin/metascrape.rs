// ABOUTME: CLI binary for metascrape.
// ABOUTME: Scrapes one or more targets (or parses a local HTML file) and prints the metadata as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use futures::future::join_all;
use metascrape::{parse_meta, MetaRecord, ScrapeConfig, Scraper};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "metascrape")]
#[command(about = "Fetch pages and print their Open Graph, Twitter Card and App Links metadata")]
struct Args {
    /// Host to scrape, with or without http(s):// but without a path
    #[arg(long, conflicts_with_all = ["url", "html"])]
    host: Option<String>,

    /// Path to append to --host
    #[arg(long, requires = "host")]
    path: Option<String>,

    /// Full URL to scrape
    #[arg(long, conflicts_with = "html")]
    url: Option<String>,

    /// Parse a local HTML file instead of fetching
    #[arg(long)]
    html: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output compact JSON instead of pretty
    #[arg(long)]
    compact: bool,

    /// User-Agent header for requests
    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Refuse to fetch from private/local networks
    #[arg(long)]
    deny_private_networks: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long)]
    timing: bool,

    /// Additional URLs to scrape
    #[arg(conflicts_with = "html")]
    urls: Vec<String>,
}

impl Args {
    fn targets(&self) -> Vec<ScrapeConfig> {
        let mut targets = Vec::new();
        if let Some(host) = &self.host {
            targets.push(ScrapeConfig {
                host: Some(host.clone()),
                path: self.path.clone(),
                url: None,
            });
        }
        if let Some(url) = &self.url {
            targets.push(ScrapeConfig::url(url.clone()));
        }
        targets.extend(self.urls.iter().cloned().map(ScrapeConfig::url));
        targets
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn target_label(config: &ScrapeConfig) -> String {
    match (&config.url, &config.host, &config.path) {
        (Some(url), _, _) => url.clone(),
        (None, Some(host), Some(path)) => format!("{}{}", host, path),
        (None, Some(host), None) => host.clone(),
        _ => String::new(),
    }
}

async fn scrape_one(args: &Args, config: ScrapeConfig) -> Result<MetaRecord, metascrape::ScrapeError> {
    let mut builder = Scraper::builder()
        .config(config)
        .allow_private_networks(!args.deny_private_networks);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()?.scrape().await
}

/// Single success prints the bare record; anything else gets an envelope.
fn render(
    outcomes: Vec<(String, Result<MetaRecord, metascrape::ScrapeError>)>,
) -> serde_json::Value {
    if let [(_, Ok(record))] = outcomes.as_slice() {
        return json!(record);
    }

    let total = outcomes.len();
    let results: Vec<serde_json::Value> = outcomes
        .into_iter()
        .map(|(target, outcome)| match outcome {
            Ok(record) => json!({ "target": target, "ok": true, "record": record, "error": null }),
            Err(err) => json!({ "target": target, "ok": false, "record": null, "error": err.to_string() }),
        })
        .collect();
    let scraped = results.iter().filter(|r| r["ok"] == json!(true)).count();
    json!({
        "results": results,
        "total": total,
        "scraped": scraped,
        "failed": total - scraped,
    })
}

fn write_output(args: &Args, value: &serde_json::Value) -> anyhow::Result<()> {
    let rendered = if args.compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    let start = Instant::now();

    let (value, had_error) = if let Some(html_path) = &args.html {
        match fs::read_to_string(html_path) {
            Ok(html) => (json!(parse_meta(&html)), false),
            Err(e) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                return ExitCode::from(1);
            }
        }
    } else {
        let targets = args.targets();
        if targets.is_empty() {
            eprintln!("error: provide --host, --url, positional URLs, or --html");
            return ExitCode::from(1);
        }

        let labels: Vec<String> = targets.iter().map(target_label).collect();
        let outcomes = join_all(targets.into_iter().map(|t| scrape_one(&args, t))).await;
        let had_error = outcomes.iter().any(Result::is_err);
        for (label, outcome) in labels.iter().zip(&outcomes) {
            if let Err(err) = outcome {
                eprintln!("error scraping {}: {}", label, err);
            }
        }
        (render(labels.into_iter().zip(outcomes).collect()), had_error)
    };

    let mut had_error = had_error;
    if let Err(err) = write_output(&args, &value) {
        eprintln!("error: {:#}", err);
        had_error = true;
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", start.elapsed().as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
