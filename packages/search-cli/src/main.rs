//! Command-line entry point for one aggregated car search.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carscope::fetchers::HttpFetcher;
use carscope::insights::summarize;
use carscope::orchestrator::SearchOrchestrator;
use carscope::types::SearchFilters;

#[derive(Parser, Debug)]
#[command(name = "carscope", about = "Search car listings across marketplaces")]
struct Args {
    /// Car model, e.g. "Corolla"
    #[arg(long)]
    model: String,

    /// Brand, e.g. "Toyota"
    #[arg(long)]
    brand: Option<String>,

    /// Manufacturing year
    #[arg(long)]
    year: Option<i32>,

    /// Preferred location
    #[arg(long)]
    location: Option<String>,

    /// Minimum price in BDT
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum price in BDT
    #[arg(long)]
    max_price: Option<f64>,

    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut filters = SearchFilters::for_model(args.model);
    filters.brand = args.brand;
    filters.year = args.year;
    filters.location = args.location;
    filters.min_price = args.min_price;
    filters.max_price = args.max_price;

    let oracle: Arc<dyn carscope::traits::oracle::SearchOracle> =
        carscope::oracle::from_env().into();
    info!(oracle = oracle.name(), "starting search");

    let orchestrator = SearchOrchestrator::new(Arc::new(HttpFetcher::new()), oracle);
    let report = orchestrator.search(&filters).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Found {} listings ({} before filtering)",
        report.results.len(),
        report.analysis.total_found
    );
    for (i, listing) in report.results.iter().enumerate() {
        let flags = match (&listing.price_flag, listing.ai_insights.suspicious) {
            (Some(_), _) => " [price outlier]",
            (None, true) => " [suspicious]",
            (None, false) => "",
        };
        println!(
            "{:>3}. [{}] {} - {}{}",
            i + 1,
            listing.listing.platform,
            listing.listing.title,
            listing.listing.price_text,
            flags,
        );
    }

    if let Some(insights) = summarize(&report.results, &report.recommendations) {
        if let Some(range) = &insights.price_range {
            println!(
                "\nPrices: {:.0} - {:.0} (avg {:.0})",
                range.min, range.max, range.average
            );
        }
        for (platform, count) in &insights.platform_distribution {
            println!("  {platform}: {count}");
        }
        for recommendation in &insights.recommendations {
            println!("Tip: {recommendation}");
        }
    }

    Ok(())
}
