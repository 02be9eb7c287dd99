mod config;
mod engine;
mod models;
mod pipeline;
mod source;
mod transfer;
mod utils;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::engine::{compute_stats, filter_opportunities};
use crate::models::{
    Category, Marketplace, Opportunity, OpportunityFilters, OpportunityStats, OpportunityStatus,
    SearchParams,
};
use crate::pipeline::Pipeline;
use crate::transfer::{read_opportunities, write_opportunities};
use crate::utils::{fmt_money, truncate};

#[derive(Parser)]
#[command(name = "flip-scout", about = "Local marketplace resale opportunity finder", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Search marketplaces and rank listings by resale opportunity
    Search {
        /// What to look for, e.g. "nintendo switch"
        query: String,

        /// City to search in (default from config)
        #[arg(long)]
        city: Option<String>,

        /// Marketplaces to include (repeatable or comma-separated)
        #[arg(short = 'm', long = "marketplace", value_delimiter = ',')]
        marketplaces: Vec<Marketplace>,

        /// Only keep these categories
        #[arg(short = 'c', long = "category", value_delimiter = ',')]
        categories: Vec<Category>,

        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// Seed for simulated listings
        #[arg(long)]
        seed: Option<u64>,

        /// Write an export file with the results
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Filter a saved opportunity file
    Filter {
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Summarise a saved opportunity file
    Stats { file: PathBuf },

    /// Update status, prices or notes of one opportunity in a saved file
    Track {
        file: PathBuf,
        id: String,

        #[arg(short, long)]
        status: Option<OpportunityStatus>,

        #[arg(long)]
        purchase_price: Option<f64>,

        #[arg(long)]
        sale_price: Option<f64>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List marketplaces, categories and statuses
    Labels,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Title contains (case-insensitive)
    #[arg(short, long)]
    query: Option<String>,

    /// Location contains (case-insensitive)
    #[arg(long)]
    city: Option<String>,

    #[arg(short = 'm', long = "marketplace", value_delimiter = ',')]
    marketplaces: Vec<Marketplace>,

    #[arg(short = 'c', long = "category", value_delimiter = ',')]
    categories: Vec<Category>,

    #[arg(long)]
    min_profit: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    #[arg(long)]
    min_score: Option<u8>,

    #[arg(short = 's', long = "status", value_delimiter = ',')]
    status: Vec<OpportunityStatus>,
}

impl From<FilterArgs> for OpportunityFilters {
    fn from(a: FilterArgs) -> Self {
        OpportunityFilters {
            query: a.query,
            city: a.city,
            marketplaces: a.marketplaces,
            categories: a.categories,
            min_profit: a.min_profit,
            max_price: a.max_price,
            min_score: a.min_score,
            status: a.status,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "flip_scout=info,warn",
        1 => "flip_scout=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Search {
            query,
            city,
            marketplaces,
            categories,
            max_results,
            seed,
            out,
        } => {
            let _t = utils::Timer::start(format!("Search '{}'", query));

            let params = SearchParams {
                query,
                city: city.unwrap_or_else(|| config.search.default_city.clone()),
                marketplaces: if marketplaces.is_empty() {
                    config.search.default_marketplaces.clone()
                } else {
                    marketplaces
                },
                categories,
                max_results: max_results.or(config.search.max_results),
            };

            let source = source::from_config(&config.source, seed)?;
            let outcome = Pipeline::new(config, source).search(&params).await?;
            if outcome.errors > 0 {
                warn!("{} listings skipped, see log above", outcome.errors);
            }

            print_opportunities(&outcome.opportunities);
            print_stats(&outcome.stats);

            if let Some(path) = out {
                write_opportunities(&path, &outcome.opportunities)?;
                info!("Wrote {} opportunities to {:?}", outcome.opportunities.len(), path);
            }
        }

        Command::Filter { file, filters, out } => {
            let opportunities = read_opportunities(&file)?;
            let filters = OpportunityFilters::from(filters);
            if filters.is_empty() {
                info!("No filters given, keeping all opportunities");
            }
            let kept = filter_opportunities(&opportunities, &filters);
            info!("{} of {} opportunities match", kept.len(), opportunities.len());

            print_opportunities(&kept);
            print_stats(&compute_stats(&kept));

            if let Some(path) = out {
                write_opportunities(&path, &kept)?;
            }
        }

        Command::Stats { file } => {
            let opportunities = read_opportunities(&file)?;
            print_stats(&compute_stats(&opportunities));
        }

        Command::Track {
            file,
            id,
            status,
            purchase_price,
            sale_price,
            notes,
        } => {
            let mut opportunities = read_opportunities(&file)?;
            let Some(opp) = opportunities.iter_mut().find(|o| o.id == id) else {
                bail!("No opportunity with id '{}' in {:?}", id, file);
            };

            let now = Utc::now();
            if let Some(status) = status {
                info!("{}: {} → {}", id, opp.status, status);
                opp.set_status(status, now);
            }
            if let Some(price) = purchase_price {
                opp.record_purchase(price, now);
            }
            if let Some(price) = sale_price {
                opp.record_sale(price, now);
            }
            if let Some(notes) = notes {
                opp.set_notes(notes, now);
            }

            if let Some(profit) = opp.actual_profit {
                println!("{}: actual profit {}", id, fmt_money(profit));
            }
            write_opportunities(&file, &opportunities)?;
            println!("Updated {} in {:?}", id, file);
        }

        Command::Labels => {
            println!("Marketplaces:");
            for m in Marketplace::ALL {
                println!("  {:<12} {}", m, m.label());
            }
            println!("Categories:");
            for c in Category::ALL {
                println!("  {:<12} {}", c, c.label());
            }
            println!("Statuses:");
            for s in OpportunityStatus::ALL {
                println!("  {:<12} {}", s, s.label());
            }
        }
    }

    Ok(())
}

fn print_opportunities(opportunities: &[Opportunity]) {
    if opportunities.is_empty() {
        println!("No opportunities found.");
        return;
    }

    println!(
        "{:<6} {:>5}  {:<7} {:<30} {:>10} {:>10} {:>7}  {:<6} {:<10} {:<9}",
        "ID", "SCORE", "URGENCY", "TITLE", "PRICE", "PROFIT", "MARGIN", "CONF", "SOURCE", "STATUS"
    );
    for o in opportunities {
        println!(
            "{:<6} {:>5}  {:<7} {:<30} {:>10} {:>10} {:>6.0}%  {:<6} {:<10} {:<9}",
            truncate(&o.id, 6),
            o.score,
            o.urgency,
            truncate(&o.listing.title, 30),
            fmt_money(o.listing.price),
            fmt_money(o.profit_analysis.estimated_profit),
            o.profit_analysis.profit_margin,
            o.profit_analysis.confidence,
            o.listing.source,
            o.status,
        );
    }
}

fn print_stats(stats: &OpportunityStats) {
    println!("─────────────────────────────────");
    println!("  Opportunities    : {}", stats.total_opportunities);
    println!("  Potential profit : {}", fmt_money(stats.total_potential_profit));
    println!("  Average score    : {:.1}", stats.avg_score);
    println!("─────────────────────────────────");
    for (status, n) in &stats.by_status {
        println!("  {:<16} : {}", status.label(), n);
    }
    println!("─────────────────────────────────");
    for (marketplace, n) in &stats.by_marketplace {
        println!("  {:<20} : {}", marketplace.label(), n);
    }
    println!("─────────────────────────────────");
}
