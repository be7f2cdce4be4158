//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// feed-doctor: score product listings for content quality
#[derive(Parser, Debug)]
#[command(name = "feed-doctor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Override the catalog JSON file
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Override the SQLite results database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one product and store the result
    Analyze(AnalyzeArgs),

    /// Analyze many products, continuing past failures
    Bulk(BulkArgs),

    /// Show aggregate statistics for a tenant
    Stats(StatsArgs),

    /// List stored results for a tenant
    Results(ResultsArgs),

    /// Show the stored result for one product
    Result(ResultArgs),

    /// Mark a stored result as reviewed
    Review(ReviewArgs),

    /// Preview auto-fixes from a stored result
    Fix(FixArgs),

    /// Suggest a search-friendly product title
    SeoTitle(SeoTitleArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Tenant that owns the product
    #[arg(long)]
    pub tenant: String,

    /// Product ID
    #[arg(long)]
    pub product: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BulkArgs {
    /// Tenant that owns the products
    #[arg(long)]
    pub tenant: String,

    /// Product ID (repeatable)
    #[arg(long = "product", required_unless_present = "all", conflicts_with = "all")]
    pub products: Vec<String>,

    /// Analyze every product the catalog lists for the tenant
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Tenant to summarize
    #[arg(long)]
    pub tenant: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// Tenant to list
    #[arg(long)]
    pub tenant: String,

    /// Only results in this status (pending, analyzing, completed, failed)
    #[arg(long)]
    pub status: Option<String>,

    /// Minimum overall score
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_score: Option<u8>,

    /// Maximum overall score
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub max_score: Option<u8>,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ResultArgs {
    /// Tenant that owns the product
    #[arg(long)]
    pub tenant: String,

    /// Product ID
    #[arg(long)]
    pub product: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Tenant that owns the product
    #[arg(long)]
    pub tenant: String,

    /// Product ID
    #[arg(long)]
    pub product: String,

    /// Who reviewed the result
    #[arg(long)]
    pub reviewer: String,

    /// Free-form review notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct FixArgs {
    /// Tenant that owns the product
    #[arg(long)]
    pub tenant: String,

    /// Product ID
    #[arg(long)]
    pub product: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SeoTitleArgs {
    /// Current product name
    #[arg(long)]
    pub name: String,

    /// Category appended to the title
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./feed-doctor.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
