//! Stats command - aggregate scores for a tenant

use anyhow::{Context, Result};

use super::{GlobalOpts, build_doctor, print_json};
use crate::args::StatsArgs;

pub async fn execute(args: StatsArgs, global: GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let doctor = build_doctor(&config).await?;

    let stats = doctor
        .get_stats(&args.tenant)
        .await
        .context("Failed to compute statistics")?;

    if args.json {
        print_json(&stats)?;
        return Ok(());
    }

    println!("Feed Statistics: {}", args.tenant);
    println!("=================");
    println!();
    println!("Products:      {}", stats.total_products);
    println!("Analyzed:      {}", stats.analyzed_count);
    println!("Pending:       {}", stats.pending);
    println!("Average score: {:.2}", stats.average_score);
    println!();
    println!("Score distribution:");
    println!("  low    (<50)   {}", stats.low);
    println!("  medium (50-75) {}", stats.medium);
    println!("  high   (>75)   {}", stats.high);

    Ok(())
}
