//! Fix command - preview auto-fixes for an analyzed product

use anyhow::{Context, Result};

use super::{GlobalOpts, build_doctor, print_json};
use crate::args::FixArgs;

pub async fn execute(args: FixArgs, global: GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let doctor = build_doctor(&config).await?;

    let patch = doctor
        .auto_fix(&args.tenant, &args.product)
        .await
        .with_context(|| format!("Failed to build fixes for product {}", args.product))?;

    if args.json {
        return print_json(&patch);
    }

    if patch.is_empty() {
        println!("No auto-fixes apply to {}.", args.product);
        return Ok(());
    }

    println!("Auto-fix Preview");
    println!("================");
    println!();
    let applied = patch.applied.iter().map(|a| a.as_str()).collect::<Vec<_>>();
    println!("Applied: {}", applied.join(", "));

    if let Some(ref title) = patch.title {
        println!();
        println!("Title: {}", title);
    }
    if let Some(ref description) = patch.description {
        println!();
        println!("Description:");
        println!("{}", description);
    }

    Ok(())
}
