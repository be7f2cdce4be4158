//! Analyze command - score one product and store the result

use anyhow::{Context, Result};

use super::{GlobalOpts, build_doctor, print_analysis, print_json};
use crate::args::AnalyzeArgs;

pub async fn execute(args: AnalyzeArgs, global: GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let doctor = build_doctor(&config).await?;

    tracing::info!(
        tenant_id = %args.tenant,
        product_id = %args.product,
        "Analyzing product"
    );

    let analysis = doctor
        .analyze(&args.tenant, &args.product)
        .await
        .with_context(|| format!("Analysis failed for product {}", args.product))?;

    if args.json {
        print_json(&analysis)?;
    } else {
        println!("Analysis Results");
        println!("================");
        println!();
        print_analysis(&analysis);
    }

    Ok(())
}
