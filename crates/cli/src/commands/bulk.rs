//! Bulk command - analyze many products, continuing past failures

use anyhow::{Context, Result};

use super::{GlobalOpts, build_doctor, print_json};
use crate::args::BulkArgs;

pub async fn execute(args: BulkArgs, global: GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let doctor = build_doctor(&config).await?;

    let result = if args.all {
        doctor
            .bulk_analyze_all(&args.tenant)
            .await
            .context("Failed to list catalog products")?
    } else {
        doctor.bulk_analyze(&args.tenant, &args.products).await
    };

    tracing::info!(
        tenant_id = %args.tenant,
        succeeded = result.succeeded,
        failed = result.failed,
        "Bulk analysis complete"
    );

    if args.json {
        print_json(&result)?;
    } else {
        println!("Bulk Analysis");
        println!("=============");
        println!();
        println!("Succeeded: {}", result.succeeded);
        println!("Failed:    {}", result.failed);

        if !result.errors.is_empty() {
            println!();
            println!("Errors:");
            for error in &result.errors {
                println!("  - {}: {}", error.product_id, error.error_message);
            }
        }
    }

    Ok(())
}
