//! Review command - sign off on a stored result

use anyhow::{Context, Result, bail};

use super::{GlobalOpts, build_doctor};
use crate::args::ReviewArgs;

pub async fn execute(args: ReviewArgs, global: GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let doctor = build_doctor(&config).await?;

    let updated = doctor
        .review(&args.tenant, &args.product, &args.reviewer, args.notes)
        .await
        .context("Failed to record review")?;

    if !updated {
        bail!(
            "No analysis found for product {} (tenant {})",
            args.product,
            args.tenant
        );
    }

    println!("Marked {} as reviewed by {}", args.product, args.reviewer);
    Ok(())
}
