//! Results commands - read back stored analyses

use anyhow::{Context, Result, anyhow, bail};
use feed_doctor_domain::{AnalysisStatus, ResultFilter};

use super::{GlobalOpts, build_doctor, format_score, print_analysis, print_json};
use crate::args::{ResultArgs, ResultsArgs};

pub async fn list(args: ResultsArgs, global: GlobalOpts) -> Result<()> {
    let filter = filter_from_args(&args)?;

    let config = global.load_config()?;
    let doctor = build_doctor(&config).await?;

    let results = doctor
        .get_results(&args.tenant, &filter)
        .await
        .context("Failed to list results")?;

    if args.json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No results for tenant {}.", args.tenant);
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:>7} {:>5} {:>5} {:>5} {:>5} {:>5}  REVIEWED",
        "PRODUCT", "STATUS", "OVERALL", "TITLE", "DESC", "IMG", "CAT", "PRICE"
    );
    for analysis in &results {
        println!(
            "{:<24} {:<10} {:>7} {:>5} {:>5} {:>5} {:>5} {:>5}  {}",
            analysis.product_id,
            analysis.status.as_str(),
            analysis.overall_score,
            format_score(analysis.title_score),
            format_score(analysis.description_score),
            format_score(analysis.image_score),
            format_score(analysis.category_score),
            format_score(analysis.price_score),
            if analysis.review.is_reviewed { "yes" } else { "no" },
        );
    }

    Ok(())
}

pub async fn show(args: ResultArgs, global: GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let doctor = build_doctor(&config).await?;

    let analysis = doctor
        .get_result(&args.tenant, &args.product)
        .await
        .context("Failed to load result")?
        .ok_or_else(|| {
            anyhow!(
                "No analysis found for product {} (tenant {})",
                args.product,
                args.tenant
            )
        })?;

    if args.json {
        print_json(&analysis)
    } else {
        print_analysis(&analysis);
        Ok(())
    }
}

fn filter_from_args(args: &ResultsArgs) -> Result<ResultFilter> {
    let status = args
        .status
        .as_deref()
        .map(str::parse::<AnalysisStatus>)
        .transpose()
        .map_err(|e| anyhow!(e))?;

    if let (Some(min), Some(max)) = (args.min_score, args.max_score) {
        if min > max {
            bail!("--min-score ({}) is greater than --max-score ({})", min, max);
        }
    }

    Ok(ResultFilter {
        status,
        min_score: args.min_score,
        max_score: args.max_score,
        limit: args.limit,
    })
}
