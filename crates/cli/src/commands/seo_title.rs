//! SEO title command

use anyhow::Result;

use super::{GlobalOpts, build_provider, engine_config};
use crate::args::SeoTitleArgs;

pub async fn execute(args: SeoTitleArgs, global: GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let provider = build_provider(&config)?;
    let engine = engine_config(&config);

    let title = feed_doctor_domain::usecases::generate_seo_title(
        provider.as_ref(),
        engine.provider_timeout,
        &args.name,
        args.category.as_deref(),
    )
    .await;

    println!("{}", title);
    Ok(())
}
