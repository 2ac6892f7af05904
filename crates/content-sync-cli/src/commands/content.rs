use std::path::Path;

use anyhow::{Result, bail};
use content_sync::{ContentSync, ItemIdentifier};

use super::Output;
use super::input::read_json;

/// Read `input` and fetch its text in `locales`, falling back to the
/// configured locales when none are given.
pub async fn run(
    engine: &ContentSync,
    locales: &[String],
    configured: &[String],
    input: &Path,
) -> Result<Output> {
    let locales = if locales.is_empty() { configured } else { locales };
    if locales.is_empty() {
        bail!("no locales given (pass --locales or configure [[locales]])");
    }

    let targets: Vec<ItemIdentifier> = read_json(input)?;
    let result = engine.get_content(locales, &targets).await?;
    Output::from_multi_status(&result)
}
