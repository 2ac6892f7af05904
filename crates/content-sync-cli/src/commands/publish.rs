use std::path::Path;

use anyhow::Result;
use content_sync::{ContentItem, ContentSync};

use super::Output;
use super::input::read_json;

pub async fn run(engine: &ContentSync, input: &Path) -> Result<Output> {
    let items: Vec<ContentItem> = read_json(input)?;
    let result = engine.publish_content(&items).await?;
    tracing::info!(
        published = result.items.len(),
        failed = result.errors.len(),
        "publish finished"
    );
    Output::from_multi_status(&result)
}
