use anyhow::Result;
use content_sync::ContentSync;

use super::Output;

pub async fn run(engine: &ContentSync) -> Result<Output> {
    let items = engine.list_all_items().await?;
    tracing::info!(items = items.len(), "listed items");
    Output::complete(&items)
}
