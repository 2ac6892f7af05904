use anyhow::Result;
use content_sync::ContentSync;

use super::Output;

pub async fn run(engine: &ContentSync) -> Result<Output> {
    Output::complete(&engine.get_locales().await?)
}
