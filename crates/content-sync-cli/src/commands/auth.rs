use anyhow::Result;
use content_sync::ContentSync;
use serde_json::json;

use super::Output;

pub async fn run(engine: &ContentSync) -> Result<Output> {
    let authorization = engine.authorize().await?;
    Output::complete(&json!({
        "status": authorization.status,
        "message": authorization.message,
    }))
}
