use std::path::Path;

use anyhow::Result;
use content_sync::{ContentSync, ItemIdentifier};

use super::Output;
use super::input::read_json;

pub async fn run(engine: &ContentSync, input: &Path) -> Result<Output> {
    let targets: Vec<ItemIdentifier> = read_json(input)?;
    run_with(engine, &targets).await
}

pub async fn run_with(engine: &ContentSync, targets: &[ItemIdentifier]) -> Result<Output> {
    let result = engine.get_items(targets).await?;
    Output::from_multi_status(&result)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use content_sync::test_support::InMemoryProvider;
    use content_sync::{GroupId, ObjectKind, RemoteObject};

    use super::*;

    #[tokio::test]
    async fn missing_group_makes_a_multi_status() {
        let mut provider = InMemoryProvider::new("test");
        provider.add(
            ObjectKind::ContentBlock,
            RemoteObject {
                id: Some(55),
                name: Some("footer".into()),
                ..Default::default()
            },
        );
        let engine = ContentSync::new(Arc::new(provider));

        let targets = vec![
            ItemIdentifier::new(GroupId::new("55"), "content", ObjectKind::ContentBlock),
            ItemIdentifier::new(GroupId::new("56"), "content", ObjectKind::ContentBlock),
        ];
        let output = run_with(&engine, &targets).await.unwrap();

        assert!(output.multi_status);
        assert_eq!(output.body["items"][0]["groupTitle"], "footer");
        assert_eq!(output.body["errors"][0]["uniqueId"], "56||content");
        assert_eq!(output.body["errors"][0]["errorCode"], "ITEM_NOT_FOUND_ERROR");
    }
}
