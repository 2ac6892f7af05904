//! Exhaustive paginated listing.
//!
//! A first single-object page reads the total count. The remaining pages are
//! then fetched concurrently and concatenated in page order.

use futures::future::try_join_all;

use crate::batch::settle_all;
use crate::catalog::ObjectKind;
use crate::error::EngineError;
use crate::identity::{ItemIdentifier, decompose};
use crate::provider::{ContentProvider, ProviderError};
use crate::remote::RemotePage;

/// Objects requested per listing page.
pub const PAGE_SIZE: u32 = 25;

/// Number of pages needed to cover `total` objects.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

fn listing_error(kind: ObjectKind, error: ProviderError) -> EngineError {
    if error.is_fatal() {
        EngineError::Unauthorized(error)
    } else {
        EngineError::CouldNotRetrieveTemplates {
            kind,
            source: error,
        }
    }
}

/// List every object of `kind` as decomposed identifiers.
///
/// Any failed page fails the whole listing; partial listings are never
/// returned.
pub async fn list_kind(
    provider: &dyn ContentProvider,
    kind: ObjectKind,
) -> Result<Vec<ItemIdentifier>, EngineError> {
    let first_page = provider
        .list_page(kind, 1, 1)
        .await
        .map_err(|e| listing_error(kind, e))?;
    let pages = page_count(first_page.total, PAGE_SIZE);
    tracing::debug!(%kind, total = first_page.total, pages, "listing remote objects");

    let settled = settle_all((1..=pages).map(|page_number| async move {
        let outcome = provider.list_page(kind, page_number, PAGE_SIZE).await;
        (page_number, outcome)
    }))
    .await
    .map_err(|e| listing_error(kind, e))?;

    let mut fetched: Vec<(u32, RemotePage)> = Vec::with_capacity(settled.len());
    for settlement in settled {
        match settlement.outcome {
            Ok(page) => fetched.push((settlement.key, page)),
            Err(error) => {
                tracing::warn!(%kind, page = settlement.key, %error, "listing page failed");
                return Err(listing_error(kind, error));
            }
        }
    }
    fetched.sort_by_key(|(page_number, _)| *page_number);

    let items: Vec<ItemIdentifier> = fetched
        .iter()
        .flat_map(|(_, page)| page.objects.iter())
        .flat_map(|summary| decompose(summary, kind))
        .collect();
    tracing::info!(%kind, items = items.len(), "listed remote objects");
    Ok(items)
}

/// List every object of every kind. Kinds appear in catalog order.
pub async fn list_all(provider: &dyn ContentProvider) -> Result<Vec<ItemIdentifier>, EngineError> {
    let per_kind = try_join_all(ObjectKind::ALL.into_iter().map(|kind| list_kind(provider, kind))).await?;
    Ok(per_kind.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use crate::remote::RemoteObject;
    use crate::test_support::{Call, InMemoryProvider, unauthorized};

    use super::*;

    fn email(id: u64) -> RemoteObject {
        RemoteObject {
            template_id: Some(id),
            template_name: Some(format!("template-{id}")),
            ..Default::default()
        }
    }

    fn block(id: u64) -> RemoteObject {
        RemoteObject {
            id: Some(id),
            name: Some(format!("block-{id}")),
            ..Default::default()
        }
    }

    fn page_calls(provider: &InMemoryProvider) -> Vec<(ObjectKind, u32, u32)> {
        provider
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ListPage {
                    kind,
                    page_number,
                    page_size,
                } => Some((kind, page_number, page_size)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(30, 25), 2);
        assert_eq!(page_count(25, 25), 1);
        assert_eq!(page_count(26, 25), 2);
        assert_eq!(page_count(0, 25), 0);
    }

    #[tokio::test]
    async fn thirty_objects_take_two_pages() {
        let mut provider = InMemoryProvider::new("test");
        for id in 1..=30 {
            provider.add(ObjectKind::Email, email(id));
        }

        let items = list_kind(&provider, ObjectKind::Email).await.unwrap();
        assert_eq!(items.len(), 30 * ObjectKind::Email.order().count());

        let mut calls = page_calls(&provider);
        calls.sort();
        assert_eq!(
            calls,
            vec![
                (ObjectKind::Email, 1, 1),
                (ObjectKind::Email, 1, PAGE_SIZE),
                (ObjectKind::Email, 2, PAGE_SIZE),
            ]
        );
    }

    #[tokio::test]
    async fn pages_are_concatenated_in_page_order() {
        let mut provider = InMemoryProvider::new("test");
        for id in 1..=60 {
            provider.add(ObjectKind::ContentBlock, block(id));
        }

        let items = list_kind(&provider, ObjectKind::ContentBlock).await.unwrap();
        let ids: Vec<u64> = items
            .iter()
            .map(|i| i.group_id.as_str().parse().unwrap())
            .collect();
        assert_eq!(ids, (1..=60).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn exact_page_multiple_takes_one_page() {
        let mut provider = InMemoryProvider::new("test");
        for id in 1..=25 {
            provider.add(ObjectKind::Email, email(id));
        }

        list_kind(&provider, ObjectKind::Email).await.unwrap();
        assert_eq!(page_calls(&provider).len(), 2);
    }

    #[tokio::test]
    async fn empty_listing_makes_only_the_counting_call() {
        let provider = InMemoryProvider::new("test");
        let items = list_kind(&provider, ObjectKind::Email).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(page_calls(&provider), vec![(ObjectKind::Email, 1, 1)]);
    }

    #[tokio::test]
    async fn failed_page_fails_the_kind() {
        let mut provider = InMemoryProvider::new("test");
        for id in 1..=30 {
            provider.add(ObjectKind::Email, email(id));
        }
        provider.fail_page(
            ObjectKind::Email,
            2,
            ProviderError::Status {
                status: 500,
                request: "listEmailTemplates".into(),
                message: None,
            },
        );

        let err = list_kind(&provider, ObjectKind::Email).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::CouldNotRetrieveTemplates {
                kind: ObjectKind::Email,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unauthorized_counting_call_is_fatal() {
        let mut provider = InMemoryProvider::new("test");
        provider.fail_page(ObjectKind::Email, 1, unauthorized("listEmailTemplates"));

        let err = list_kind(&provider, ObjectKind::Email).await.unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn list_all_orders_kinds_by_catalog() {
        let mut provider = InMemoryProvider::new("test");
        provider.add(ObjectKind::ContentBlock, block(9));
        provider.add(ObjectKind::Email, email(1));

        let items = list_all(&provider).await.unwrap();
        let first_block = items
            .iter()
            .position(|i| i.kind() == ObjectKind::ContentBlock)
            .unwrap();
        assert!(items[..first_block].iter().all(|i| i.kind() == ObjectKind::Email));
        assert_eq!(items.len(), ObjectKind::Email.order().count() + 1);
    }
}
