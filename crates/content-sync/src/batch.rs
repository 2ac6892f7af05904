//! Concurrent fan-out of provider calls.
//!
//! Every call of a batch is started at once and its outcome is kept tagged
//! with the request that produced it, so failures can be attributed to the
//! items behind that request. A fatal error ends the batch immediately;
//! calls still in flight are dropped.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::catalog::ObjectKind;
use crate::identity::GroupId;
use crate::provider::{ContentProvider, ProviderError};
use crate::remote::{RemoteObject, UpdatePayload, UpdateStatus};

/// Outcome of one call, tagged with the request that produced it.
#[derive(Debug)]
pub struct Settlement<K, T> {
    pub key: K,
    pub outcome: Result<T, ProviderError>,
}

/// Drive every call to completion, in no particular order.
///
/// Returns the first fatal error instead of any settlement.
pub async fn settle_all<K, T, F, I>(calls: I) -> Result<Vec<Settlement<K, T>>, ProviderError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = (K, Result<T, ProviderError>)>,
{
    let mut pending: FuturesUnordered<F> = calls.into_iter().collect();
    let mut settled = Vec::with_capacity(pending.len());

    while let Some((key, outcome)) = pending.next().await {
        match outcome {
            Err(error) if error.is_fatal() => {
                tracing::warn!(%error, in_flight = pending.len(), "aborting batch");
                return Err(error);
            }
            outcome => settled.push(Settlement { key, outcome }),
        }
    }

    Ok(settled)
}

/// A single-object fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub group_id: GroupId,
    pub kind: ObjectKind,
    pub locale: Option<String>,
}

/// A per-locale update of one group.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub group_id: GroupId,
    pub kind: ObjectKind,
    pub payload: UpdatePayload,
}

pub async fn fetch_all(
    provider: &dyn ContentProvider,
    requests: Vec<FetchRequest>,
) -> Result<Vec<Settlement<FetchRequest, RemoteObject>>, ProviderError> {
    tracing::debug!(count = requests.len(), "fetching objects");
    settle_all(requests.into_iter().map(|request| async move {
        let outcome = provider
            .fetch_by_group_id(&request.group_id, request.kind, request.locale.as_deref())
            .await;
        (request, outcome)
    }))
    .await
}

pub async fn update_all(
    provider: &dyn ContentProvider,
    requests: Vec<UpdateRequest>,
) -> Result<Vec<Settlement<UpdateRequest, UpdateStatus>>, ProviderError> {
    tracing::debug!(count = requests.len(), "updating objects");
    settle_all(requests.into_iter().map(|request| async move {
        let outcome = provider
            .update_group_locale(&request.group_id, request.kind, &request.payload)
            .await;
        (request, outcome)
    }))
    .await
}
