//! Caller-facing operations of the sync engine.
//!
//! Each operation either fails as a whole with an [`EngineError`] or returns
//! a [`MultiStatus`] carrying everything that succeeded next to the items
//! that did not.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::batch::{self, FetchRequest, UpdateRequest};
use crate::catalog::{DISPLAY_SCHEMA, ObjectKind};
use crate::error::EngineError;
use crate::identity::{
    ContentItem, GroupId, ItemIdentifier, distinct_content_types_for_group, find_mixed_group,
    group_by_group_id, group_by_kind,
};
use crate::listing;
use crate::mapping::{
    CacheDisplayRow, FetchedObjects, available_locales, to_display_rows, to_translations,
    to_update_payloads,
};
use crate::provider::{ContentProvider, ProviderError};
use crate::remote::{Authorization, Locale, RemoteObject, UpdateStatus};
use crate::report::{ErrorFact, ErrorSet, MultiStatus, item_error_code, per_locale_error};


/// Locale callers treat as the source language.
pub const DEFAULT_LOCALE: &str = "base";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalesAvailable {
    pub default_locale: String,
    pub locales: Vec<Locale>,
}

/// A locale variant written by a publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedVariant {
    pub group_id: GroupId,
    pub template_type: ObjectKind,
    pub locale: String,
    pub template_name: String,
}

/// Title of a locale-independent display column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayColumn {
    pub name: &'static str,
    pub title: &'static str,
}

/// Reconciles the item model against a remote content provider.
pub struct ContentSync {
    provider: Arc<dyn ContentProvider>,
}

impl ContentSync {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn ContentProvider {
        self.provider.as_ref()
    }

    /// Check the credentials the provider was built with.
    pub async fn authorize(&self) -> Result<Authorization, EngineError> {
        let authorization = self.provider.authorize().await?;
        if authorization.is_rejected() {
            tracing::warn!(provider = self.provider.label(), "credentials rejected");
            return Err(EngineError::AuthFailed {
                message: authorization.message.or(authorization.error),
            });
        }

        tracing::info!(provider = self.provider.label(), "credentials accepted");
        Ok(authorization)
    }

    /// Account credentials do not expire, so refreshing is re-checking them.
    pub async fn refresh(&self) -> Result<Authorization, EngineError> {
        tracing::debug!("refreshing credentials");
        self.authorize().await
    }

    /// Every sub-item of every remote object, kinds in catalog order.
    pub async fn list_all_items(&self) -> Result<Vec<ItemIdentifier>, EngineError> {
        listing::list_all(self.provider()).await
    }

    /// Display rows for `targets`, one fetch per group.
    ///
    /// Rows are grouped by kind, then by group in first-seen order, then by
    /// catalog order. Items whose group could not be fetched are reported as
    /// errors instead.
    pub async fn get_items(
        &self,
        targets: &[ItemIdentifier],
    ) -> Result<MultiStatus<Vec<CacheDisplayRow>>, EngineError> {
        let targets = dedup_targets(targets);
        ensure_single_kind_groups(&targets)?;

        let requests: Vec<FetchRequest> = group_by_group_id(&targets)
            .into_iter()
            .filter_map(|(group_id, members)| {
                Some(FetchRequest {
                    kind: members.first()?.kind(),
                    group_id,
                    locale: None,
                })
            })
            .collect();
        tracing::info!(items = targets.len(), groups = requests.len(), "getting items");

        let outcomes: HashMap<GroupId, Result<RemoteObject, ProviderError>> =
            batch::fetch_all(self.provider(), requests)
                .await?
                .into_iter()
                .map(|settlement| (settlement.key.group_id, settlement.outcome))
                .collect();

        let mut rows = Vec::new();
        let mut errors = ErrorSet::new();
        for (kind, kind_items) in group_by_kind(&targets) {
            for (group_id, members) in group_by_group_id(kind_items.iter().copied()) {
                match outcomes.get(&group_id) {
                    Some(Ok(object)) => {
                        let content_types =
                            distinct_content_types_for_group(members.iter().copied(), &group_id);
                        rows.extend(to_display_rows(object, &group_id, kind, &content_types));
                    }
                    Some(Err(error)) => {
                        tracing::warn!(%group_id, %error, "could not fetch group");
                        let code = item_error_code(error);
                        for member in members {
                            errors.record(ErrorFact::Item {
                                unique_id: member.unique_id.clone(),
                                code,
                            });
                        }
                    }
                    None => {}
                }
            }
        }

        Ok(MultiStatus::new(rows, errors))
    }

    /// Per-locale text of `targets`, one fetch per group and locale.
    ///
    /// Every returned item carries an entry for every requested locale. A
    /// locale whose fetch failed reads as `""` and is reported per locale.
    pub async fn get_content(
        &self,
        locales: &[String],
        targets: &[ItemIdentifier],
    ) -> Result<MultiStatus<Vec<ContentItem>>, EngineError> {
        let targets = dedup_targets(targets);
        ensure_single_kind_groups(&targets)?;
        let locales = dedup_locales(locales);

        let groups = group_by_group_id(&targets);
        let requests: Vec<FetchRequest> = groups
            .iter()
            .filter_map(|(group_id, members)| Some((group_id, members.first()?.kind())))
            .flat_map(|(group_id, kind)| {
                locales.iter().map(move |locale| FetchRequest {
                    group_id: group_id.clone(),
                    kind,
                    locale: Some(locale.clone()),
                })
            })
            .collect();
        tracing::info!(
            items = targets.len(),
            groups = groups.len(),
            locales = locales.len(),
            "getting content"
        );

        // Every read is issued per locale, including against remotes that
        // ignore the locale, so objects are only stored under the locale they
        // were fetched for. The locale-agnostic slot stays empty and a failed
        // locale reads as empty text.
        let mut fetched = FetchedObjects::new();
        let mut failures: HashMap<(GroupId, String), ProviderError> = HashMap::new();
        for settlement in batch::fetch_all(self.provider(), requests).await? {
            let FetchRequest {
                group_id, locale, ..
            } = settlement.key;
            let locale = locale.unwrap_or_default();
            match settlement.outcome {
                Ok(object) => fetched.insert(group_id, Some(locale), object),
                Err(error) => {
                    failures.insert((group_id, locale), error);
                }
            }
        }

        let mut errors = ErrorSet::new();
        for (group_id, members) in &groups {
            for locale in &locales {
                let Some(error) = failures.get(&(group_id.clone(), locale.clone())) else {
                    continue;
                };
                tracing::warn!(%group_id, %locale, %error, "could not fetch locale");
                let detail = per_locale_error(error);
                for member in members {
                    errors.record(ErrorFact::Locale {
                        unique_id: member.unique_id.clone(),
                        locale: locale.clone(),
                        error: detail.clone(),
                    });
                }
            }
        }

        let mut items = Vec::with_capacity(targets.len());
        for (_, kind_items) in group_by_kind(&targets) {
            items.extend(to_translations(&kind_items, &locales, &fetched));
        }

        Ok(MultiStatus::new(items, errors))
    }

    /// Write every locale present in the items' translations back to the
    /// remote, one update per group and locale.
    pub async fn publish_content(
        &self,
        items: &[ContentItem],
    ) -> Result<MultiStatus<Vec<PublishedVariant>>, EngineError> {
        if let Some(group_id) = find_mixed_group(items) {
            return Err(EngineError::MixedKinds { group_id });
        }

        let groups = group_by_group_id(items);
        let mut requests = Vec::new();
        for (group_id, members) in &groups {
            let Some(kind) = members.first().map(|member| member.identifier.kind()) else {
                continue;
            };
            let locales = available_locales(members);
            for payload in to_update_payloads(group_id, kind, members, &locales) {
                requests.push(UpdateRequest {
                    group_id: group_id.clone(),
                    kind,
                    payload,
                });
            }
        }
        tracing::info!(
            groups = groups.len(),
            updates = requests.len(),
            "publishing content"
        );

        let mut outcomes: HashMap<(GroupId, String), (UpdateRequest, Result<UpdateStatus, ProviderError>)> =
            batch::update_all(self.provider(), requests)
                .await?
                .into_iter()
                .map(|settlement| {
                    let key = (
                        settlement.key.group_id.clone(),
                        settlement.key.payload.locale.clone(),
                    );
                    (key, (settlement.key, settlement.outcome))
                })
                .collect();

        let mut published = Vec::new();
        let mut errors = ErrorSet::new();
        for (group_id, members) in &groups {
            for locale in available_locales(members) {
                let Some((request, outcome)) = outcomes.remove(&(group_id.clone(), locale.clone()))
                else {
                    continue;
                };
                match outcome {
                    Ok(_) => published.push(PublishedVariant {
                        group_id: request.group_id,
                        template_type: request.kind,
                        locale: request.payload.locale,
                        template_name: request.payload.template_name,
                    }),
                    Err(error) => {
                        tracing::warn!(%group_id, %locale, %error, "could not publish locale");
                        let detail = per_locale_error(&error);
                        for member in members
                            .iter()
                            .filter(|member| member.translations.contains_key(&locale))
                        {
                            errors.record(ErrorFact::Locale {
                                unique_id: member.identifier.unique_id.clone(),
                                locale: locale.clone(),
                                error: detail.clone(),
                            });
                        }
                    }
                }
            }
        }

        Ok(MultiStatus::new(published, errors))
    }

    /// Locales the account can translate into.
    pub async fn get_locales(&self) -> Result<LocalesAvailable, EngineError> {
        let locales = self.provider.list_locales().await?;
        Ok(LocalesAvailable {
            default_locale: DEFAULT_LOCALE.to_owned(),
            locales,
        })
    }

    /// Locale-independent columns of every display row.
    pub fn display_schema() -> Vec<DisplayColumn> {
        DISPLAY_SCHEMA
            .iter()
            .map(|&(name, title)| DisplayColumn { name, title })
            .collect()
    }
}

fn dedup_targets(targets: &[ItemIdentifier]) -> Vec<ItemIdentifier> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(targets.len());
    for target in targets {
        if seen.insert(&target.unique_id) {
            unique.push(target.clone());
        }
    }
    unique
}

fn dedup_locales(locales: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(locales.len());
    for locale in locales {
        if seen.insert(locale.as_str()) {
            unique.push(locale.clone());
        }
    }
    unique
}

fn ensure_single_kind_groups(items: &[ItemIdentifier]) -> Result<(), EngineError> {
    match find_mixed_group(items) {
        Some(group_id) => Err(EngineError::MixedKinds { group_id }),
        None => Ok(()),
    }
}
