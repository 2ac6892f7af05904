use std::sync::Arc;

use crate::catalog::ObjectKind;
use crate::identity::GroupId;
use crate::remote::{Authorization, Locale, RemoteObject, RemotePage, UpdatePayload, UpdateStatus};

/// Errors surfaced by a content provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The remote rejected the credentials (401/403).
    #[error("unauthorized ({request})")]
    Unauthorized { request: String },

    /// The remote answered with a non-success status. `message` holds the
    /// text of a recognized structured error body, if there was one.
    #[error("HTTP {status} ({request}){}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: u16,
        request: String,
        message: Option<String>,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Fatal errors invalidate the whole operation and are never attributed
    /// to individual items.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message of a recognized structured error body.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// A remote store of message templates and content blocks.
///
/// Credentials and endpoint selection are bound when the provider is built,
/// so every call of one operation targets the same account and region.
#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync {
    /// Human-readable label identifying this provider.
    fn label(&self) -> &str;

    /// Check the bound credentials.
    async fn authorize(&self) -> Result<Authorization, ProviderError>;

    /// Fetch one page of objects of `kind`. Pages are numbered from 1.
    async fn list_page(
        &self,
        kind: ObjectKind,
        page_number: u32,
        page_size: u32,
    ) -> Result<RemotePage, ProviderError>;

    /// Fetch a single object. `locale` selects a locale variant on remotes
    /// that distinguish them; others ignore it.
    async fn fetch_by_group_id(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        locale: Option<&str>,
    ) -> Result<RemoteObject, ProviderError>;

    /// Create or replace the `payload.locale` variant of a group.
    async fn update_group_locale(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        payload: &UpdatePayload,
    ) -> Result<UpdateStatus, ProviderError>;

    /// Locales the account can translate into.
    async fn list_locales(&self) -> Result<Vec<Locale>, ProviderError>;
}

#[async_trait::async_trait]
impl<T: ContentProvider + ?Sized> ContentProvider for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn authorize(&self) -> Result<Authorization, ProviderError> {
        (**self).authorize().await
    }

    async fn list_page(
        &self,
        kind: ObjectKind,
        page_number: u32,
        page_size: u32,
    ) -> Result<RemotePage, ProviderError> {
        (**self).list_page(kind, page_number, page_size).await
    }

    async fn fetch_by_group_id(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        locale: Option<&str>,
    ) -> Result<RemoteObject, ProviderError> {
        (**self).fetch_by_group_id(group_id, kind, locale).await
    }

    async fn update_group_locale(
        &self,
        group_id: &GroupId,
        kind: ObjectKind,
        payload: &UpdatePayload,
    ) -> Result<UpdateStatus, ProviderError> {
        (**self).update_group_locale(group_id, kind, payload).await
    }

    async fn list_locales(&self) -> Result<Vec<Locale>, ProviderError> {
        (**self).list_locales().await
    }
}
