pub mod batch;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod identity;
pub mod listing;
pub mod mapping;
pub mod provider;
pub mod remote;
pub mod report;

pub use catalog::{DISPLAY_SCHEMA, ObjectKind, TemplateField};
pub use engine::{ContentSync, DEFAULT_LOCALE, DisplayColumn, LocalesAvailable, PublishedVariant};
pub use error::EngineError;
pub use identity::{ContentItem, GroupId, ItemIdentifier, ItemMetadata, UniqueId};
pub use mapping::{CacheDisplayRow, DisplayFields};
pub use provider::{ContentProvider, ProviderError};
pub use remote::{
    Authorization, Locale, RemoteObject, RemoteObjectSummary, RemotePage, UpdatePayload,
    UpdateStatus,
};
pub use report::{ErrorInfo, MULTI_STATUS_ERROR_CODE, MultiStatus};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
