//! Multi-status error reporting.
//!
//! Per-item and per-locale failures are reduced into an [`ErrorSet`] one
//! [`ErrorFact`] at a time. The reducer holds at most one [`ErrorInfo`] per
//! unique id; later per-locale facts for the same id are merged into the
//! existing entry.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::identity::UniqueId;
use crate::provider::ProviderError;

/// Error code reported alongside a non-empty error list.
pub const MULTI_STATUS_ERROR_CODE: &str = "SOME_ITEMS_HAVE_ERRORS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleItemErrorCode {
    #[serde(rename = "ITEM_NOT_FOUND_ERROR")]
    ItemNotFound,
    #[serde(rename = "UNRECOGNIZED_ERROR")]
    Unrecognized,
    #[serde(rename = "CLIENT_ERROR")]
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerLocaleErrorCode {
    #[serde(rename = "UNRECOGNIZED_ERROR")]
    Unrecognized,
    #[serde(rename = "CLIENT_ERROR")]
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all = "camelCase")]
pub enum PerLocaleError {
    #[serde(rename_all = "camelCase")]
    Code { error_code: PerLocaleErrorCode },
    #[serde(rename_all = "camelCase")]
    UserErrors { user_errors: Vec<String> },
}

/// Exactly one of the three error shapes an item can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    #[serde(rename_all = "camelCase")]
    Code { error_code: SingleItemErrorCode },
    #[serde(rename_all = "camelCase")]
    UserErrors { user_errors: Vec<String> },
    #[serde(rename_all = "camelCase")]
    PerLocale {
        per_locale_errors: BTreeMap<String, PerLocaleError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub unique_id: UniqueId,
    #[serde(flatten)]
    pub detail: ErrorDetail,
}

/// A single classified failure affecting one item.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorFact {
    Item {
        unique_id: UniqueId,
        code: SingleItemErrorCode,
    },
    Locale {
        unique_id: UniqueId,
        locale: String,
        error: PerLocaleError,
    },
}

impl ErrorFact {
    pub fn unique_id(&self) -> &UniqueId {
        match self {
            Self::Item { unique_id, .. } | Self::Locale { unique_id, .. } => unique_id,
        }
    }
}

/// Classify a failed whole-object fetch.
pub fn item_error_code(error: &ProviderError) -> SingleItemErrorCode {
    match error.status() {
        Some(400) | Some(404) => SingleItemErrorCode::ItemNotFound,
        _ => SingleItemErrorCode::Unrecognized,
    }
}

/// Classify a failed per-locale fetch or update.
///
/// Only a 400 or 404 carrying a structured message is surfaced to the user;
/// everything else is unrecognized.
pub fn per_locale_error(error: &ProviderError) -> PerLocaleError {
    match (error.status(), error.user_message()) {
        (Some(400 | 404), Some(message)) => PerLocaleError::UserErrors {
            user_errors: vec![message.to_owned()],
        },
        _ => PerLocaleError::Code {
            error_code: PerLocaleErrorCode::Unrecognized,
        },
    }
}

/// Accumulated per-item errors, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ErrorSet {
    entries: Vec<ErrorInfo>,
    index: HashMap<UniqueId, usize>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fact into the set.
    pub fn merge(mut self, fact: ErrorFact) -> Self {
        self.record(fact);
        self
    }

    pub fn record(&mut self, fact: ErrorFact) {
        if let Some(&position) = self.index.get(fact.unique_id()) {
            let existing = &mut self.entries[position].detail;
            match (existing, fact) {
                (
                    ErrorDetail::PerLocale { per_locale_errors },
                    ErrorFact::Locale { locale, error, .. },
                ) => {
                    per_locale_errors.insert(locale, error);
                }
                // An item already carrying an item-level error keeps it.
                (_, fact) => {
                    tracing::debug!(unique_id = %fact.unique_id(), "dropping error for already failed item");
                }
            }
            return;
        }

        let (unique_id, detail) = match fact {
            ErrorFact::Item { unique_id, code } => {
                (unique_id, ErrorDetail::Code { error_code: code })
            }
            ErrorFact::Locale {
                unique_id,
                locale,
                error,
            } => (
                unique_id,
                ErrorDetail::PerLocale {
                    per_locale_errors: BTreeMap::from([(locale, error)]),
                },
            ),
        };

        self.index.insert(unique_id.clone(), self.entries.len());
        self.entries.push(ErrorInfo { unique_id, detail });
    }

    pub fn get(&self, unique_id: &UniqueId) -> Option<&ErrorInfo> {
        self.index.get(unique_id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<ErrorInfo> {
        self.entries
    }
}

impl FromIterator<ErrorFact> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = ErrorFact>>(iter: I) -> Self {
        iter.into_iter().fold(ErrorSet::new(), ErrorSet::merge)
    }
}

/// Result of an operation that may succeed for some items and fail for
/// others.
#[derive(Debug, Clone, Serialize)]
pub struct MultiStatus<T> {
    pub items: T,
    pub errors: Vec<ErrorInfo>,
}

impl<T> MultiStatus<T> {
    pub fn new(items: T, errors: ErrorSet) -> Self {
        Self {
            items,
            errors: errors.into_vec(),
        }
    }

    /// True when some items failed while the operation as a whole completed.
    pub fn is_multi_status(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn uid(s: &str) -> UniqueId {
        UniqueId::new(s)
    }

    fn locale_fact(id: &str, locale: &str, message: &str) -> ErrorFact {
        ErrorFact::Locale {
            unique_id: uid(id),
            locale: locale.into(),
            error: PerLocaleError::UserErrors {
                user_errors: vec![message.into()],
            },
        }
    }

    #[test]
    fn per_locale_failures_merge_into_one_entry() {
        let set = ErrorSet::new()
            .merge(locale_fact("1||subject", "de", "missing de"))
            .merge(locale_fact("1||subject", "fr", "missing fr"));

        assert_eq!(set.len(), 1);
        let info = set.get(&uid("1||subject")).unwrap();
        match &info.detail {
            ErrorDetail::PerLocale { per_locale_errors } => {
                assert_eq!(per_locale_errors.len(), 2);
                assert!(per_locale_errors.contains_key("de"));
                assert!(per_locale_errors.contains_key("fr"));
            }
            other => panic!("expected per-locale errors, got {other:?}"),
        }
    }

    #[test]
    fn distinct_ids_get_distinct_entries_in_first_seen_order() {
        let set: ErrorSet = vec![
            locale_fact("2||html", "fr", "x"),
            locale_fact("1||html", "fr", "y"),
            locale_fact("2||html", "de", "z"),
        ]
        .into_iter()
        .collect();

        let errors = set.into_vec();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].unique_id, uid("2||html"));
        assert_eq!(errors[1].unique_id, uid("1||html"));
    }

    #[test]
    fn first_item_level_code_wins() {
        let set = ErrorSet::new()
            .merge(ErrorFact::Item {
                unique_id: uid("1||subject"),
                code: SingleItemErrorCode::ItemNotFound,
            })
            .merge(ErrorFact::Item {
                unique_id: uid("1||subject"),
                code: SingleItemErrorCode::Unrecognized,
            });

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(&uid("1||subject")).unwrap().detail,
            ErrorDetail::Code {
                error_code: SingleItemErrorCode::ItemNotFound
            }
        );
    }

    #[test]
    fn same_locale_is_overwritten_not_duplicated() {
        let set = ErrorSet::new()
            .merge(locale_fact("1||subject", "fr", "first"))
            .merge(locale_fact("1||subject", "fr", "second"));

        let value = serde_json::to_value(set.into_vec()).unwrap();
        assert_eq!(
            value,
            json!([{
                "uniqueId": "1||subject",
                "perLocaleErrors": { "fr": { "userErrors": ["second"] } }
            }])
        );
    }

    #[test]
    fn classify_fetch_failures() {
        let not_found = ProviderError::Status {
            status: 404,
            request: "r".into(),
            message: None,
        };
        let bad_request = ProviderError::Status {
            status: 400,
            request: "r".into(),
            message: Some("bad".into()),
        };
        let server = ProviderError::Status {
            status: 500,
            request: "r".into(),
            message: None,
        };
        assert_eq!(item_error_code(&not_found), SingleItemErrorCode::ItemNotFound);
        assert_eq!(
            item_error_code(&bad_request),
            SingleItemErrorCode::ItemNotFound
        );
        assert_eq!(item_error_code(&server), SingleItemErrorCode::Unrecognized);
        assert_eq!(
            item_error_code(&ProviderError::Network("reset".into())),
            SingleItemErrorCode::Unrecognized
        );
    }

    #[test]
    fn classify_locale_failures() {
        let structured = ProviderError::Status {
            status: 404,
            request: "r".into(),
            message: Some("Template not found".into()),
        };
        assert_eq!(
            per_locale_error(&structured),
            PerLocaleError::UserErrors {
                user_errors: vec!["Template not found".into()]
            }
        );
        assert_eq!(
            per_locale_error(&ProviderError::Parse("eof".into())),
            PerLocaleError::Code {
                error_code: PerLocaleErrorCode::Unrecognized
            }
        );
    }

    #[test]
    fn server_error_message_is_not_a_user_error() {
        let server = ProviderError::Status {
            status: 500,
            request: "r".into(),
            message: Some("internal".into()),
        };
        assert_eq!(
            per_locale_error(&server),
            PerLocaleError::Code {
                error_code: PerLocaleErrorCode::Unrecognized
            }
        );

        let bad_request = ProviderError::Status {
            status: 400,
            request: "r".into(),
            message: Some("Template name already exists".into()),
        };
        assert_eq!(
            per_locale_error(&bad_request),
            PerLocaleError::UserErrors {
                user_errors: vec!["Template name already exists".into()]
            }
        );

        let bare_not_found = ProviderError::Status {
            status: 404,
            request: "r".into(),
            message: None,
        };
        assert_eq!(
            per_locale_error(&bare_not_found),
            PerLocaleError::Code {
                error_code: PerLocaleErrorCode::Unrecognized
            }
        );
    }

    #[test]
    fn error_info_serializes_single_branch() {
        let info = ErrorInfo {
            unique_id: uid("9||content"),
            detail: ErrorDetail::Code {
                error_code: SingleItemErrorCode::ItemNotFound,
            },
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({ "uniqueId": "9||content", "errorCode": "ITEM_NOT_FOUND_ERROR" })
        );

        let info = ErrorInfo {
            unique_id: uid("9||content"),
            detail: ErrorDetail::UserErrors {
                user_errors: vec!["nope".into()],
            },
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({ "uniqueId": "9||content", "userErrors": ["nope"] })
        );
    }

    #[test]
    fn multi_status_flag_follows_errors() {
        let ok = MultiStatus::new(vec![1, 2], ErrorSet::new());
        assert!(!ok.is_multi_status());

        let partial = MultiStatus::new(vec![1], ErrorSet::new().merge(locale_fact("1||a", "fr", "x")));
        assert!(partial.is_multi_status());
    }
}
