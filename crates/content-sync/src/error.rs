use crate::catalog::ObjectKind;
use crate::identity::GroupId;
use crate::provider::ProviderError;

/// Errors that abort a whole engine operation.
///
/// Item-level failures never appear here; they are reported through
/// [`MultiStatus`](crate::MultiStatus) alongside the items that succeeded.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The remote rejected the credentials while the operation was running.
    #[error("unauthorized: {0}")]
    Unauthorized(#[source] ProviderError),

    /// The credential check answered with an explicit failure.
    #[error("authorization failed{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    AuthFailed { message: Option<String> },

    /// A listing page could not be retrieved.
    #[error("could not retrieve {kind} templates")]
    CouldNotRetrieveTemplates {
        kind: ObjectKind,
        #[source]
        source: ProviderError,
    },

    /// The items of one group disagree on their object kind.
    #[error("group {group_id} mixes object kinds")]
    MixedKinds { group_id: GroupId },

    #[error(transparent)]
    Provider(ProviderError),
}

impl EngineError {
    /// True for errors caused by the credentials rather than the request.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::AuthFailed { .. })
    }
}

impl From<ProviderError> for EngineError {
    fn from(error: ProviderError) -> Self {
        if error.is_fatal() {
            Self::Unauthorized(error)
        } else {
            Self::Provider(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_provider_errors_become_unauthorized() {
        let err: EngineError = ProviderError::Unauthorized {
            request: "getTemplate".into(),
        }
        .into();
        assert!(matches!(err, EngineError::Unauthorized(_)));
        assert!(err.is_auth());

        let err: EngineError = ProviderError::Network("reset".into()).into();
        assert!(matches!(err, EngineError::Provider(_)));
        assert!(!err.is_auth());
    }

    #[test]
    fn listing_error_names_the_kind() {
        let err = EngineError::CouldNotRetrieveTemplates {
            kind: ObjectKind::ContentBlock,
            source: ProviderError::Network("reset".into()),
        };
        assert!(err.to_string().contains(ObjectKind::ContentBlock.as_str()));
    }
}
