//! Error types shared by the object store and message queue clients

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::RequestId;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Result type alias for service client operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Normalized error taxonomy across both service variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum ErrorKind {
    /// Container or item does not exist
    NotFound,
    /// Caller is not allowed to perform the request
    AccessDenied,
    /// Container name is already taken
    AlreadyExists,
    /// Bucket still holds objects
    NotEmpty,
    /// Object payload exceeds the service limit
    PayloadTooLarge,
    /// Message body exceeds the service limit
    BodyTooLarge,
    /// Receipt handle is no longer valid for the message
    ReceiptHandleExpired,
    /// Service reported it cannot serve the request right now
    Unavailable,
    /// Any vendor code without a dedicated category
    Other,
}

impl ErrorKind {
    /// Maps a vendor error code, falling back to the HTTP status when the
    /// code is unknown
    #[must_use]
    pub fn from_code(code: &str, status: u16) -> Self {
        match code {
            "NoSuchBucket"
            | "NoSuchKey"
            | "NotFound"
            | "QueueDoesNotExist"
            | "AWS.SimpleQueueService.NonExistentQueue" => Self::NotFound,
            "AccessDenied" | "AccessDeniedException" | "AllAccessDisabled" => Self::AccessDenied,
            "BucketAlreadyExists"
            | "BucketAlreadyOwnedByYou"
            | "QueueAlreadyExists"
            | "QueueNameExists" => Self::AlreadyExists,
            "BucketNotEmpty" => Self::NotEmpty,
            "EntityTooLarge" | "MaxMessageSizeExceeded" => Self::PayloadTooLarge,
            "MessageTooLong" | "InvalidMessageContents" => Self::BodyTooLarge,
            "ReceiptHandleIsInvalid"
            | "InvalidReceiptHandle"
            | "AWS.SimpleQueueService.ReceiptHandleIsInvalid" => Self::ReceiptHandleExpired,
            "ServiceUnavailable" | "SlowDown" | "InternalError" | "RequestThrottled" => {
                Self::Unavailable
            }
            _ => match status {
                403 => Self::AccessDenied,
                404 => Self::NotFound,
                413 => Self::PayloadTooLarge,
                500..=599 => Self::Unavailable,
                _ => Self::Other,
            },
        }
    }
}

/// Which side caused a rejected request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorType {
    /// Request was invalid or disallowed (4xx)
    Client,
    /// Service failed to process a valid request (5xx)
    Service,
    /// Status did not identify either side
    Unknown,
}

impl ErrorType {
    /// Derives the error type from an HTTP status
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::Client,
            500..=599 => Self::Service,
            _ => Self::Unknown,
        }
    }
}

/// Errors reported by the object store and message queue clients
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service was reached but rejected the request
    #[error("service rejected request with {kind} ({code}, status {status}): {message}")]
    ServiceRejected {
        /// Normalized category
        kind: ErrorKind,
        /// Human-readable message from the service
        message: String,
        /// HTTP status code
        status: u16,
        /// Vendor error code, e.g. `BucketNotEmpty`
        code: String,
        /// Client-caused or server-caused
        error_type: ErrorType,
        /// Request correlation id, when the service returned one
        request_id: Option<String>,
    },

    /// The service could not be reached or the exchange could not complete
    #[error("client unavailable: {message}")]
    ClientUnavailable {
        /// Description of the transport or client failure
        message: String,
    },
}

impl ServiceError {
    /// Builds a rejection from its parts, deriving the error type from the status
    #[must_use]
    pub fn rejected(
        kind: ErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
        status: u16,
        request_id: Option<String>,
    ) -> Self {
        Self::ServiceRejected {
            kind,
            message: message.into(),
            status,
            code: code.into(),
            error_type: ErrorType::from_status(status),
            request_id,
        }
    }

    /// Builds a client-side failure
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ClientUnavailable {
            message: message.into(),
        }
    }

    /// Taxonomy category of a rejection, `None` for client failures
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ServiceRejected { kind, .. } => Some(*kind),
            Self::ClientUnavailable { .. } => None,
        }
    }

    /// Checks whether this is a rejection of the given category
    #[must_use]
    pub fn is_kind(&self, expected: ErrorKind) -> bool {
        self.kind() == Some(expected)
    }

    /// Checks if this error represents an upstream (5xx) error
    #[must_use]
    pub const fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            Self::ServiceRejected {
                error_type: ErrorType::Service,
                ..
            }
        )
    }

    /// Short machine-readable code for reports
    #[must_use]
    pub fn taxonomy_code(&self) -> String {
        match self {
            Self::ServiceRejected { kind, .. } => kind.as_ref().to_string(),
            Self::ClientUnavailable { .. } => "ClientUnavailable".to_string(),
        }
    }

    /// Logs every detail field of the error at error level
    pub fn log_detail(&self) {
        match self {
            Self::ServiceRejected {
                kind,
                message,
                status,
                code,
                error_type,
                request_id,
            } => {
                tracing::error!(
                    "Request reached the service but was rejected with an error response"
                );
                tracing::error!(category = %kind, "Error Category:   {kind}");
                tracing::error!("Error Message:    {message}");
                tracing::error!("HTTP Status Code: {status}");
                tracing::error!("Error Code:       {code}");
                tracing::error!("Error Type:       {error_type}");
                tracing::error!(
                    "Request ID:       {}",
                    request_id.as_deref().unwrap_or("<none>")
                );
            }
            Self::ClientUnavailable { message } => {
                tracing::error!(
                    "Client could not communicate with the service, such as not being able to access the network"
                );
                tracing::error!("Error Message: {message}");
            }
        }
    }
}

/// Classifies any SDK operation error into the two top-level kinds
///
/// Service responses become `ServiceRejected` with the vendor detail
/// flattened; everything else (dispatch, timeout, construction, unparseable
/// responses) becomes `ClientUnavailable`.
pub(crate) fn classify<E>(error: SdkError<E>) -> ServiceError
where
    E: ProvideErrorMetadata + RequestId + std::error::Error + 'static,
{
    match &error {
        SdkError::ServiceError(service_err) => {
            let status = service_err.raw().status().as_u16();
            let err = service_err.err();
            let code = err.code().unwrap_or("Unknown").to_string();
            let message = err
                .message()
                .map_or_else(|| format!("{err}"), ToString::to_string);

            ServiceError::ServiceRejected {
                kind: ErrorKind::from_code(&code, status),
                message,
                status,
                code,
                error_type: ErrorType::from_status(status),
                request_id: err.request_id().map(ToString::to_string),
            }
        }
        _ => ServiceError::unavailable(DisplayErrorContext(&error).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vendor_codes_map_to_taxonomy() {
        assert_eq!(ErrorKind::from_code("BucketNotEmpty", 409), ErrorKind::NotEmpty);
        assert_eq!(ErrorKind::from_code("NoSuchKey", 404), ErrorKind::NotFound);
        assert_eq!(
            ErrorKind::from_code("BucketAlreadyOwnedByYou", 409),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            ErrorKind::from_code("ReceiptHandleIsInvalid", 400),
            ErrorKind::ReceiptHandleExpired
        );
        assert_eq!(
            ErrorKind::from_code("AWS.SimpleQueueService.NonExistentQueue", 400),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_unknown_code_falls_back_to_status() {
        assert_eq!(ErrorKind::from_code("Weird", 503), ErrorKind::Unavailable);
        assert_eq!(ErrorKind::from_code("Weird", 403), ErrorKind::AccessDenied);
        assert_eq!(ErrorKind::from_code("Weird", 400), ErrorKind::Other);
    }

    #[test]
    fn test_error_type_from_status() {
        assert_eq!(ErrorType::from_status(409), ErrorType::Client);
        assert_eq!(ErrorType::from_status(503), ErrorType::Service);
        assert_eq!(ErrorType::from_status(200), ErrorType::Unknown);
    }

    #[test]
    fn test_rejection_reports_category() {
        let err = ServiceError::rejected(
            ErrorKind::NotEmpty,
            "BucketNotEmpty",
            "The bucket you tried to delete is not empty",
            409,
            Some("req-1".to_string()),
        );

        assert!(err.is_kind(ErrorKind::NotEmpty));
        assert!(!err.is_upstream_error());
        assert_eq!(err.taxonomy_code(), "NotEmpty");
        assert!(err.to_string().contains("NotEmpty"));
    }

    #[test]
    fn test_client_unavailable_has_no_kind() {
        let err = ServiceError::unavailable("dispatch failure");

        assert_eq!(err.kind(), None);
        assert_eq!(err.taxonomy_code(), "ClientUnavailable");
        assert_eq!(err.to_string(), "client unavailable: dispatch failure");
    }
}
