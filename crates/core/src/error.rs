use thiserror::Error;

/// Failures of the one-shot push registration performed at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Physical device required")]
    NoDevice,

    #[error("Push permission not granted")]
    PermissionDenied,

    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    #[error("Push token registration failed: {0}")]
    Registration(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store rejected write with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Store unreachable: {0}")]
    Network(String),

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Relay unreachable: {0}")]
    Network(String),

    #[error("Invalid relay response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Notification channel '{0}' is not configured")]
    ChannelMissing(String),

    #[error("Failed to display notification: {0}")]
    Display(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_messages() {
        assert_eq!(TokenError::NoDevice.to_string(), "Physical device required");
        assert_eq!(
            TokenError::PermissionDenied.to_string(),
            "Push permission not granted"
        );
        assert!(TokenError::ConfigMissing("project id".to_string())
            .to_string()
            .contains("project id"));
    }

    #[test]
    fn test_store_error_display() {
        let error = StoreError::Rejected {
            status: 403,
            message: "PERMISSION_DENIED".to_string(),
        };
        assert!(error.to_string().contains("403"));
        assert!(error.to_string().contains("PERMISSION_DENIED"));
    }
}
