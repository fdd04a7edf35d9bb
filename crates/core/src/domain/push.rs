use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
}

impl PushMessage {
    pub fn new(to: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// What the relay answered. A response is only a delivery success when the
/// HTTP status is 2xx; the ticket fields are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelayResponse {
    pub status: u16,
    pub ticket_id: Option<String>,
    pub ticket_error: Option<String>,
}

impl RelayResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ticket_id: None,
            ticket_error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_2xx() {
        assert!(RelayResponse::with_status(200).is_success());
        assert!(RelayResponse::with_status(204).is_success());
        assert!(!RelayResponse::with_status(199).is_success());
        assert!(!RelayResponse::with_status(300).is_success());
        assert!(!RelayResponse::with_status(400).is_success());
    }
}
