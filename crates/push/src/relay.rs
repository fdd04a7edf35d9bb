use async_trait::async_trait;
use geopush_core::{PushMessage, PushRelay, RelayError, RelayResponse};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::PushError;

pub const DEFAULT_EXPO_BASE_URL: &str = "https://exp.host";
const SEND_PATH: &str = "/--/api/v2/push/send";

#[derive(Debug, Deserialize)]
struct SendResponse {
    data: Option<PushTicket>,
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct PushTicket {
    status: String,
    id: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEntry {
    #[serde(default)]
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) message: String,
}

/// Client for the Expo push relay.
pub struct ExpoPushClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ExpoPushClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Sent as a bearer token when the project has push security enabled.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    async fn post_message(&self, message: &PushMessage) -> Result<RelayResponse, PushError> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, SEND_PATH))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(message);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let mut result = RelayResponse::with_status(status);
        match serde_json::from_str::<SendResponse>(&body) {
            Ok(parsed) => {
                if let Some(ticket) = parsed.data {
                    if ticket.status == "ok" {
                        result.ticket_id = ticket.id;
                    } else {
                        result.ticket_error = ticket
                            .message
                            .or_else(|| Some(format!("ticket status '{}'", ticket.status)));
                    }
                }
                if let Some(error) = parsed.errors.first() {
                    result.ticket_error = Some(format!("{}: {}", error.code, error.message));
                }
            }
            Err(e) => debug!(status, error = %e, "Relay response body is not a push ticket"),
        }

        Ok(result)
    }
}

#[async_trait]
impl PushRelay for ExpoPushClient {
    async fn send(&self, message: &PushMessage) -> Result<RelayResponse, RelayError> {
        let response = self.post_message(message).await?;
        if let Some(error) = &response.ticket_error {
            warn!(status = response.status, error = %error, "Relay reported a ticket error");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> PushMessage {
        PushMessage::new(
            "ExponentPushToken[abc]",
            "Test FCM",
            "Check your summary notification",
        )
    }

    #[tokio::test]
    async fn test_send_posts_message_and_reads_ticket() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/--/api/v2/push/send"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "to": "ExponentPushToken[abc]",
                "title": "Test FCM",
                "body": "Check your summary notification"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "status": "ok", "id": "ticket-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = ExpoPushClient::new(server.uri())
            .send(&message())
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.ticket_id.as_deref(), Some("ticket-1"));
        assert!(response.ticket_error.is_none());
    }

    #[tokio::test]
    async fn test_non_2xx_is_returned_not_raised() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{ "code": "VALIDATION_ERROR", "message": "\"to\" must be a push token" }]
            })))
            .mount(&server)
            .await;

        let response = ExpoPushClient::new(server.uri())
            .send(&PushMessage::new("", "t", "b"))
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert!(!response.is_success());
        assert!(response
            .ticket_error
            .as_deref()
            .unwrap()
            .starts_with("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_access_token_sent_as_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let response = ExpoPushClient::new(server.uri())
            .with_access_token("secret")
            .send(&message())
            .await
            .unwrap();

        assert!(response.is_success());
        assert!(response.ticket_id.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_network_error() {
        let err = ExpoPushClient::new("http://127.0.0.1:1")
            .send(&message())
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Network(_)));
    }
}
