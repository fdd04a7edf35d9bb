use std::sync::Arc;

use async_trait::async_trait;
use geopush_core::permissions::ensure_granted;
use geopush_core::{
    DeviceToken, NotificationChannel, PermissionKind, PermissionService, Platform, TokenError,
    TokenProvider,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::PushError;
use crate::notifier::LocalNotifier;
use crate::relay::ApiErrorEntry;

const TOKEN_PATH: &str = "/--/api/v2/push/getExpoPushToken";

/// What the host knows about the device it runs on.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub platform: Platform,
    pub is_physical: bool,
    pub device_id: String,
    /// FCM registration token or APNs device token issued to this device.
    pub native_token: Option<String>,
}

impl DeviceInfo {
    pub fn new(platform: Platform, is_physical: bool) -> Self {
        Self {
            platform,
            is_physical,
            device_id: Uuid::new_v4().to_string(),
            native_token: None,
        }
    }

    pub fn with_native_token(mut self, token: impl Into<String>) -> Self {
        self.native_token = Some(token.into());
        self
    }

    fn push_type(&self) -> Option<&'static str> {
        match self.platform {
            Platform::Android => Some("fcm"),
            Platform::Ios => Some("apns"),
            Platform::Desktop => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    device_id: &'a str,
    development: bool,
    project_id: &'a str,
    device_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    data: Option<TokenData>,
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    expo_push_token: String,
}

/// Registers this installation with the Expo push service.
///
/// Steps, in order: configure the default channel where the platform needs
/// one, require a physical device, check then request notification
/// permission, require a project id, exchange the native token.
pub struct ExpoTokenProvider {
    client: Client,
    base_url: String,
    device: DeviceInfo,
    project_id: Option<String>,
    app_id: Option<String>,
    development: bool,
    permissions: Arc<dyn PermissionService>,
    notifier: Option<Arc<LocalNotifier>>,
}

impl ExpoTokenProvider {
    pub fn new(
        base_url: impl Into<String>,
        device: DeviceInfo,
        permissions: Arc<dyn PermissionService>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            device,
            project_id: None,
            app_id: None,
            development: false,
            permissions,
            notifier: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_project_id(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn with_app_id(mut self, app_id: Option<String>) -> Self {
        self.app_id = app_id;
        self
    }

    pub fn with_development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// Notifier whose default channel is configured during registration.
    pub fn with_notifier(mut self, notifier: Arc<LocalNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    async fn exchange(
        &self,
        push_type: &str,
        project_id: &str,
        native_token: &str,
    ) -> Result<DeviceToken, PushError> {
        let request = TokenRequest {
            kind: push_type,
            device_id: &self.device.device_id,
            development: self.development,
            project_id,
            device_token: native_token,
            app_id: self.app_id.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, TOKEN_PATH))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| PushError::InvalidResponse(format!("status {}: {}", status, e)))?;

        if let Some(error) = parsed.errors.first() {
            return Err(PushError::Api {
                status: status.as_u16(),
                message: format!("{}: {}", error.code, error.message),
            });
        }
        if !status.is_success() {
            return Err(PushError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        parsed
            .data
            .map(|d| DeviceToken::new(d.expo_push_token))
            .ok_or_else(|| PushError::InvalidResponse("missing expoPushToken".to_string()))
    }
}

#[async_trait]
impl TokenProvider for ExpoTokenProvider {
    async fn acquire_token(&self) -> Result<DeviceToken, TokenError> {
        if self.device.platform.requires_channel() {
            if let Some(notifier) = &self.notifier {
                notifier.set_channel(NotificationChannel::default_max());
            }
        }

        if !self.device.is_physical {
            return Err(TokenError::NoDevice);
        }
        let push_type = self.device.push_type().ok_or(TokenError::NoDevice)?;

        let status = ensure_granted(self.permissions.as_ref(), PermissionKind::Notifications).await;
        if !status.is_granted() {
            return Err(TokenError::PermissionDenied);
        }

        let project_id = self
            .project_id
            .as_deref()
            .ok_or_else(|| TokenError::ConfigMissing("EAS projectId missing".to_string()))?;
        let native_token = self
            .device
            .native_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TokenError::ConfigMissing("native device token missing".to_string()))?;

        debug!(push_type, project_id, "Exchanging native token for push token");
        let token = self.exchange(push_type, project_id, native_token).await?;
        info!(token = %token, "Push token acquired");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopush_core::{PermissionStatus, StaticPermissions};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn granted() -> Arc<StaticPermissions> {
        Arc::new(StaticPermissions::all_granted())
    }

    fn android_device() -> DeviceInfo {
        DeviceInfo::new(Platform::Android, true).with_native_token("fcm-native-token")
    }

    #[tokio::test]
    async fn test_acquire_token_exchanges_native_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/--/api/v2/push/getExpoPushToken"))
            .and(body_partial_json(json!({
                "type": "fcm",
                "projectId": "eas-project",
                "deviceToken": "fcm-native-token"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "expoPushToken": "ExponentPushToken[xyz]" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = Arc::new(LocalNotifier::new(Platform::Android));
        let provider = ExpoTokenProvider::new(server.uri(), android_device(), granted())
            .with_project_id(Some("eas-project".to_string()))
            .with_notifier(notifier.clone());

        let token = provider.acquire_token().await.unwrap();
        assert_eq!(token.as_str(), "ExponentPushToken[xyz]");

        let channel = notifier.channel("default").unwrap();
        assert_eq!(channel.importance, geopush_core::Importance::Max);
    }

    #[tokio::test]
    async fn test_simulator_is_rejected() {
        let provider = ExpoTokenProvider::new(
            "http://127.0.0.1:1",
            DeviceInfo::new(Platform::Ios, false),
            granted(),
        )
        .with_project_id(Some("eas-project".to_string()));

        assert_eq!(provider.acquire_token().await, Err(TokenError::NoDevice));
    }

    #[tokio::test]
    async fn test_denied_permission() {
        let permissions = Arc::new(StaticPermissions::new().with(
            PermissionKind::Notifications,
            PermissionStatus::Undetermined,
            PermissionStatus::Denied,
        ));
        let provider = ExpoTokenProvider::new("http://127.0.0.1:1", android_device(), permissions)
            .with_project_id(Some("eas-project".to_string()));

        assert_eq!(
            provider.acquire_token().await,
            Err(TokenError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn test_missing_project_id() {
        let provider = ExpoTokenProvider::new("http://127.0.0.1:1", android_device(), granted())
            .with_project_id(Some("  ".to_string()));

        assert!(matches!(
            provider.acquire_token().await,
            Err(TokenError::ConfigMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_registration_error_from_service() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{ "code": "VALIDATION_ERROR", "message": "invalid projectId" }]
            })))
            .mount(&server)
            .await;

        let provider = ExpoTokenProvider::new(server.uri(), android_device(), granted())
            .with_project_id(Some("eas-project".to_string()));

        match provider.acquire_token().await {
            Err(TokenError::Registration(message)) => {
                assert!(message.contains("invalid projectId"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
