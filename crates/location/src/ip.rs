use async_trait::async_trait;
use geopush_core::{Coordinates, LocationError, LocationProvider};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_IP_ENDPOINT: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Coarse position from an IP geolocation service.
pub struct IpLocationProvider {
    client: Client,
    endpoint: String,
}

impl IpLocationProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        debug!(endpoint = %self.endpoint, "Looking up IP location");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let lookup: IpLookup = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(format!("invalid lookup response: {}", e)))?;

        match (lookup.status.as_str(), lookup.lat, lookup.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Unavailable(
                lookup
                    .message
                    .unwrap_or_else(|| format!("lookup status '{}'", lookup.status)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_with(body: serde_json::Value, status: u16) -> (IpLocationProvider, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        let provider = IpLocationProvider::new(format!("{}/json/", server.uri()));
        (provider, server)
    }

    #[tokio::test]
    async fn test_successful_lookup() {
        let (provider, _server) =
            provider_with(json!({ "status": "success", "lat": -6.2, "lon": 106.8 }), 200).await;

        assert_eq!(
            provider.current_coordinates().await,
            Ok(Coordinates::new(-6.2, 106.8))
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_carries_message() {
        let (provider, _server) =
            provider_with(json!({ "status": "fail", "message": "private range" }), 200).await;

        assert_eq!(
            provider.current_coordinates().await,
            Err(LocationError::Unavailable("private range".to_string()))
        );
    }

    #[tokio::test]
    async fn test_http_error_is_unavailable() {
        let (provider, _server) = provider_with(json!({}), 503).await;

        assert!(matches!(
            provider.current_coordinates().await,
            Err(LocationError::Unavailable(_))
        ));
    }
}
