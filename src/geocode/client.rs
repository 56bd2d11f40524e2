//! Nominatim reverse geocoding client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{ReverseGeocoder, ReverseResponse};
use crate::config::GeocoderConfig;
use crate::diagnostics::{Diagnostics, Event};
use crate::models::{Coordinate, LookupResult, Placeholders};

/// Build the pooled HTTP session shared by every lookup in a run
pub fn build_session(config: &GeocoderConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .build()
        .context("Failed to create HTTP client")
}

/// Looks up one coordinate at a time on a borrowed session.
///
/// The session is a cheap handle onto a shared connection pool; the caller
/// decides how long it lives.
pub struct GeocodeClient {
    session: Client,
    endpoint: Url,
    user_agent: String,
    timeout: Duration,
    placeholders: Placeholders,
    diagnostics: Arc<dyn Diagnostics>,
}

impl GeocodeClient {
    pub fn new(
        session: Client,
        config: &GeocoderConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self> {
        Ok(Self {
            session,
            endpoint: config.endpoint_url()?,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            placeholders: config.placeholders(),
            diagnostics,
        })
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_url(&self, coordinate: Coordinate) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lat", &coordinate.lat.to_string())
            .append_pair("lon", &coordinate.lon.to_string())
            .append_pair("format", "json")
            .append_pair("addressdetails", "1");
        url
    }

    async fn fetch(&self, coordinate: Coordinate) -> std::result::Result<LookupResult, Event> {
        let url = self.request_url(coordinate);
        debug!("GET {}", url);

        let response = self
            .session
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_event(coordinate, e))?;

        if !response.status().is_success() {
            return Err(Event::LookupStatus {
                coordinate,
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_event(coordinate, e))?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| Event::LookupBody {
                coordinate,
                message: e.to_string(),
            })?;

        match parsed.address {
            Some(address) => Ok(address.to_lookup(&self.placeholders)),
            None => {
                if let Some(reason) = parsed.error {
                    debug!("Geocoder said '{}' for {}", reason, coordinate);
                }
                Err(Event::NoAddress { coordinate })
            }
        }
    }
}

fn transport_event(coordinate: Coordinate, error: reqwest::Error) -> Event {
    if error.is_timeout() {
        Event::LookupTimeout { coordinate }
    } else {
        Event::LookupTransport {
            coordinate,
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodeClient {
    async fn lookup(&self, coordinate: Coordinate) -> LookupResult {
        match self.fetch(coordinate).await {
            Ok(result) => result,
            Err(event) => {
                self.diagnostics.record(event);
                LookupResult::not_found(&self.placeholders)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::geocode::test_server;

    fn client_for(endpoint: String) -> (GeocodeClient, Arc<RecordingDiagnostics>) {
        let config = GeocoderConfig {
            endpoint,
            ..GeocoderConfig::default()
        };
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let client = GeocodeClient::new(build_session(&config).unwrap(), &config, diagnostics.clone())
            .unwrap()
            .with_timeout(Duration::from_millis(300));
        (client, diagnostics)
    }

    fn point(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_request_url_carries_query() {
        let config = GeocoderConfig::default();
        let client = GeocodeClient::new(
            Client::new(),
            &config,
            Arc::new(RecordingDiagnostics::new()),
        )
        .unwrap();
        let url = client.request_url(point(23.5, -46.6));
        assert_eq!(
            url.as_str(),
            "https://nominatim.openstreetmap.org/reverse?lat=23.5&lon=-46.6&format=json&addressdetails=1"
        );
    }

    #[tokio::test]
    async fn test_successful_lookup() {
        let endpoint = test_server::spawn(test_server::scripted()).await;
        let (client, diagnostics) = client_for(endpoint);

        let result = client.lookup(point(23.5, -46.6)).await;
        assert_eq!(result, LookupResult::new("Rua 23.5", "Bairro -46.6"));
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_not_found() {
        let endpoint = test_server::spawn(test_server::scripted()).await;
        let (client, diagnostics) = client_for(endpoint);

        let result = client.lookup(point(1.5, 10.0)).await;
        assert!(result.is_not_found(&Placeholders::default()));
        assert_eq!(
            diagnostics.events(),
            vec![Event::LookupStatus {
                coordinate: point(1.5, 10.0),
                status: 500
            }]
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_found() {
        let endpoint = test_server::spawn(test_server::scripted()).await;
        let (client, diagnostics) = client_for(endpoint);

        let result = client.lookup(point(2.5, 10.0)).await;
        assert!(result.is_not_found(&Placeholders::default()));
        assert!(matches!(diagnostics.events()[0], Event::LookupBody { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_not_found() {
        let endpoint = test_server::spawn(test_server::scripted()).await;
        let (client, diagnostics) = client_for(endpoint);

        let result = client.lookup(point(3.5, 10.0)).await;
        assert!(result.is_not_found(&Placeholders::default()));
        assert_eq!(
            diagnostics.events(),
            vec![Event::LookupTimeout {
                coordinate: point(3.5, 10.0)
            }]
        );
    }

    #[tokio::test]
    async fn test_no_address_is_not_found() {
        let endpoint = test_server::spawn(test_server::scripted()).await;
        let (client, diagnostics) = client_for(endpoint);

        let result = client.lookup(point(4.5, 10.0)).await;
        assert!(result.is_not_found(&Placeholders::default()));
        assert!(matches!(diagnostics.events()[0], Event::NoAddress { .. }));
    }

    #[tokio::test]
    async fn test_user_agent_is_sent() {
        let endpoint = test_server::spawn(test_server::scripted()).await;
        let config = GeocoderConfig {
            endpoint,
            ..GeocoderConfig::default()
        };
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        // Bare session with no default agent; the client must add its own
        let client = GeocodeClient::new(Client::new(), &config, diagnostics.clone()).unwrap();

        let result = client.lookup(point(5.5, 10.0)).await;
        assert_eq!(result.street, "Rua 5.5");
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_not_found() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (client, diagnostics) = client_for(format!("http://{}/reverse", addr));
        let result = client.lookup(point(23.5, -46.6)).await;
        assert!(result.is_not_found(&Placeholders::default()));
        assert!(matches!(
            diagnostics.events()[0],
            Event::LookupTransport { .. }
        ));
    }
}
