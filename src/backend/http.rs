//! HTTP client for the community backend.
//!
//! One attempt per call: no retry or backoff. A failure is reported to the
//! calling store, which downgrades itself to simulation mode.

use std::time::Instant;

use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::wire::{ApiLocality, ApiRating, ApiRide, ApiStatusUpdate, ApiSuggestion};
use super::{BookingRequest, LocalityBackend, RideBackend};
use crate::config::StoreConfig;
use crate::error::{CommunityError, Result};
use crate::localities::{Locality, LocalitySuggestion};
use crate::rides::{Ride, RideStatus};

/// reqwest-backed implementation of both backend traits.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client for the configured base URL.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let base_url = config
            .api_base_url
            .as_deref()
            .ok_or(CommunityError::NotConfigured)?
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CommunityError::Http {
                message: format!("Failed to create HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn execute<T: DeserializeOwned>(&self, label: &str, req: RequestBuilder) -> Result<T> {
        let start = Instant::now();
        let resp = req.send().await.map_err(|e| {
            warn!("[HttpBackend] {} request error: {}", label, e);
            CommunityError::from(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CommunityError::Http {
                message: format!("{} returned {}", label, status),
                status_code: Some(status.as_u16()),
            });
        }

        let body = resp.json::<T>().await.map_err(|e| CommunityError::Http {
            message: format!("Parse error for {}: {}", label, e),
            status_code: Some(status.as_u16()),
        })?;

        debug!(
            "[HttpBackend] {} completed in {}ms",
            label,
            start.elapsed().as_millis()
        );
        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(&format!("GET {}", path), self.request(Method::GET, path))
            .await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let label = format!("{} {}", method, path);
        self.execute(&label, self.request(method, path).json(body))
            .await
    }
}

impl RideBackend for HttpBackend {
    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        let rides: Vec<ApiRide> = self.get("/rides").await?;
        Ok(rides.into_iter().map(Ride::from).collect())
    }

    async fn fetch_ride(&self, id: &str) -> Result<Option<Ride>> {
        match self.get::<ApiRide>(&format!("/rides/{}", id)).await {
            Ok(ride) => Ok(Some(ride.into())),
            Err(CommunityError::Http {
                status_code: Some(code),
                ..
            }) if code == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_ride(&self, ride: &Ride) -> Result<Ride> {
        let created: ApiRide = self
            .send(Method::POST, "/rides", &ApiRide::from(ride))
            .await?;
        Ok(created.into())
    }

    async fn update_ride_status(&self, id: &str, status: RideStatus) -> Result<Ride> {
        let updated: ApiRide = self
            .send(
                Method::PATCH,
                &format!("/rides/{}/status", id),
                &ApiStatusUpdate { status },
            )
            .await?;
        Ok(updated.into())
    }

    async fn book_seats(&self, id: &str, request: &BookingRequest) -> Result<Ride> {
        let updated: ApiRide = self
            .send(Method::POST, &format!("/rides/{}/bookings", id), request)
            .await?;
        Ok(updated.into())
    }
}

impl LocalityBackend for HttpBackend {
    async fn fetch_localities(&self) -> Result<Vec<Locality>> {
        let localities: Vec<ApiLocality> = self.get("/localities").await?;
        Ok(localities.into_iter().map(Locality::from).collect())
    }

    async fn rate_locality(&self, id: &str, rating: f64) -> Result<Locality> {
        let updated: ApiLocality = self
            .send(
                Method::POST,
                &format!("/localities/{}/rate", id),
                &ApiRating { rating },
            )
            .await?;
        Ok(updated.into())
    }

    async fn submit_suggestion(&self, suggestion: &LocalitySuggestion) -> Result<Locality> {
        let created: ApiLocality = self
            .send(
                Method::POST,
                "/localities/suggestions",
                &ApiSuggestion::from(suggestion),
            )
            .await?;
        Ok(created.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_base_url() {
        let err = HttpBackend::new(&StoreConfig::default()).unwrap_err();
        assert!(matches!(err, CommunityError::NotConfigured));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new(&StoreConfig::with_backend("http://localhost:3000/api/"))
            .unwrap();
        assert_eq!(backend.base_url(), "http://localhost:3000/api");
        assert_eq!(backend.url("/rides"), "http://localhost:3000/api/rides");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let backend = HttpBackend::new(&StoreConfig::with_backend("http://127.0.0.1:9")).unwrap();
        let err = backend.fetch_rides().await.unwrap_err();
        assert!(matches!(err, CommunityError::Http { .. }));
    }
}
