//! Backend seams for the two stores.
//!
//! The stores are generic over these traits so tests can inject fakes and
//! deployments without a backend can use [`Offline`].

use serde::{Deserialize, Serialize};

use crate::error::{CommunityError, Result};
use crate::localities::{Locality, LocalitySuggestion};
use crate::rides::{Ride, RideStatus};
use crate::types::User;

pub mod wire;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::HttpBackend;

/// Body of a seat booking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub passenger: User,
    pub seats: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Remote ride API.
#[allow(async_fn_in_trait)]
pub trait RideBackend {
    /// `GET /rides`
    async fn fetch_rides(&self) -> Result<Vec<Ride>>;
    /// `GET /rides/:id`; `Ok(None)` on 404
    async fn fetch_ride(&self, id: &str) -> Result<Option<Ride>>;
    /// `POST /rides`
    async fn create_ride(&self, ride: &Ride) -> Result<Ride>;
    /// `PATCH /rides/:id/status`
    async fn update_ride_status(&self, id: &str, status: RideStatus) -> Result<Ride>;
    /// `POST /rides/:id/bookings`
    async fn book_seats(&self, id: &str, request: &BookingRequest) -> Result<Ride>;
}

/// Remote locality API.
#[allow(async_fn_in_trait)]
pub trait LocalityBackend {
    /// `GET /localities`
    async fn fetch_localities(&self) -> Result<Vec<Locality>>;
    /// `POST /localities/:id/rate`
    async fn rate_locality(&self, id: &str, rating: f64) -> Result<Locality>;
    /// `POST /localities/suggestions`
    async fn submit_suggestion(&self, suggestion: &LocalitySuggestion) -> Result<Locality>;
}

/// `None` behaves like [`Offline`].
impl<B: RideBackend> RideBackend for Option<B> {
    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        match self {
            Some(backend) => backend.fetch_rides().await,
            None => Err(CommunityError::NotConfigured),
        }
    }

    async fn fetch_ride(&self, id: &str) -> Result<Option<Ride>> {
        match self {
            Some(backend) => backend.fetch_ride(id).await,
            None => Err(CommunityError::NotConfigured),
        }
    }

    async fn create_ride(&self, ride: &Ride) -> Result<Ride> {
        match self {
            Some(backend) => backend.create_ride(ride).await,
            None => Err(CommunityError::NotConfigured),
        }
    }

    async fn update_ride_status(&self, id: &str, status: RideStatus) -> Result<Ride> {
        match self {
            Some(backend) => backend.update_ride_status(id, status).await,
            None => Err(CommunityError::NotConfigured),
        }
    }

    async fn book_seats(&self, id: &str, request: &BookingRequest) -> Result<Ride> {
        match self {
            Some(backend) => backend.book_seats(id, request).await,
            None => Err(CommunityError::NotConfigured),
        }
    }
}

impl<B: LocalityBackend> LocalityBackend for Option<B> {
    async fn fetch_localities(&self) -> Result<Vec<Locality>> {
        match self {
            Some(backend) => backend.fetch_localities().await,
            None => Err(CommunityError::NotConfigured),
        }
    }

    async fn rate_locality(&self, id: &str, rating: f64) -> Result<Locality> {
        match self {
            Some(backend) => backend.rate_locality(id, rating).await,
            None => Err(CommunityError::NotConfigured),
        }
    }

    async fn submit_suggestion(&self, suggestion: &LocalitySuggestion) -> Result<Locality> {
        match self {
            Some(backend) => backend.submit_suggestion(suggestion).await,
            None => Err(CommunityError::NotConfigured),
        }
    }
}

/// Backend used when no base URL is configured. Every call reports
/// [`CommunityError::NotConfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RideBackend for Offline {
    async fn fetch_rides(&self) -> Result<Vec<Ride>> {
        Err(CommunityError::NotConfigured)
    }

    async fn fetch_ride(&self, _id: &str) -> Result<Option<Ride>> {
        Err(CommunityError::NotConfigured)
    }

    async fn create_ride(&self, _ride: &Ride) -> Result<Ride> {
        Err(CommunityError::NotConfigured)
    }

    async fn update_ride_status(&self, _id: &str, _status: RideStatus) -> Result<Ride> {
        Err(CommunityError::NotConfigured)
    }

    async fn book_seats(&self, _id: &str, _request: &BookingRequest) -> Result<Ride> {
        Err(CommunityError::NotConfigured)
    }
}

impl LocalityBackend for Offline {
    async fn fetch_localities(&self) -> Result<Vec<Locality>> {
        Err(CommunityError::NotConfigured)
    }

    async fn rate_locality(&self, _id: &str, _rating: f64) -> Result<Locality> {
        Err(CommunityError::NotConfigured)
    }

    async fn submit_suggestion(&self, _suggestion: &LocalitySuggestion) -> Result<Locality> {
        Err(CommunityError::NotConfigured)
    }
}
