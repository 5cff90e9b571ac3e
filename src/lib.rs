//! # Chennai Community
//!
//! State stores behind a Tamil/English community app for Chennai residents.
//!
//! This library provides:
//! - **Auto Share**: ride offers with seat booking, leaving and status changes
//! - **Locality ratings**: weighted locality scores, ratings, community
//!   suggestions, filtering and analytics
//!
//! Both stores prefer a remote backend and fall back to device storage the
//! moment a call fails, so every operation returns a usable result.
//!
//! ## Features
//!
//! - **`http`** - reqwest client for the community backend
//! - **`persistence`** - SQLite key-value storage
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chennai_community::{MemoryStorage, LocalityStore};
//!
//! # tokio_test_block(async {
//! let mut store = LocalityStore::offline(MemoryStorage::new());
//! store.refresh().await;
//!
//! let rated = store.rate_locality("mylapore", 5.0).await.unwrap();
//! println!("Mylapore now scores {}", rated.unwrap().score);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

// Unified error handling
pub mod error;
pub use error::{CommunityError, Result};

// Store configuration
pub mod config;
pub use config::StoreConfig;

// Shared domain types
pub mod types;
pub use types::{Location, User};

// Backend reachability
pub mod connection;
pub use connection::{ConnectionState, SimulationReason};

// Device storage
pub mod storage;
#[cfg(feature = "persistence")]
pub use storage::SqliteStorage;
pub use storage::{KeyValueStore, MemoryStorage};

// Backend traits and clients
pub mod backend;
#[cfg(feature = "http")]
pub use backend::HttpBackend;
pub use backend::{BookingRequest, LocalityBackend, Offline, RideBackend};

// Seed data
pub mod fixtures;

// Auto Share rides
pub mod rides;
pub use rides::{
    BookingStatus, CreateRideInput, Ride, RideStatus, RideStore, SeatBooking, VehicleType,
};

// Locality ratings
pub mod localities;
pub use localities::{
    compute_score, suggestion_to_locality, Locality, LocalityAnalytics, LocalityFilters,
    LocalityStore, LocalitySuggestion, Metrics, PartialMetrics, SubmissionOutcome,
    SubmissionStatus, SuggestionInput,
};
