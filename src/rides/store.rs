//! # Ride Store
//!
//! Registry of Auto Share rides with a dual-mode backend.
//!
//! Every mutation follows the same shape:
//!
//! 1. If the connection is `Backend`, attempt the remote call and adopt the
//!    ride it returns.
//! 2. On failure, log, downgrade to `Simulation(Unreachable)` and record an
//!    advisory for the UI.
//! 3. Otherwise (or after a failure) apply the same mutation locally.
//!
//! Either way the ride list is written to device storage, so callers always
//! get a usable result.

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::{CreateRideInput, Ride, RideStatus};
use crate::backend::{BookingRequest, Offline, RideBackend};
use crate::config::StoreConfig;
use crate::connection::{Connection, ConnectionState};
use crate::error::{CommunityError, Result};
use crate::fixtures;
use crate::storage::{load_json, save_json, KeyValueStore, RIDES_KEY};
use crate::types::User;

/// Auto Share ride registry for one signed-in user.
pub struct RideStore<B: RideBackend, S: KeyValueStore> {
    backend: B,
    storage: S,
    config: StoreConfig,
    current_user: User,
    rides: Vec<Ride>,
    connection: Connection,
}

impl<S: KeyValueStore> RideStore<Offline, S> {
    /// A store that never talks to a backend.
    pub fn offline(storage: S, current_user: User) -> Self {
        Self::new(Offline, storage, current_user, StoreConfig::default())
    }
}

#[cfg(feature = "http")]
impl<S: KeyValueStore> RideStore<Option<crate::backend::HttpBackend>, S> {
    /// Build from config: an HTTP backend when a base URL is set, otherwise
    /// permanent simulation mode.
    pub fn connect(config: StoreConfig, storage: S, current_user: User) -> Self {
        let backend = match crate::backend::HttpBackend::new(&config) {
            Ok(backend) => Some(backend),
            Err(e) => {
                info!("[RideStore] No HTTP backend ({}), using device storage", e);
                None
            }
        };
        Self::new(backend, storage, current_user, config)
    }
}

impl<B: RideBackend, S: KeyValueStore> RideStore<B, S> {
    /// Create a store. The initial list comes from device storage (or seed
    /// data); call [`RideStore::refresh`] to pull from the backend.
    pub fn new(backend: B, storage: S, current_user: User, config: StoreConfig) -> Self {
        let connection = Connection::new("RideStore", config.backend_configured());
        let mut store = Self {
            backend,
            storage,
            config,
            current_user,
            rides: Vec::new(),
            connection,
        };
        store.rides = store.load_local();
        store
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }

    pub fn ride(&self, id: &str) -> Option<&Ride> {
        self.rides.iter().find(|r| r.id == id)
    }

    /// Upcoming rides, earliest departure first.
    pub fn upcoming_rides(&self) -> Vec<&Ride> {
        let mut rides: Vec<&Ride> = self
            .rides
            .iter()
            .filter(|r| r.status == RideStatus::Upcoming)
            .collect();
        rides.sort_by_key(|r| r.time);
        rides
    }

    /// Rides the current user offered or holds seats on.
    pub fn my_rides(&self) -> Vec<&Ride> {
        self.rides
            .iter()
            .filter(|r| r.involves(&self.current_user.id))
            .collect()
    }

    pub fn current_user(&self) -> &User {
        &self.current_user
    }

    pub fn connection_state(&self) -> &ConnectionState {
        self.connection.state()
    }

    pub fn is_backend_active(&self) -> bool {
        self.connection.state().is_backend()
    }

    /// Non-blocking message for the UI after a backend failure.
    pub fn advisory(&self) -> Option<&str> {
        self.connection.advisory()
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Pull all rides from the backend, falling back to device storage.
    pub async fn refresh(&mut self) {
        if self.connection.should_try_refresh() {
            match self.backend.fetch_rides().await {
                Ok(rides) => {
                    info!("[RideStore] Loaded {} rides from backend", rides.len());
                    self.rides = rides;
                    self.connection.mark_reachable();
                    self.persist();
                    return;
                }
                Err(e) => self.connection.downgrade("refresh", &e),
            }
        }
        self.rides = self.load_local();
    }

    /// Fetch one ride from the backend and merge it into the list.
    /// Falls back to the local copy when the backend is unavailable or does
    /// not know the ride.
    pub async fn fetch_ride(&mut self, id: &str) -> Option<Ride> {
        if self.connection.should_try_backend() {
            match self.backend.fetch_ride(id).await {
                Ok(Some(ride)) => {
                    self.upsert(ride.clone());
                    self.persist();
                    return Some(ride);
                }
                Ok(None) => debug!("[RideStore] Backend has no ride {}", id),
                Err(e) => self.connection.downgrade("fetch ride", &e),
            }
        }
        self.ride(id).cloned()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Offer a new ride. Fails only on invalid input.
    pub async fn create_ride(&mut self, input: CreateRideInput) -> Result<Ride> {
        if !(input.fare.is_finite() && input.fare > 0.0) {
            return Err(CommunityError::invalid_input("fare must be positive"));
        }
        if input.seats_total == 0 {
            return Err(CommunityError::invalid_input("a ride needs at least one seat"));
        }

        let now = Utc::now();
        let id = self.next_ride_id(now);
        let ride = Ride::from_input(id, input, self.current_user.clone(), now);

        if self.connection.should_try_backend() {
            match self.backend.create_ride(&ride).await {
                Ok(created) => {
                    info!("[RideStore] Created ride {} on backend", created.id);
                    self.upsert(created.clone());
                    self.persist();
                    return Ok(created);
                }
                Err(e) => self.connection.downgrade("create ride", &e),
            }
        }

        info!("[RideStore] Created ride {} locally", ride.id);
        self.rides.push(ride.clone());
        self.persist();
        Ok(ride)
    }

    /// Reserve `seats` for the current user, clamped to availability.
    /// `Ok(None)` when the ride is unknown.
    pub async fn book_seats(
        &mut self,
        ride_id: &str,
        seats: u32,
        note: Option<&str>,
    ) -> Result<Option<Ride>> {
        if seats == 0 {
            return Err(CommunityError::invalid_input("seats must be greater than zero"));
        }
        let Some(idx) = self.index_of(ride_id) else {
            return Ok(None);
        };
        if self.config.strict_status_transitions && self.rides[idx].status.is_terminal() {
            return Err(CommunityError::invalid_input(format!(
                "ride {} is {}",
                ride_id, self.rides[idx].status
            )));
        }

        if self.connection.should_try_backend() {
            let request = BookingRequest {
                passenger: self.current_user.clone(),
                seats,
                note: note.map(str::to_string),
            };
            match self.backend.book_seats(ride_id, &request).await {
                Ok(updated) => {
                    self.rides[idx] = updated.clone();
                    self.persist();
                    return Ok(Some(updated));
                }
                Err(e) => self.connection.downgrade("book seats", &e),
            }
        }

        let user = self.current_user.clone();
        let ride = &mut self.rides[idx];
        let granted = ride.book(&user, seats, note, Utc::now());
        if granted < seats {
            debug!(
                "[RideStore] Ride {} had {} of {} requested seats",
                ride_id, granted, seats
            );
        }
        let updated = ride.clone();
        self.persist();
        Ok(Some(updated))
    }

    /// Give up every seat the current user holds on a ride. The backend has
    /// no leave endpoint, so this is always a local mutation.
    pub fn leave_ride(&mut self, ride_id: &str) -> Option<Ride> {
        let user_id = self.current_user.id.clone();
        let ride = self.rides.iter_mut().find(|r| r.id == ride_id)?;
        let had_bookings = ride.seat_bookings.iter().any(|b| b.passenger.id == user_id);
        if !had_bookings {
            return Some(ride.clone());
        }

        let freed = ride.release_passenger(&user_id);
        info!("[RideStore] Left ride {}, freed {} seats", ride_id, freed);
        let updated = ride.clone();
        self.persist();
        Some(updated)
    }

    pub async fn cancel_ride(&mut self, ride_id: &str) -> Result<Option<Ride>> {
        self.update_ride_status(ride_id, RideStatus::Cancelled).await
    }

    /// Set a ride's status. Any transition is accepted unless strict
    /// transitions are configured.
    pub async fn update_ride_status(
        &mut self,
        ride_id: &str,
        status: RideStatus,
    ) -> Result<Option<Ride>> {
        let Some(idx) = self.index_of(ride_id) else {
            return Ok(None);
        };
        let current = self.rides[idx].status;
        if self.config.strict_status_transitions && !current.can_transition_to(status) {
            return Err(CommunityError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        if self.connection.should_try_backend() {
            match self.backend.update_ride_status(ride_id, status).await {
                Ok(updated) => {
                    self.rides[idx] = updated.clone();
                    self.persist();
                    return Ok(Some(updated));
                }
                Err(e) => self.connection.downgrade("update ride status", &e),
            }
        }

        self.rides[idx].status = status;
        debug!("[RideStore] Ride {}: {} -> {}", ride_id, current, status);
        let updated = self.rides[idx].clone();
        self.persist();
        Ok(Some(updated))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn index_of(&self, id: &str) -> Option<usize> {
        self.rides.iter().position(|r| r.id == id)
    }

    fn upsert(&mut self, ride: Ride) {
        match self.index_of(&ride.id) {
            Some(idx) => self.rides[idx] = ride,
            None => self.rides.push(ride),
        }
    }

    /// `ride_<millis>`, bumped while taken.
    fn next_ride_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        loop {
            let id = format!("ride_{}", millis);
            if self.index_of(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }

    /// Device snapshot, or seed rides on first run.
    fn load_local(&self) -> Vec<Ride> {
        if let Some(rides) = load_json::<Vec<Ride>, _>(&self.storage, RIDES_KEY) {
            debug!("[RideStore] Loaded {} rides from device storage", rides.len());
            return rides;
        }
        let seeded = fixtures::seed_rides(Utc::now());
        info!("[RideStore] Seeding {} rides", seeded.len());
        save_json(&self.storage, RIDES_KEY, &seeded);
        seeded
    }

    fn persist(&self) {
        save_json(&self.storage, RIDES_KEY, &self.rides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SimulationReason;
    use crate::rides::VehicleType;
    use crate::storage::MemoryStorage;
    use crate::types::Location;
    use chrono::Duration;

    fn me() -> User {
        User::new("me", "Kavya")
    }

    fn input(seats_total: u32) -> CreateRideInput {
        CreateRideInput {
            pickup: Location::Plain("Adyar / அடையாறு".to_string()),
            drop: Location::Plain("Guindy / கிண்டி".to_string()),
            time: Utc::now() + Duration::hours(1),
            fare: 50.0,
            seats_total,
            vehicle_type: VehicleType::Auto,
            notes: None,
        }
    }

    fn empty_store() -> RideStore<Offline, MemoryStorage> {
        let storage = MemoryStorage::new();
        save_json(&storage, RIDES_KEY, &Vec::<Ride>::new());
        RideStore::offline(storage, me())
    }

    fn conserved(ride: &Ride) -> bool {
        ride.seats_available + ride.booked_seats() == ride.seats_total
    }

    #[tokio::test]
    async fn test_first_run_seeds_and_persists() {
        let storage = MemoryStorage::new();
        let store = RideStore::offline(storage.clone(), me());
        assert!(!store.rides().is_empty());
        assert!(storage.get(RIDES_KEY).unwrap().is_some());
        assert_eq!(
            store.connection_state(),
            &ConnectionState::Simulation(SimulationReason::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_create_ride_defaults() {
        let mut store = empty_store();
        let ride = store.create_ride(input(3)).await.unwrap();
        assert!(ride.id.starts_with("ride_"));
        assert_eq!(ride.status, RideStatus::Upcoming);
        assert_eq!(ride.seats_available, 3);
        assert_eq!(ride.creator, me());
        assert_eq!(store.ride(&ride.id), Some(&ride));
    }

    #[tokio::test]
    async fn test_create_ride_ids_unique() {
        let mut store = empty_store();
        let a = store.create_ride(input(2)).await.unwrap();
        let b = store.create_ride(input(2)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_create_ride_rejects_bad_input() {
        let mut store = empty_store();
        let mut bad = input(0);
        assert!(store.create_ride(bad.clone()).await.is_err());
        bad.seats_total = 2;
        bad.fare = 0.0;
        assert!(store.create_ride(bad).await.is_err());
        assert!(store.rides().is_empty());
    }

    #[tokio::test]
    async fn test_book_seats_unknown_ride() {
        let mut store = empty_store();
        assert_eq!(store.book_seats("nope", 1, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_book_zero_seats_rejected() {
        let mut store = empty_store();
        let ride = store.create_ride(input(2)).await.unwrap();
        let err = store.book_seats(&ride.id, 0, None).await.unwrap_err();
        assert!(matches!(err, CommunityError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_book_then_leave_round_trip() {
        let mut store = empty_store();
        let ride = store.create_ride(input(4)).await.unwrap();

        let booked = store.book_seats(&ride.id, 3, Some("with luggage")).await.unwrap().unwrap();
        assert_eq!(booked.seats_available, 1);
        assert_eq!(booked.seats_held_by("me"), 3);
        assert!(conserved(&booked));

        let left = store.leave_ride(&ride.id).unwrap();
        assert_eq!(left.seats_available, 4);
        assert_eq!(left.seats_held_by("me"), 0);
        assert!(left.seat_bookings.is_empty());
    }

    #[tokio::test]
    async fn test_overbooking_is_clamped() {
        let mut store = empty_store();
        let ride = store.create_ride(input(2)).await.unwrap();
        let booked = store.book_seats(&ride.id, 5, None).await.unwrap().unwrap();
        assert_eq!(booked.seats_available, 0);
        assert_eq!(booked.seat_bookings.len(), 2);
    }

    #[tokio::test]
    async fn test_leave_without_bookings_is_noop() {
        let mut store = empty_store();
        let ride = store.create_ride(input(2)).await.unwrap();
        assert_eq!(store.leave_ride(&ride.id), Some(ride));
        assert_eq!(store.leave_ride("missing"), None);
    }

    #[tokio::test]
    async fn test_status_permissive_by_default() {
        let mut store = empty_store();
        let ride = store.create_ride(input(2)).await.unwrap();
        store.cancel_ride(&ride.id).await.unwrap();
        let revived = store
            .update_ride_status(&ride.id, RideStatus::Upcoming)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(revived.status, RideStatus::Upcoming);
    }

    #[tokio::test]
    async fn test_status_strict_rejects_terminal_exit() {
        let storage = MemoryStorage::new();
        save_json(&storage, RIDES_KEY, &Vec::<Ride>::new());
        let config = StoreConfig {
            strict_status_transitions: true,
            ..StoreConfig::default()
        };
        let mut store = RideStore::new(Offline, storage, me(), config);
        let ride = store.create_ride(input(2)).await.unwrap();

        store
            .update_ride_status(&ride.id, RideStatus::Completed)
            .await
            .unwrap();
        let err = store
            .update_ride_status(&ride.id, RideStatus::Upcoming)
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::InvalidTransition { .. }));
        assert!(store.book_seats(&ride.id, 1, None).await.is_err());
    }

    #[tokio::test]
    async fn test_mutations_survive_restart() {
        let storage = MemoryStorage::new();
        save_json(&storage, RIDES_KEY, &Vec::<Ride>::new());
        let mut store = RideStore::offline(storage.clone(), me());
        let ride = store.create_ride(input(3)).await.unwrap();
        store.book_seats(&ride.id, 1, None).await.unwrap();

        let mut reopened = RideStore::offline(storage, me());
        reopened.refresh().await;
        let restored = reopened.ride(&ride.id).unwrap();
        assert_eq!(restored.seats_available, 2);
        assert_eq!(restored.seat_bookings.len(), 1);
    }

    #[tokio::test]
    async fn test_my_and_upcoming_rides() {
        let mut store = empty_store();
        let mine = store.create_ride(input(2)).await.unwrap();
        let later = CreateRideInput {
            time: Utc::now() + Duration::hours(5),
            ..input(2)
        };
        let second = store.create_ride(later).await.unwrap();
        store.cancel_ride(&second.id).await.unwrap();

        let upcoming: Vec<&str> = store.upcoming_rides().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(upcoming, vec![mine.id.as_str()]);
        assert_eq!(store.my_rides().len(), 2);
    }
}
