//! # Auto Share rides
//!
//! Ride offers with a seat inventory.
//!
//! ## Seat accounting
//!
//! Each `SeatBooking` reserves exactly one seat. For every ride:
//!
//! ```text
//! seats_available + |confirmed bookings| == seats_total
//! ```
//!
//! Seat numbers are positions, not identifiers: removing bookings
//! renumbers the survivors `1..N` in their original order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Location, User};

pub mod store;
pub use store::RideStore;

// ============================================================================
// Enums
// ============================================================================

/// Ride lifecycle. `Upcoming` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RideStatus {
    Upcoming,
    Completed,
    Cancelled,
    NoShow,
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RideStatus::Upcoming)
    }

    /// Strict transition table: upcoming may move anywhere, terminal states
    /// only to themselves.
    pub fn can_transition_to(self, next: RideStatus) -> bool {
        match self {
            RideStatus::Upcoming => true,
            terminal => terminal == next,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Upcoming => "upcoming",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
            RideStatus::NoShow => "no-show",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleType {
    Auto,
    Car,
    ShareAuto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

// ============================================================================
// Records
// ============================================================================

/// One reserved seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatBooking {
    /// 1-based position among the ride's bookings
    pub seat_number: u32,
    pub passenger: User,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A ride offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: String,
    pub pickup: Location,
    pub drop: Location,
    /// Departure time
    pub time: DateTime<Utc>,
    /// Fare per seat in rupees
    pub fare: f64,
    pub seats_total: u32,
    pub seats_available: u32,
    pub creator: User,
    pub status: RideStatus,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub seat_bookings: Vec<SeatBooking>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields supplied by the user when offering a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideInput {
    pub pickup: Location,
    pub drop: Location,
    pub time: DateTime<Utc>,
    pub fare: f64,
    pub seats_total: u32,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Ride {
    /// Build a fresh upcoming ride with every seat available.
    pub fn from_input(id: String, input: CreateRideInput, creator: User, now: DateTime<Utc>) -> Self {
        Self {
            id,
            pickup: input.pickup,
            drop: input.drop,
            time: input.time,
            fare: input.fare,
            seats_total: input.seats_total,
            seats_available: input.seats_total,
            creator,
            status: RideStatus::Upcoming,
            vehicle_type: input.vehicle_type,
            seat_bookings: Vec::new(),
            created_at: now,
            notes: input.notes,
        }
    }

    /// Number of seats held by confirmed bookings.
    pub fn booked_seats(&self) -> u32 {
        self.seat_bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count() as u32
    }

    /// Seats held by `user_id`.
    pub fn seats_held_by(&self, user_id: &str) -> u32 {
        self.seat_bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed && b.passenger.id == user_id)
            .count() as u32
    }

    pub fn is_full(&self) -> bool {
        self.seats_available == 0
    }

    /// Reserve up to `seats` for `passenger`, clamped to availability.
    /// Returns the number of seats actually reserved.
    pub fn book(
        &mut self,
        passenger: &User,
        seats: u32,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> u32 {
        let granted = seats.min(self.seats_available);
        let first = self.seat_bookings.len() as u32 + 1;
        for seat_number in first..first + granted {
            self.seat_bookings.push(SeatBooking {
                seat_number,
                passenger: passenger.clone(),
                status: BookingStatus::Confirmed,
                booked_at: now,
                note: note.map(str::to_string),
            });
        }
        self.seats_available -= granted;
        granted
    }

    /// Drop every booking held by `user_id`, renumber the rest and return
    /// the freed seats. Availability never exceeds `seats_total`.
    pub fn release_passenger(&mut self, user_id: &str) -> u32 {
        let before = self.seat_bookings.len();
        let freed = self.seats_held_by(user_id);
        self.seat_bookings.retain(|b| b.passenger.id != user_id);
        if self.seat_bookings.len() == before {
            return 0;
        }
        self.resequence();
        self.seats_available = (self.seats_available + freed).min(self.seats_total);
        freed
    }

    fn resequence(&mut self) {
        for (i, booking) in self.seat_bookings.iter_mut().enumerate() {
            booking.seat_number = i as u32 + 1;
        }
    }

    /// Whether `user_id` created this ride or holds a seat on it.
    pub fn involves(&self, user_id: &str) -> bool {
        self.creator.id == user_id || self.seat_bookings.iter().any(|b| b.passenger.id == user_id)
    }
}
