//! Backend JSON payloads.
//!
//! The backend speaks snake_case; the domain model (and device snapshots)
//! use camelCase. These types only exist to translate between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::localities::{
    Locality, LocalitySuggestion, Metrics, PartialMetrics, SubmissionStatus,
};
use crate::rides::{BookingStatus, Ride, RideStatus, SeatBooking, VehicleType};
use crate::types::{Location, User};

// ============================================================================
// Rides
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSeatBooking {
    pub seat_number: u32,
    pub passenger: User,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRide {
    pub id: String,
    pub pickup: Location,
    pub drop: Location,
    pub time: DateTime<Utc>,
    pub fare: f64,
    pub seats_total: u32,
    pub seats_available: u32,
    pub creator: User,
    pub status: RideStatus,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub seat_bookings: Vec<ApiSeatBooking>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatusUpdate {
    pub status: RideStatus,
}

impl From<ApiSeatBooking> for SeatBooking {
    fn from(b: ApiSeatBooking) -> Self {
        Self {
            seat_number: b.seat_number,
            passenger: b.passenger,
            status: b.status,
            booked_at: b.booked_at,
            note: b.note,
        }
    }
}

impl From<&SeatBooking> for ApiSeatBooking {
    fn from(b: &SeatBooking) -> Self {
        Self {
            seat_number: b.seat_number,
            passenger: b.passenger.clone(),
            status: b.status,
            booked_at: b.booked_at,
            note: b.note.clone(),
        }
    }
}

impl From<ApiRide> for Ride {
    fn from(r: ApiRide) -> Self {
        let mut ride = Self {
            id: r.id,
            pickup: r.pickup,
            drop: r.drop,
            time: r.time,
            fare: r.fare,
            seats_total: r.seats_total,
            seats_available: r.seats_available,
            creator: r.creator,
            status: r.status,
            vehicle_type: r.vehicle_type,
            seat_bookings: r.seat_bookings.into_iter().map(SeatBooking::from).collect(),
            created_at: r.created_at,
            notes: r.notes,
        };
        // The backend's counter is not trusted over its own booking list
        ride.seats_available = ride.seats_total.saturating_sub(ride.booked_seats());
        ride
    }
}

impl From<&Ride> for ApiRide {
    fn from(r: &Ride) -> Self {
        Self {
            id: r.id.clone(),
            pickup: r.pickup.clone(),
            drop: r.drop.clone(),
            time: r.time,
            fare: r.fare,
            seats_total: r.seats_total,
            seats_available: r.seats_available,
            creator: r.creator.clone(),
            status: r.status,
            vehicle_type: r.vehicle_type,
            seat_bookings: r.seat_bookings.iter().map(ApiSeatBooking::from).collect(),
            created_at: r.created_at,
            notes: r.notes.clone(),
        }
    }
}

// ============================================================================
// Localities
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApiMetrics {
    pub liveability: f64,
    pub connectivity: f64,
    pub food_culture: f64,
    pub affordability: f64,
    pub buzz: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ApiPartialMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_culture: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affordability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buzz: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLocality {
    pub id: String,
    pub name_en: String,
    pub name_ta: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub metrics: ApiMetrics,
    /// Ignored on read; the score is always recomputed locally
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub is_community_submission: bool,
    #[serde(default)]
    pub submission_status: Option<SubmissionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuggestion {
    pub id: String,
    pub name_en: String,
    pub name_ta: String,
    pub area: String,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub metrics: ApiPartialMetrics,
    #[serde(default)]
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRating {
    pub rating: f64,
}

impl From<ApiMetrics> for Metrics {
    fn from(m: ApiMetrics) -> Self {
        Metrics::new(m.liveability, m.connectivity, m.food_culture, m.affordability, m.buzz)
    }
}

impl From<&PartialMetrics> for ApiPartialMetrics {
    fn from(m: &PartialMetrics) -> Self {
        Self {
            liveability: m.liveability,
            connectivity: m.connectivity,
            food_culture: m.food_culture,
            affordability: m.affordability,
            buzz: m.buzz,
        }
    }
}

impl From<ApiLocality> for Locality {
    fn from(l: ApiLocality) -> Self {
        let mut locality = Locality::new(&l.id, &l.name_en, &l.name_ta, l.metrics.into());
        locality.area = l.area;
        locality.pincode = l.pincode;
        locality.description = l.description;
        locality.highlights = l.highlights;
        locality.sources = l.sources;
        locality.is_community_submission = l.is_community_submission;
        locality.submission_status = l.submission_status;
        locality
    }
}

impl From<&LocalitySuggestion> for ApiSuggestion {
    fn from(s: &LocalitySuggestion) -> Self {
        Self {
            id: s.id.clone(),
            name_en: s.name_en.clone(),
            name_ta: s.name_ta.clone(),
            area: s.area.clone(),
            pincode: s.pincode.clone(),
            description: s.description.clone(),
            highlights: s.highlights.clone(),
            metrics: ApiPartialMetrics::from(&s.metrics),
            submitted_by: s.submitted_by.clone(),
            submitted_at: s.submitted_at,
        }
    }
}
