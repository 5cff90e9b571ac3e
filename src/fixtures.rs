//! Seed data used when no backend data and no device snapshot exist.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;

use crate::localities::{Locality, Metrics};
use crate::rides::{BookingStatus, Ride, RideStatus, SeatBooking, VehicleType};
use crate::types::{Location, User};

struct LocalitySeed {
    id: &'static str,
    name_en: &'static str,
    name_ta: &'static str,
    area: &'static str,
    pincode: &'static str,
    description: &'static str,
    highlights: &'static [&'static str],
    metrics: [f64; 5],
    sources: &'static [&'static str],
}

const LOCALITY_SEEDS: &[LocalitySeed] = &[
    LocalitySeed {
        id: "mylapore",
        name_en: "Mylapore",
        name_ta: "மயிலாப்பூர்",
        area: "Central Chennai",
        pincode: "600004",
        description: "Temple town heart of old Madras with sabhas and mess halls",
        highlights: &["Kapaleeshwarar Temple", "Filter coffee", "Margazhi season"],
        metrics: [4.7, 4.3, 4.6, 3.5, 4.4],
        sources: &["community", "survey"],
    },
    LocalitySeed {
        id: "t-nagar",
        name_en: "T. Nagar",
        name_ta: "தி. நகர்",
        area: "Central Chennai",
        pincode: "600017",
        description: "Shopping district around Pondy Bazaar and Ranganathan Street",
        highlights: &["Pondy Bazaar", "Silk sarees", "Street food"],
        metrics: [3.9, 4.6, 4.5, 3.2, 4.8],
        sources: &["survey", "news"],
    },
    LocalitySeed {
        id: "adyar",
        name_en: "Adyar",
        name_ta: "அடையாறு",
        area: "South Chennai",
        pincode: "600020",
        description: "Leafy residential area near the estuary and Theosophical Society",
        highlights: &["Adyar Eco Park", "Besant Nagar beach", "Cafes"],
        metrics: [4.6, 4.1, 4.3, 3.0, 4.0],
        sources: &["community", "survey"],
    },
    LocalitySeed {
        id: "velachery",
        name_en: "Velachery",
        name_ta: "வேளச்சேரி",
        area: "South Chennai",
        pincode: "600042",
        description: "Fast growing suburb with MRTS access and malls",
        highlights: &["Phoenix Marketcity", "MRTS station", "Lake"],
        metrics: [3.8, 4.2, 3.9, 3.6, 4.1],
        sources: &["survey"],
    },
    LocalitySeed {
        id: "anna-nagar",
        name_en: "Anna Nagar",
        name_ta: "அண்ணா நகர்",
        area: "West Chennai",
        pincode: "600040",
        description: "Planned neighbourhood with wide roads, parks and the Metro",
        highlights: &["Anna Nagar Tower Park", "Metro", "Restaurants"],
        metrics: [4.5, 4.4, 4.2, 3.1, 4.0],
        sources: &["community", "news"],
    },
    LocalitySeed {
        id: "tambaram",
        name_en: "Tambaram",
        name_ta: "தாம்பரம்",
        area: "Suburbs",
        pincode: "600045",
        description: "Southern gateway with suburban rail and affordable housing",
        highlights: &["Suburban rail hub", "MCC campus"],
        metrics: [3.6, 4.0, 3.4, 4.3, 3.2],
        sources: &["survey"],
    },
];

static SEED_LOCALITIES: Lazy<Vec<Locality>> = Lazy::new(|| {
    LOCALITY_SEEDS
        .iter()
        .map(|seed| {
            let [liveability, connectivity, food_culture, affordability, buzz] = seed.metrics;
            let mut locality = Locality::new(
                seed.id,
                seed.name_en,
                seed.name_ta,
                Metrics::new(liveability, connectivity, food_culture, affordability, buzz),
            );
            locality.area = seed.area.to_string();
            locality.pincode = seed.pincode.to_string();
            locality.description = seed.description.to_string();
            locality.highlights = seed.highlights.iter().map(|s| s.to_string()).collect();
            locality.sources = seed.sources.iter().map(|s| s.to_string()).collect();
            locality
        })
        .collect()
});

/// Static locality list.
pub fn seed_localities() -> Vec<Locality> {
    SEED_LOCALITIES.clone()
}

/// Example rides departing after `now`.
pub fn seed_rides(now: DateTime<Utc>) -> Vec<Ride> {
    let lakshmi = User::new("seed-user-1", "Lakshmi");
    let karthik = User::new("seed-user-2", "Karthik");
    let priya = User::new("seed-user-3", "Priya");

    let mut morning = Ride {
        id: "ride_seed_1".to_string(),
        pickup: Location::structured("Velachery", "வேளச்சேரி", Some("MRTS station")),
        drop: Location::structured("Guindy", "கிண்டி", Some("Industrial Estate")),
        time: now + Duration::hours(2),
        fare: 30.0,
        seats_total: 3,
        seats_available: 3,
        creator: lakshmi,
        status: RideStatus::Upcoming,
        vehicle_type: VehicleType::ShareAuto,
        seat_bookings: Vec::new(),
        created_at: now - Duration::hours(1),
        notes: Some("Leaving sharp, no waiting".to_string()),
    };
    morning.seat_bookings.push(SeatBooking {
        seat_number: 1,
        passenger: priya,
        status: BookingStatus::Confirmed,
        booked_at: now - Duration::minutes(30),
        note: None,
    });
    morning.seats_available = 2;

    let evening = Ride {
        id: "ride_seed_2".to_string(),
        pickup: Location::Plain("T. Nagar / தி. நகர்".to_string()),
        drop: Location::Plain("Anna Nagar / அண்ணா நகர்".to_string()),
        time: now + Duration::hours(9),
        fare: 120.0,
        seats_total: 2,
        seats_available: 2,
        creator: karthik,
        status: RideStatus::Upcoming,
        vehicle_type: VehicleType::Auto,
        seat_bookings: Vec::new(),
        created_at: now - Duration::hours(3),
        notes: None,
    };

    vec![morning, evening]
}
