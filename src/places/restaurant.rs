use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::{haversine_km, DistanceUnit, LatLng};
use super::review::Review;

/// One place-search hit, reviews included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
    pub gluten_free_review_count: u32,
    pub celiac_review_count: u32,
    pub last_updated: DateTime<Utc>,
}

impl Restaurant {
    pub fn from_place(place: PlaceResult) -> Self {
        let mut gluten_free_review_count = 0;
        let mut celiac_review_count = 0;
        for review in &place.reviews {
            if review.mentions_gluten_free() {
                gluten_free_review_count += 1;
            }
            if review.mentions_celiac() {
                celiac_review_count += 1;
            }
        }
        Self {
            id: place.place_id,
            name: place.name,
            address: place.address,
            lat: place.lat,
            lng: place.lng,
            rating: place.rating,
            gluten_free_review_count,
            celiac_review_count,
            last_updated: Utc::now(),
        }
    }

    /// Both mentions are required, though not necessarily in the same review.
    pub fn confirmed_gluten_free(&self) -> bool {
        self.gluten_free_review_count > 0 && self.celiac_review_count > 0
    }

    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn distance_from(&self, lat: f64, lng: f64, unit: DistanceUnit) -> f64 {
        unit.from_km(haversine_km(self.location(), LatLng::new(lat, lng)))
    }
}
