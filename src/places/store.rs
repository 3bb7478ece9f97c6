use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use super::geo::{haversine_km, LatLng};
use super::restaurant::{PlaceResult, Restaurant};

pub const DEFAULT_RADIUS_KM: f64 = 5.0;

fn default_radius() -> f64 {
    DEFAULT_RADIUS_KM
}

#[derive(Debug, Clone, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_radius")]
    pub radius_km: f64,
    #[serde(default)]
    pub confirmed_only: bool,
}

impl NearbyQuery {
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("lat must be in [-90, 90], got {}", self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!("lng must be in [-180, 180], got {}", self.lng));
        }
        if !(self.radius_km > 0.0) {
            return Err(format!("radius_km must be positive, got {}", self.radius_km));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub confirmed_gluten_free: bool,
    pub distance_km: f64,
}

/// Local restaurant table keyed by place id.
#[derive(Debug, Clone, Default)]
pub struct RestaurantStore {
    inner: Arc<RwLock<HashMap<String, Restaurant>>>,
}

impl RestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify search results and upsert them. Returns the stored rows.
    pub async fn refresh(&self, results: Vec<PlaceResult>) -> Vec<Restaurant> {
        let rows: Vec<Restaurant> = results.into_iter().map(Restaurant::from_place).collect();
        let confirmed = rows.iter().filter(|r| r.confirmed_gluten_free()).count();
        let total = {
            let mut map = self.inner.write().await;
            for row in &rows {
                map.insert(row.id.clone(), row.clone());
            }
            map.len()
        };
        info!(
            "🍽️ Restaurants refreshed | upserted={} confirmed={} total={}",
            rows.len(),
            confirmed,
            total
        );
        rows
    }

    pub async fn get(&self, id: &str) -> Option<Restaurant> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Restaurants within `radius_km`, closest first.
    pub async fn nearby(&self, q: &NearbyQuery) -> Vec<NearbyRestaurant> {
        let origin = LatLng::new(q.lat, q.lng);
        let map = self.inner.read().await;
        let mut hits: Vec<NearbyRestaurant> = map
            .values()
            .filter(|r| !q.confirmed_only || r.confirmed_gluten_free())
            .filter_map(|r| {
                let distance_km = haversine_km(origin, r.location());
                (distance_km <= q.radius_km).then(|| NearbyRestaurant {
                    restaurant: r.clone(),
                    confirmed_gluten_free: r.confirmed_gluten_free(),
                    distance_km,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.restaurant.id.cmp(&b.restaurant.id))
        });
        hits
    }
}
