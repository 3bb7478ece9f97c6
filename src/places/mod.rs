//! Gluten-free restaurant finder: review classification, distance, local table.
//!
//! Place search itself happens upstream; results are pushed in through
//! `RestaurantStore::refresh` (or `POST /restaurants/refresh`).

pub mod geo;
pub mod restaurant;
pub mod review;
pub mod routes;
pub mod store;

pub use geo::{haversine_km, DistanceUnit, LatLng};
pub use restaurant::{PlaceResult, Restaurant};
pub use review::Review;
pub use store::{NearbyQuery, NearbyRestaurant, RestaurantStore};
