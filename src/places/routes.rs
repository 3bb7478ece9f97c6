use axum::extract::{FromRef, Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::restaurant::{PlaceResult, Restaurant};
use super::store::{NearbyQuery, NearbyRestaurant, RestaurantStore};
use crate::error::{ApiError, ApiResult};

pub fn router<S>() -> Router<S>
where
    RestaurantStore: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/restaurants", get(nearby))
        .route("/restaurants/refresh", post(refresh))
        .route("/restaurants/:id", get(get_restaurant))
}

async fn refresh(
    State(store): State<RestaurantStore>,
    Json(results): Json<Vec<PlaceResult>>,
) -> Json<Vec<Restaurant>> {
    Json(store.refresh(results).await)
}

async fn nearby(
    State(store): State<RestaurantStore>,
    Query(q): Query<NearbyQuery>,
) -> ApiResult<Json<Vec<NearbyRestaurant>>> {
    q.validate().map_err(ApiError::BadRequest)?;
    Ok(Json(store.nearby(&q).await))
}

async fn get_restaurant(
    State(store): State<RestaurantStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<Restaurant>> {
    store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".into()))
}
