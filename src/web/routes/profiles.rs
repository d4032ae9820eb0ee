use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::Error;
use crate::models::Profile;
use crate::services::profile_service::{self, NewProfile, ProfileUpdate};
use crate::state::AppState;

pub async fn register_profile_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewProfile>,
) -> Result<impl IntoResponse, Error> {
    let profile = profile_service::register_profile(&state, body).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<String>,
) -> Result<Json<Profile>, Error> {
    match profile_service::get_profile(&state, &profile_id).await? {
        Some(profile) => Ok(Json(profile)),
        None => Err(Error::NotFound { id: profile_id }),
    }
}

pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<String>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<Profile>, Error> {
    let profile = profile_service::update_profile(&state, &profile_id, body).await?;
    Ok(Json(profile))
}

pub async fn delete_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<String>,
) -> Result<StatusCode, Error> {
    profile_service::delete_profile(&state, &profile_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
