use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, FieldError};
use crate::models::{Gender, Preferences, Profile};
use crate::services::{candidate_service, profile_service};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CandidateParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// Comma-separated, e.g. "FEMALE,NON_BINARY". Overrides stored preference.
    pub genders: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CandidatePage {
    pub page: u32,
    pub size: u32,
    pub count: usize,
    pub candidates: Vec<Profile>,
}

pub async fn find_candidates_handler(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<String>,
    Query(params): Query<CandidateParams>,
) -> Result<Json<CandidatePage>, Error> {
    let Some(requester) = profile_service::get_profile(&state, &profile_id).await? else {
        return Err(Error::NotFound { id: profile_id });
    };

    let preferences = merge_preferences(&requester.preferences, &params)?;
    let page = params.page.unwrap_or(0);
    let size = params
        .size
        .unwrap_or(state.config.default_page_size)
        .clamp(1, state.config.max_page_size);

    let candidates =
        candidate_service::find_candidates(&state, &profile_id, &preferences, page, size).await?;

    Ok(Json(CandidatePage {
        page,
        size,
        count: candidates.len(),
        candidates,
    }))
}

/// Request parameters override the stored preferences, the same way the
/// stored values act as defaults for an unqualified search.
fn merge_preferences(
    stored: &Preferences,
    params: &CandidateParams,
) -> Result<Preferences, Error> {
    let genders = match params.genders.as_deref() {
        Some(raw) => parse_genders(raw)?,
        None => stored.genders.clone(),
    };
    Ok(Preferences {
        genders,
        min_age: params.min_age.unwrap_or(stored.min_age),
        max_age: params.max_age.unwrap_or(stored.max_age),
        max_distance_km: params.max_distance_km.or(stored.max_distance_km),
        show_me: stored.show_me,
    })
}

fn parse_genders(raw: &str) -> Result<Vec<Gender>, Error> {
    let mut genders = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match Gender::parse(token) {
            Some(gender) => genders.push(gender),
            None => {
                return Err(Error::Validation(vec![FieldError::new(
                    "genders",
                    format!("unknown gender value: {}", token),
                )]))
            }
        }
    }
    Ok(genders)
}
