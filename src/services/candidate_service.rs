use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::database::{BoundingBox, CandidateQuery};
use crate::error::Error;
use crate::models::{years_before, Preferences, Profile};
use crate::services::profile_service;
use crate::state::AppState;
use crate::validation;

/// Candidate discovery for one requester: store-level prefilters
/// (gender, birth-date window, visibility, bounding box), then exact
/// age/distance checks here, then a page slice over the id-ordered
/// survivors.
pub async fn find_candidates(
    state: &AppState,
    requester_id: &str,
    preferences: &Preferences,
    page: u32,
    size: u32,
) -> Result<Vec<Profile>, Error> {
    let errors = validation::validate_preferences(preferences);
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let Some(requester) = profile_service::get_profile(state, requester_id).await? else {
        return Err(Error::NotFound {
            id: requester_id.to_string(),
        });
    };

    let today = Utc::now().date_naive();
    let (born_after, born_on_or_before) = birth_date_window(preferences, today);
    let query = CandidateQuery {
        exclude_id: requester.id.clone(),
        genders: preferences.genders.clone(),
        born_after,
        born_on_or_before,
        bbox: preferences.max_distance_km.map(|km| {
            bounding_box(requester.location.latitude, requester.location.longitude, km)
        }),
        scan_limit: state.config.candidate_scan_limit,
    };

    let rows = state.store.find_candidates(&query).await?;
    if rows.len() as i64 >= state.config.candidate_scan_limit {
        debug!(
            "candidate scan limit {} reached for requester {}, result set may be truncated",
            state.config.candidate_scan_limit, requester.id
        );
    }

    let mut candidates = Vec::new();
    for candidate in rows {
        // Self-exclusion by identity, independent of the store filter.
        if candidate.id == requester.id {
            continue;
        }
        let age = candidate.age_on(today);
        if age < preferences.min_age || age > preferences.max_age {
            continue;
        }
        if let Some(max_km) = preferences.max_distance_km {
            let distance = haversine_km(
                requester.location.latitude,
                requester.location.longitude,
                candidate.location.latitude,
                candidate.location.longitude,
            );
            if distance > max_km {
                continue;
            }
        }
        candidates.push(candidate);
    }

    if let Err(e) = state.store.touch_last_active(&requester.id, Utc::now()).await {
        warn!("last-active bump failed for {}: {}", requester.id, e);
    }

    let start = (page as usize).saturating_mul(size as usize);
    Ok(candidates
        .into_iter()
        .skip(start)
        .take(size as usize)
        .collect())
}

/// Birth dates eligible for `[min_age, max_age]` as of `today`:
/// born after `today - (max_age + 1) years` (exclusive) and on or
/// before `today - min_age years` (inclusive).
pub fn birth_date_window(preferences: &Preferences, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        years_before(today, preferences.max_age + 1),
        years_before(today, preferences.min_age),
    )
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    6371.0 * c
}

fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_change = radius_km / 111.0;
    let lat_rad = lat.to_radians();
    let lon_change = (radius_km / 111.0) / lat_rad.cos().abs();

    BoundingBox {
        min_lat: lat - lat_change,
        max_lat: lat + lat_change,
        min_lon: lon - lon_change,
        max_lon: lon + lon_change,
    }
}
