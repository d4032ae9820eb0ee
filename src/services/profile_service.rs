use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::events::PROFILES_TOPIC;
use crate::models::{Gender, GeoPoint, Photo, Preferences, Profile};
use crate::state::AppState;
use crate::validation;

const CACHE_PREFIX: &str = "profile:";

#[derive(Debug, Deserialize)]
pub struct NewProfile {
    pub email: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub location: GeoPoint,
    pub preferences: Option<Preferences>,
}

/// Partial update; absent fields keep their stored value. Identity,
/// email, verification and timestamps are never client-mutable.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub photos: Option<Vec<Photo>>,
    pub location: Option<GeoPoint>,
    pub is_active: Option<bool>,
    pub preferences: Option<PreferencesUpdate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub genders: Option<Vec<Gender>>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub max_distance_km: Option<f64>,
    pub show_me: Option<bool>,
}

pub fn cache_key(id: &str) -> String {
    format!("{}{}", CACHE_PREFIX, id)
}

pub async fn register_profile(state: &AppState, new: NewProfile) -> Result<Profile, Error> {
    let email = new.email.trim().to_lowercase();
    let name = new.name.trim().to_string();
    let preferences = new.preferences.unwrap_or_default();

    let today = Utc::now().date_naive();
    let mut errors = validation::validate_email(&email);
    errors.extend(validation::validate_profile_fields(
        &name,
        new.birth_date,
        today,
        new.bio.as_deref(),
        &new.photos,
        &new.location,
    ));
    errors.extend(validation::validate_preferences(&preferences));
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    if state.store.email_exists(&email).await? {
        return Err(Error::Conflict(format!(
            "profile with email '{}' already exists",
            email
        )));
    }

    let now = Utc::now();
    let profile = Profile {
        id: Uuid::new_v4().to_string(),
        email,
        name,
        birth_date: new.birth_date,
        gender: new.gender,
        bio: new.bio,
        interests: new.interests,
        photos: new.photos,
        location: new.location,
        is_active: true,
        is_verified: false,
        preferences,
        version: 0,
        created_at: now,
        updated_at: now,
        last_active_at: now,
    };

    state.store.insert(&profile).await?;
    info!("profile registered with id: {}", profile.id);

    cache_put(state, &profile).await;
    publish_profile_event(state, "registered", &profile.id).await;
    Ok(profile)
}

/// Read-through lookup: cache first, then primary store, populating the
/// cache on a store hit. A double miss is returned as `None` and is NOT
/// cached, so a subsequent create is visible immediately.
pub async fn get_profile(state: &AppState, id: &str) -> Result<Option<Profile>, Error> {
    let key = cache_key(id);
    let mut cache_ok = true;
    match state.cache.get(&key).await {
        Ok(Some(bytes)) => match serde_json::from_slice::<Profile>(&bytes) {
            Ok(profile) => {
                debug!("cache hit for profile id: {}", id);
                return Ok(Some(profile));
            }
            Err(e) => {
                warn!("discarding undecodable cache entry for {}: {}", id, e);
            }
        },
        Ok(None) => {
            debug!("cache miss for profile id: {}, fetching from store", id);
        }
        Err(e) => {
            cache_ok = false;
            warn!("cache read failed for {}: {}", id, e);
        }
    }

    let Some(profile) = state.store.find_by_id(id).await? else {
        return Ok(None);
    };
    if cache_ok {
        cache_put(state, &profile).await;
    }
    Ok(Some(profile))
}

pub async fn update_profile(
    state: &AppState,
    id: &str,
    update: ProfileUpdate,
) -> Result<Profile, Error> {
    let Some(existing) = state.store.find_by_id(id).await? else {
        return Err(Error::NotFound { id: id.to_string() });
    };

    let preferences = match update.preferences {
        Some(p) => Preferences {
            genders: p.genders.unwrap_or(existing.preferences.genders),
            min_age: p.min_age.unwrap_or(existing.preferences.min_age),
            max_age: p.max_age.unwrap_or(existing.preferences.max_age),
            max_distance_km: p.max_distance_km.or(existing.preferences.max_distance_km),
            show_me: p.show_me.unwrap_or(existing.preferences.show_me),
        },
        None => existing.preferences,
    };

    let now = Utc::now();
    let updated = Profile {
        id: existing.id,
        email: existing.email,
        name: update
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name),
        birth_date: update.birth_date.unwrap_or(existing.birth_date),
        gender: update.gender.unwrap_or(existing.gender),
        bio: update.bio.or(existing.bio),
        interests: update.interests.unwrap_or(existing.interests),
        photos: update.photos.unwrap_or(existing.photos),
        location: update.location.unwrap_or(existing.location),
        is_active: update.is_active.unwrap_or(existing.is_active),
        is_verified: existing.is_verified,
        preferences,
        version: existing.version + 1,
        created_at: existing.created_at,
        updated_at: now,
        last_active_at: now,
    };

    let mut errors = validation::validate_profile_fields(
        &updated.name,
        updated.birth_date,
        now.date_naive(),
        updated.bio.as_deref(),
        &updated.photos,
        &updated.location,
    );
    errors.extend(validation::validate_preferences(&updated.preferences));
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    state.store.update(&updated, existing.version).await?;

    cache_put(state, &updated).await;
    publish_profile_event(state, "updated", &updated.id).await;
    Ok(updated)
}

/// Deletes from the primary store and invalidates the cache entry even
/// when the store row was already gone (idempotent invalidation).
pub async fn delete_profile(state: &AppState, id: &str) -> Result<(), Error> {
    let found = state.store.delete_by_id(id).await?;
    cache_delete(state, id).await;
    if !found {
        return Err(Error::NotFound { id: id.to_string() });
    }
    info!("profile deleted with id: {}", id);
    publish_profile_event(state, "deleted", id).await;
    Ok(())
}

/// Best-effort: only runs after a successful primary write, never caches
/// an unpersisted value, and swallows cache failures.
async fn cache_put(state: &AppState, profile: &Profile) {
    let bytes = match serde_json::to_vec(profile) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("cache encode failed for {}: {}", profile.id, e);
            return;
        }
    };
    let key = cache_key(&profile.id);
    if let Err(e) = state.cache.set(&key, &bytes, state.config.cache_ttl).await {
        warn!("cache write failed for {}: {}", profile.id, e);
    }
}

async fn cache_delete(state: &AppState, id: &str) {
    if let Err(e) = state.cache.delete(&cache_key(id)).await {
        warn!("cache invalidation failed for {}: {}", id, e);
    }
}

async fn publish_profile_event(state: &AppState, event: &str, profile_id: &str) {
    let payload = serde_json::json!({
        "event": event,
        "profile_id": profile_id,
        "timestamp": Utc::now(),
    });
    if let Err(e) = state
        .events
        .publish(PROFILES_TOPIC, profile_id, payload.to_string().as_bytes())
        .await
    {
        warn!("event publish failed for {}: {}", profile_id, e);
    }
}
