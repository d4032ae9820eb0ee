//! Explicit field validation, run before any store access.
//! Each function returns the full list of problems it found.

use chrono::NaiveDate;

use crate::error::FieldError;
use crate::models::{age_on, GeoPoint, Photo, Preferences, MAX_PREFERENCE_AGE, MIN_PREFERENCE_AGE};

pub const MIN_REGISTRATION_AGE: i32 = 18;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_BIO_LENGTH: usize = 500;

pub fn validate_email(email: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push(FieldError::new("email", "email must not be empty"));
    } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        errors.push(FieldError::new("email", "email must be a valid address"));
    }
    errors
}

pub fn validate_profile_fields(
    name: &str,
    birth_date: NaiveDate,
    today: NaiveDate,
    bio: Option<&str>,
    photos: &[Photo],
    location: &GeoPoint,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "name must not be empty"));
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "name",
            format!("name must be at most {} characters", MAX_NAME_LENGTH),
        ));
    }

    if age_on(birth_date, today) < MIN_REGISTRATION_AGE {
        errors.push(FieldError::new(
            "birth_date",
            format!("profile owner must be at least {} years old", MIN_REGISTRATION_AGE),
        ));
    }

    if let Some(bio) = bio {
        if bio.chars().count() > MAX_BIO_LENGTH {
            errors.push(FieldError::new(
                "bio",
                format!("bio must be at most {} characters", MAX_BIO_LENGTH),
            ));
        }
    }

    if !photos.is_empty() {
        let primary_count = photos.iter().filter(|p| p.is_primary).count();
        if primary_count != 1 {
            errors.push(FieldError::new(
                "photos",
                "exactly one photo must be marked primary",
            ));
        }
    }

    if !(-90.0..=90.0).contains(&location.latitude) {
        errors.push(FieldError::new(
            "location.latitude",
            "latitude must be between -90 and 90",
        ));
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        errors.push(FieldError::new(
            "location.longitude",
            "longitude must be between -180 and 180",
        ));
    }

    errors
}

pub fn validate_preferences(preferences: &Preferences) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if preferences.genders.is_empty() {
        errors.push(FieldError::new(
            "preferences.genders",
            "at least one gender preference is required",
        ));
    }

    if preferences.min_age < MIN_PREFERENCE_AGE {
        errors.push(FieldError::new(
            "preferences.min_age",
            format!("min_age must be at least {}", MIN_PREFERENCE_AGE),
        ));
    }
    if preferences.max_age > MAX_PREFERENCE_AGE {
        errors.push(FieldError::new(
            "preferences.max_age",
            format!("max_age must be at most {}", MAX_PREFERENCE_AGE),
        ));
    }
    if preferences.min_age > preferences.max_age {
        errors.push(FieldError::new(
            "preferences.min_age",
            "min_age must not exceed max_age",
        ));
    }

    if let Some(km) = preferences.max_distance_km {
        // `!(km > 0.0)` also rejects NaN.
        if !(km > 0.0) {
            errors.push(FieldError::new(
                "preferences.max_distance_km",
                "max_distance_km must be positive",
            ));
        }
    }

    errors
}
