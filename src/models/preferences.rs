use serde::{Deserialize, Serialize};

use crate::models::Gender;

pub const MIN_PREFERENCE_AGE: i32 = 18;
pub const MAX_PREFERENCE_AGE: i32 = 120;

/// Matching preferences, embedded by value in a profile.
/// `max_distance_km = None` means no distance cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub genders: Vec<Gender>,
    pub min_age: i32,
    pub max_age: i32,
    pub max_distance_km: Option<f64>,
    pub show_me: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            genders: vec![Gender::Male, Gender::Female],
            min_age: 18,
            max_age: 100,
            max_distance_km: Some(50.0),
            show_me: true,
        }
    }
}
