pub mod preferences;
pub mod profile;

pub use preferences::{Preferences, MAX_PREFERENCE_AGE, MIN_PREFERENCE_AGE};
pub use profile::{age_on, years_before, Gender, GeoPoint, Photo, Profile};
