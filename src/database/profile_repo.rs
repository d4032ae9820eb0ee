use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::database::{CandidateQuery, ProfileStore};
use crate::error::Error;
use crate::models::{Gender, GeoPoint, Photo, Preferences, Profile};

pub const SQL_FIND_PROFILE: &str = r#"
SELECT
    id, email, name, birth_date, gender, bio, interests, photos,
    latitude, longitude, is_active, is_verified,
    pref_genders, pref_min_age, pref_max_age, pref_max_distance_km, show_me,
    version, created_at, updated_at, last_active_at
FROM profiles
WHERE id = ?1
LIMIT 1
"#;

pub const SQL_EMAIL_EXISTS: &str = r#"
SELECT COUNT(1)
FROM profiles
WHERE email = ?1
"#;

pub const SQL_PROFILE_EXISTS: &str = r#"
SELECT COUNT(1)
FROM profiles
WHERE id = ?1
"#;

pub const SQL_INSERT_PROFILE: &str = r#"
INSERT INTO profiles (
    id, email, name, birth_date, gender, bio, interests, photos,
    latitude, longitude, is_active, is_verified,
    pref_genders, pref_min_age, pref_max_age, pref_max_distance_km, show_me,
    version, created_at, updated_at, last_active_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub const SQL_UPDATE_PROFILE: &str = r#"
UPDATE profiles SET
    name = ?,
    birth_date = ?,
    gender = ?,
    bio = ?,
    interests = ?,
    photos = ?,
    latitude = ?,
    longitude = ?,
    is_active = ?,
    is_verified = ?,
    pref_genders = ?,
    pref_min_age = ?,
    pref_max_age = ?,
    pref_max_distance_km = ?,
    show_me = ?,
    version = ?,
    updated_at = ?,
    last_active_at = ?
WHERE id = ? AND version = ?
"#;

pub const SQL_DELETE_PROFILE: &str = r#"
DELETE FROM profiles
WHERE id = ?1
"#;

pub const SQL_TOUCH_LAST_ACTIVE: &str = r#"
UPDATE profiles SET last_active_at = ?1
WHERE id = ?2
"#;

pub const SQL_CANDIDATES_BASE: &str = r#"
SELECT
    id, email, name, birth_date, gender, bio, interests, photos,
    latitude, longitude, is_active, is_verified,
    pref_genders, pref_min_age, pref_max_age, pref_max_distance_km, show_me,
    version, created_at, updated_at, last_active_at
FROM profiles
WHERE is_active = 1
  AND show_me = 1
"#;

pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    name: String,
    birth_date: NaiveDate,
    gender: String,
    bio: Option<String>,
    interests: String,
    photos: String,
    latitude: f64,
    longitude: f64,
    is_active: i64,
    is_verified: i64,
    pref_genders: String,
    pref_min_age: i64,
    pref_max_age: i64,
    pref_max_distance_km: Option<f64>,
    show_me: i64,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

fn json_column<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> sqlx::Result<T> {
    serde_json::from_str(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl TryFrom<ProfileRow> for Profile {
    type Error = sqlx::Error;

    fn try_from(row: ProfileRow) -> sqlx::Result<Self> {
        let gender = Gender::parse(&row.gender).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "gender".to_string(),
            source: format!("unknown gender value: {}", row.gender).into(),
        })?;
        let interests: Vec<String> = json_column("interests", &row.interests)?;
        let photos: Vec<Photo> = json_column("photos", &row.photos)?;
        let pref_genders: Vec<Gender> = json_column("pref_genders", &row.pref_genders)?;

        Ok(Profile {
            id: row.id,
            email: row.email,
            name: row.name,
            birth_date: row.birth_date,
            gender,
            bio: row.bio,
            interests,
            photos,
            location: GeoPoint {
                longitude: row.longitude,
                latitude: row.latitude,
            },
            is_active: row.is_active == 1,
            is_verified: row.is_verified == 1,
            preferences: Preferences {
                genders: pref_genders,
                min_age: row.pref_min_age as i32,
                max_age: row.pref_max_age as i32,
                max_distance_km: row.pref_max_distance_km,
                show_me: row.show_me == 1,
            },
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_active_at: row.last_active_at,
        })
    }
}

fn json_value<T: serde::Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value)
        .map_err(|e| Error::Store(sqlx::Error::Protocol(format!("json encode failed: {}", e))))
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, Error> {
        let row = sqlx::query_as::<_, ProfileRow>(SQL_FIND_PROFILE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Profile::try_from).transpose().map_err(Error::Store)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(SQL_EMAIL_EXISTS)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, profile: &Profile) -> Result<(), Error> {
        let interests = json_value(&profile.interests)?;
        let photos = json_value(&profile.photos)?;
        let pref_genders = json_value(&profile.preferences.genders)?;

        sqlx::query(SQL_INSERT_PROFILE)
            .bind(&profile.id)
            .bind(&profile.email)
            .bind(&profile.name)
            .bind(profile.birth_date)
            .bind(profile.gender.as_str())
            .bind(&profile.bio)
            .bind(interests)
            .bind(photos)
            .bind(profile.location.latitude)
            .bind(profile.location.longitude)
            .bind(profile.is_active as i64)
            .bind(profile.is_verified as i64)
            .bind(pref_genders)
            .bind(profile.preferences.min_age as i64)
            .bind(profile.preferences.max_age as i64)
            .bind(profile.preferences.max_distance_km)
            .bind(profile.preferences.show_me as i64)
            .bind(profile.version)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .bind(profile.last_active_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db)
                    if db.kind() == sqlx::error::ErrorKind::UniqueViolation =>
                {
                    Error::Conflict(format!(
                        "profile with email '{}' already exists",
                        profile.email
                    ))
                }
                _ => Error::Store(e),
            })?;
        Ok(())
    }

    async fn update(&self, profile: &Profile, expected_version: i64) -> Result<(), Error> {
        let interests = json_value(&profile.interests)?;
        let photos = json_value(&profile.photos)?;
        let pref_genders = json_value(&profile.preferences.genders)?;

        let result = sqlx::query(SQL_UPDATE_PROFILE)
            .bind(&profile.name)
            .bind(profile.birth_date)
            .bind(profile.gender.as_str())
            .bind(&profile.bio)
            .bind(interests)
            .bind(photos)
            .bind(profile.location.latitude)
            .bind(profile.location.longitude)
            .bind(profile.is_active as i64)
            .bind(profile.is_verified as i64)
            .bind(pref_genders)
            .bind(profile.preferences.min_age as i64)
            .bind(profile.preferences.max_age as i64)
            .bind(profile.preferences.max_distance_km)
            .bind(profile.preferences.show_me as i64)
            .bind(profile.version)
            .bind(profile.updated_at)
            .bind(profile.last_active_at)
            .bind(&profile.id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let count: i64 = sqlx::query_scalar(SQL_PROFILE_EXISTS)
                .bind(&profile.id)
                .fetch_one(&self.pool)
                .await?;
            if count == 0 {
                return Err(Error::NotFound {
                    id: profile.id.clone(),
                });
            }
            return Err(Error::Conflict(format!(
                "profile {} was modified concurrently",
                profile.id
            )));
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, Error> {
        let result = sqlx::query(SQL_DELETE_PROFILE)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<Profile>, Error> {
        let mut sql = String::from(SQL_CANDIDATES_BASE);
        let mut args = SqliteArguments::default();

        sql.push_str(" AND id != ?");
        args.add(query.exclude_id.as_str());

        let marks = vec!["?"; query.genders.len()].join(", ");
        sql.push_str(&format!(" AND gender IN ({})", marks));
        for gender in &query.genders {
            args.add(gender.as_str());
        }

        sql.push_str(" AND birth_date > ? AND birth_date <= ?");
        args.add(query.born_after);
        args.add(query.born_on_or_before);

        if let Some(bbox) = query.bbox {
            sql.push_str(" AND latitude BETWEEN ? AND ? AND longitude BETWEEN ? AND ?");
            args.add(bbox.min_lat);
            args.add(bbox.max_lat);
            args.add(bbox.min_lon);
            args.add(bbox.max_lon);
        }

        // Stable ordering keeps pagination deterministic across calls.
        sql.push_str(" ORDER BY id ASC LIMIT ?");
        args.add(query.scan_limit);

        let rows = sqlx::query_as_with::<_, ProfileRow, _>(&sql, args)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Profile::try_from(row).map_err(Error::Store))
            .collect()
    }

    async fn touch_last_active(&self, id: &str, at: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query(SQL_TOUCH_LAST_ACTIVE)
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
