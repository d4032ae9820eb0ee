use sqlx::SqlitePool;

pub const SQL_CREATE_PROFILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    gender TEXT NOT NULL,
    bio TEXT,
    interests TEXT NOT NULL DEFAULT '[]',
    photos TEXT NOT NULL DEFAULT '[]',
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_verified INTEGER NOT NULL DEFAULT 0,
    pref_genders TEXT NOT NULL,
    pref_min_age INTEGER NOT NULL,
    pref_max_age INTEGER NOT NULL,
    pref_max_distance_km REAL,
    show_me INTEGER NOT NULL DEFAULT 1,
    version INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_active_at TEXT NOT NULL
)
"#;

pub const SQL_CREATE_CANDIDATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_profiles_candidate
ON profiles (is_active, show_me, gender, birth_date)
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SQL_CREATE_PROFILES_TABLE).execute(pool).await?;
    sqlx::query(SQL_CREATE_CANDIDATE_INDEX).execute(pool).await?;
    Ok(())
}
