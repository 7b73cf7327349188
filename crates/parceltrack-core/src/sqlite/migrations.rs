#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SqliteMigration {
    pub version: i64,
    pub name: &'static str,
    pub up_sql: &'static str,
    pub down_sql: &'static str,
}

const MIGRATION_0001: SqliteMigration = SqliteMigration {
    version: 1,
    name: "initial_parcel_schema",
    up_sql: r#"
CREATE TABLE IF NOT EXISTS parcels (
    parcel_id INTEGER PRIMARY KEY,
    owner_id INTEGER NOT NULL,
    status TEXT NOT NULL,
    current_location TEXT,
    description TEXT,
    destination TEXT,
    cost REAL,
    created_at_unix INTEGER NOT NULL,
    updated_at_unix INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_parcels_owner
    ON parcels (owner_id);
"#,
    down_sql: r#"
DROP INDEX IF EXISTS idx_parcels_owner;
DROP TABLE IF EXISTS parcels;
"#,
};

const MIGRATION_0002: SqliteMigration = SqliteMigration {
    version: 2,
    name: "parcel_transition_history",
    up_sql: r#"
CREATE TABLE IF NOT EXISTS parcel_transitions (
    transition_id INTEGER PRIMARY KEY AUTOINCREMENT,
    parcel_id INTEGER NOT NULL,
    old_status TEXT,
    new_status TEXT NOT NULL,
    old_location TEXT,
    new_location TEXT,
    recorded_at_unix INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_parcel_transitions_parcel_time
    ON parcel_transitions (parcel_id, recorded_at_unix DESC);
"#,
    down_sql: r#"
DROP INDEX IF EXISTS idx_parcel_transitions_parcel_time;
DROP TABLE IF EXISTS parcel_transitions;
"#,
};

const ALL_MIGRATIONS: [SqliteMigration; 2] = [MIGRATION_0001, MIGRATION_0002];

pub fn migrations() -> &'static [SqliteMigration] {
    &ALL_MIGRATIONS
}

pub fn migration(version: i64) -> Option<&'static SqliteMigration> {
    ALL_MIGRATIONS.iter().find(|entry| entry.version == version)
}

pub fn current_schema_version() -> i64 {
    ALL_MIGRATIONS[ALL_MIGRATIONS.len() - 1].version
}
