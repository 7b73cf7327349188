use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};

use crate::models::{
    NewTransitionRecord, ParcelId, ParcelRecord, ParcelStatus, ParcelUpdate, TrackingError,
    TrackingErrorKind, TransitionRecord, UserId,
};
use crate::persistence::{
    MigrationStore, ParcelStore, PersistenceResult, TransitionStore,
};
use crate::sqlite::migrations::{SqliteMigration, current_schema_version, migration, migrations};

const MIGRATIONS_TABLE: &str = "parceltrack_schema_migrations";

pub struct SqliteParcelStore {
    database_path: PathBuf,
}

impl SqliteParcelStore {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn planned_migrations(&self, from_version: i64) -> Vec<&'static SqliteMigration> {
        migrations()
            .iter()
            .filter(|entry| entry.version > from_version)
            .collect()
    }

    pub fn migrate_to_latest(&self) -> PersistenceResult<()> {
        self.apply_migration(current_schema_version())
    }

    fn with_connection<T>(
        &self,
        operation_name: &str,
        operation: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> PersistenceResult<T> {
        let mut connection = open_connection(&self.database_path)
            .map_err(|error| storage_error(operation_name, error))?;
        operation(&mut connection).map_err(|error| storage_error(operation_name, error))
    }
}

impl MigrationStore for SqliteParcelStore {
    fn current_version(&self) -> PersistenceResult<i64> {
        self.with_connection("current_version", |connection| {
            ensure_migrations_table(connection)?;
            read_current_version(connection)
        })
    }

    fn apply_migration(&self, target_version: i64) -> PersistenceResult<()> {
        if target_version < 0 || target_version > current_schema_version() {
            return Err(storage_error_text(
                "apply_migration",
                format!("invalid migration target version '{target_version}'"),
            ));
        }

        if target_version > 0 && migration(target_version).is_none() {
            return Err(storage_error_text(
                "apply_migration",
                format!("migration version '{target_version}' is not defined"),
            ));
        }

        self.with_connection("apply_migration", |connection| {
            ensure_migrations_table(connection)?;
            let current_version = read_current_version(connection)?;

            if target_version == current_version {
                // All DDL uses IF NOT EXISTS, so re-applying repairs a
                // database whose version row survived a lost table.
                for entry in migrations()
                    .iter()
                    .filter(|entry| entry.version <= target_version)
                {
                    connection.execute_batch(entry.up_sql)?;
                }
                return Ok(());
            }

            if target_version > current_version {
                for entry in migrations()
                    .iter()
                    .filter(|entry| entry.version > current_version && entry.version <= target_version)
                {
                    apply_up_migration(connection, entry)?;
                }
            } else {
                for entry in migrations()
                    .iter()
                    .filter(|entry| entry.version > target_version && entry.version <= current_version)
                    .rev()
                {
                    apply_down_migration(connection, entry)?;
                }
            }

            Ok(())
        })
    }
}

impl ParcelStore for SqliteParcelStore {
    fn create_parcel(&self, record: &ParcelRecord) -> PersistenceResult<()> {
        self.with_connection("create_parcel", |connection| {
            ensure_schema_ready(connection)?;
            connection.execute(
                "
INSERT INTO parcels (
    parcel_id, owner_id, status, current_location, description,
    destination, cost, created_at_unix, updated_at_unix
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
",
                params![
                    parcel_id_to_i64(record.id)?,
                    user_id_to_i64(record.owner)?,
                    status_to_str(record.status),
                    record.current_location.as_deref(),
                    record.description.as_deref(),
                    record.destination.as_deref(),
                    record.cost,
                    to_unix_seconds(record.created_at)?,
                    to_unix_seconds(record.updated_at)?,
                ],
            )?;
            Ok(())
        })
    }

    fn get_parcel(&self, parcel_id: ParcelId) -> PersistenceResult<Option<ParcelRecord>> {
        self.with_connection("get_parcel", |connection| {
            ensure_schema_ready(connection)?;
            let mut statement = connection.prepare(
                "
SELECT parcel_id, owner_id, status, current_location, description,
       destination, cost, created_at_unix, updated_at_unix
FROM parcels
WHERE parcel_id = ?1
",
            )?;
            let mut rows = statement.query(params![parcel_id_to_i64(parcel_id)?])?;
            let Some(row) = rows.next()? else {
                return Ok(None);
            };

            let id_raw: i64 = row.get(0)?;
            let owner_raw: i64 = row.get(1)?;
            let status_raw: String = row.get(2)?;
            let current_location: Option<String> = row.get(3)?;
            let description: Option<String> = row.get(4)?;
            let destination: Option<String> = row.get(5)?;
            let cost: Option<f64> = row.get(6)?;
            let created_at_unix: i64 = row.get(7)?;
            let updated_at_unix: i64 = row.get(8)?;

            Ok(Some(ParcelRecord {
                id: ParcelId(i64_to_u64(id_raw)?),
                owner: UserId(i64_to_u64(owner_raw)?),
                status: parse_status(&status_raw)?,
                current_location,
                description,
                destination,
                cost,
                created_at: from_unix_seconds(created_at_unix)?,
                updated_at: from_unix_seconds(updated_at_unix)?,
            }))
        })
    }

    fn update_parcel(&self, parcel_id: ParcelId, update: &ParcelUpdate) -> PersistenceResult<()> {
        let changed = self.with_connection("update_parcel", |connection| {
            ensure_schema_ready(connection)?;
            connection.execute(
                "
UPDATE parcels
SET status = COALESCE(?2, status),
    current_location = COALESCE(?3, current_location),
    updated_at_unix = ?4
WHERE parcel_id = ?1
",
                params![
                    parcel_id_to_i64(parcel_id)?,
                    update.status.map(status_to_str),
                    update.current_location.as_deref(),
                    to_unix_seconds(update.updated_at)?,
                ],
            )
        })?;

        if changed == 0 {
            return Err(TrackingError::not_found(parcel_id));
        }
        Ok(())
    }

    fn owner_of(&self, parcel_id: ParcelId) -> PersistenceResult<Option<UserId>> {
        self.with_connection("owner_of", |connection| {
            ensure_schema_ready(connection)?;
            let mut statement =
                connection.prepare("SELECT owner_id FROM parcels WHERE parcel_id = ?1")?;
            let mut rows = statement.query(params![parcel_id_to_i64(parcel_id)?])?;
            let Some(row) = rows.next()? else {
                return Ok(None);
            };
            let owner_raw: i64 = row.get(0)?;
            Ok(Some(UserId(i64_to_u64(owner_raw)?)))
        })
    }
}

impl TransitionStore for SqliteParcelStore {
    fn append_transition(&self, transition: &NewTransitionRecord) -> PersistenceResult<()> {
        self.with_connection("append_transition", |connection| {
            ensure_schema_ready(connection)?;
            connection.execute(
                "
INSERT INTO parcel_transitions (
    parcel_id, old_status, new_status, old_location, new_location, recorded_at_unix
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
",
                params![
                    parcel_id_to_i64(transition.parcel_id)?,
                    transition.old_status.map(status_to_str),
                    status_to_str(transition.new_status),
                    transition.old_location.as_deref(),
                    transition.new_location.as_deref(),
                    to_unix_seconds(transition.recorded_at)?,
                ],
            )?;
            Ok(())
        })
    }

    fn list_transitions(
        &self,
        parcel_id: ParcelId,
        limit: usize,
    ) -> PersistenceResult<Vec<TransitionRecord>> {
        self.with_connection("list_transitions", |connection| {
            ensure_schema_ready(connection)?;
            let mut statement = connection.prepare(
                "
SELECT transition_id, parcel_id, old_status, new_status,
       old_location, new_location, recorded_at_unix
FROM parcel_transitions
WHERE parcel_id = ?1
ORDER BY recorded_at_unix DESC, transition_id DESC
LIMIT ?2
",
            )?;

            let rows = statement.query_map(
                params![parcel_id_to_i64(parcel_id)?, to_i64(limit)?],
                |row| {
                    let transition_id: i64 = row.get(0)?;
                    let parcel_raw: i64 = row.get(1)?;
                    let old_status_raw: Option<String> = row.get(2)?;
                    let new_status_raw: String = row.get(3)?;
                    let old_location: Option<String> = row.get(4)?;
                    let new_location: Option<String> = row.get(5)?;
                    let recorded_at_unix: i64 = row.get(6)?;

                    let old_status = old_status_raw
                        .as_deref()
                        .map(parse_status)
                        .transpose()?;

                    Ok(TransitionRecord {
                        id: i64_to_u64(transition_id)?,
                        parcel_id: ParcelId(i64_to_u64(parcel_raw)?),
                        old_status,
                        new_status: parse_status(&new_status_raw)?,
                        old_location,
                        new_location,
                        recorded_at: from_unix_seconds(recorded_at_unix)?,
                    })
                },
            )?;

            rows.collect()
        })
    }
}

fn open_connection(database_path: &Path) -> rusqlite::Result<Connection> {
    if let Some(parent) = database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;
    }
    Connection::open(database_path)
}

fn ensure_migrations_table(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(&format!(
        "
CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at_unix INTEGER NOT NULL
);
"
    ))?;
    Ok(())
}

fn ensure_schema_ready(connection: &Connection) -> rusqlite::Result<()> {
    ensure_migrations_table(connection)?;
    let version = read_current_version(connection)?;
    if version <= 0 {
        return Err(storage_error_sqlite(
            "database schema is not initialized; apply migrations before parcel operations",
        ));
    }
    Ok(())
}

fn read_current_version(connection: &Connection) -> rusqlite::Result<i64> {
    connection.query_row(
        &format!("SELECT COALESCE(MAX(version), 0) FROM {MIGRATIONS_TABLE}"),
        [],
        |row| row.get(0),
    )
}

fn apply_up_migration(
    connection: &mut Connection,
    migration: &SqliteMigration,
) -> rusqlite::Result<()> {
    let transaction = connection.transaction()?;
    transaction.execute_batch(migration.up_sql)?;
    transaction.execute(
        &format!(
            "INSERT INTO {MIGRATIONS_TABLE} (version, name, applied_at_unix)
             VALUES (?1, ?2, strftime('%s', 'now'))"
        ),
        (migration.version, migration.name),
    )?;
    transaction.commit()?;
    Ok(())
}

fn apply_down_migration(
    connection: &mut Connection,
    migration: &SqliteMigration,
) -> rusqlite::Result<()> {
    let transaction = connection.transaction()?;
    transaction.execute_batch(migration.down_sql)?;
    transaction.execute(
        &format!("DELETE FROM {MIGRATIONS_TABLE} WHERE version = ?1"),
        [migration.version],
    )?;
    transaction.commit()?;
    Ok(())
}

fn storage_error(operation: &str, error: rusqlite::Error) -> TrackingError {
    storage_error_text(operation, error.to_string())
}

fn storage_error_text(operation: &str, message: impl AsRef<str>) -> TrackingError {
    TrackingError {
        parcel: None,
        kind: TrackingErrorKind::StorageFailure,
        message: format!("sqlite parcel store '{operation}' failed: {}", message.as_ref()),
    }
}

fn storage_error_sqlite(message: &str) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::other(message.to_string())))
}

fn status_to_str(value: ParcelStatus) -> &'static str {
    match value {
        ParcelStatus::Pending => "pending",
        ParcelStatus::InTransit => "in_transit",
        ParcelStatus::Delivered => "delivered",
        ParcelStatus::Cancelled => "cancelled",
    }
}

fn parse_status(raw: &str) -> rusqlite::Result<ParcelStatus> {
    match raw {
        "pending" => Ok(ParcelStatus::Pending),
        "in_transit" => Ok(ParcelStatus::InTransit),
        "delivered" => Ok(ParcelStatus::Delivered),
        "cancelled" => Ok(ParcelStatus::Cancelled),
        _ => Err(storage_error_sqlite(&format!(
            "unknown parcel status '{raw}' in sqlite record"
        ))),
    }
}

fn to_unix_seconds(value: SystemTime) -> rusqlite::Result<i64> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| {
        storage_error_sqlite(&format!("time before unix epoch is not supported: {error}"))
    })?;
    let seconds = i64::try_from(duration.as_secs())
        .map_err(|_| storage_error_sqlite("unix timestamp seconds exceed i64 range"))?;
    Ok(seconds)
}

fn from_unix_seconds(value: i64) -> rusqlite::Result<SystemTime> {
    if value < 0 {
        return Err(storage_error_sqlite(
            "negative unix timestamps are not supported",
        ));
    }
    let seconds = u64::try_from(value)
        .map_err(|_| storage_error_sqlite("failed to convert unix timestamp to u64"))?;
    Ok(UNIX_EPOCH + Duration::from_secs(seconds))
}

fn parcel_id_to_i64(value: ParcelId) -> rusqlite::Result<i64> {
    i64::try_from(value.0).map_err(|_| storage_error_sqlite("parcel id exceeds i64 range"))
}

fn user_id_to_i64(value: UserId) -> rusqlite::Result<i64> {
    i64::try_from(value.0).map_err(|_| storage_error_sqlite("user id exceeds i64 range"))
}

fn i64_to_u64(value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|_| storage_error_sqlite("negative id in sqlite record"))
}

fn to_i64(value: usize) -> rusqlite::Result<i64> {
    i64::try_from(value).map_err(|_| storage_error_sqlite("value exceeds i64 range"))
}
