//! `SQLite` implementation of [`AeratorStateStore`].
//!
//! Statuses live one row per aerator; mode and activation live in the single
//! `aerator_system` row. Both are read and written in one transaction.
//! Aerator rows are only ever updated, never created: a missing row is an
//! integrity fault. The system row is recreated by the next write.

use std::collections::BTreeSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use tambak_app::ports::AeratorStateStore;
use tambak_domain::aerator::{Aerator, AeratorSystemState, AutoReason, Mode};
use tambak_domain::error::{NotFoundError, TambakError};
use tambak_domain::id::{AERATOR_COUNT, AeratorId};
use tambak_domain::time::Timestamp;

use crate::error::StorageError;
use crate::pool::{decode_timestamp, encode_timestamp};

struct AeratorRow(Aerator);

impl<'r> FromRow<'r, SqliteRow> for AeratorRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let status: bool = row.try_get("status")?;
        let id = AeratorId::new(id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Ok(Self(Aerator::new(id, status)))
    }
}

struct SystemRow {
    mode: Mode,
    auto_activated: bool,
    auto_activation_reason: BTreeSet<AutoReason>,
    last_updated: Timestamp,
}

impl<'r> FromRow<'r, SqliteRow> for SystemRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let mode: String = row.try_get("mode")?;
        let auto_activated: bool = row.try_get("auto_activated")?;
        let reason_json: String = row.try_get("auto_activation_reason")?;
        let last_updated: String = row.try_get("last_updated")?;

        let mode: Mode = serde_json::from_value(serde_json::Value::String(mode))
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let auto_activation_reason = serde_json::from_str(&reason_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self {
            mode,
            auto_activated,
            auto_activation_reason,
            last_updated: decode_timestamp(&last_updated)?,
        })
    }
}

const SELECT_AERATORS: &str = "SELECT id, status FROM aerators ORDER BY id ASC";

const SELECT_SYSTEM: &str = r"
    SELECT mode, auto_activated, auto_activation_reason, last_updated
    FROM aerator_system
    WHERE id = 1
";

const UPDATE_AERATOR: &str = "UPDATE aerators SET status = ? WHERE id = ?";

const UPSERT_SYSTEM: &str = r"
    INSERT INTO aerator_system (id, mode, auto_activated, auto_activation_reason, last_updated)
    VALUES (1, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        mode = excluded.mode,
        auto_activated = excluded.auto_activated,
        auto_activation_reason = excluded.auto_activation_reason,
        last_updated = excluded.last_updated
";

/// `SQLite`-backed aerator state store.
pub struct SqliteAeratorStateStore {
    pool: SqlitePool,
}

impl SqliteAeratorStateStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AeratorStateStore for SqliteAeratorStateStore {
    async fn read(&self) -> Result<AeratorSystemState, TambakError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let aerators: Vec<AeratorRow> = sqlx::query_as(SELECT_AERATORS)
            .fetch_all(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        let system: Option<SystemRow> = sqlx::query_as(SELECT_SYSTEM)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;

        let system = system.ok_or_else(|| NotFoundError {
            entity: "AeratorSystem",
            id: "1".to_string(),
        })?;

        if aerators.len() != usize::from(AERATOR_COUNT) {
            let missing = AeratorId::all()
                .find(|id| !aerators.iter().any(|row| row.0.id == *id))
                .map_or(0, |id| i64::from(id.get()));
            return Err(StorageError::MissingRow {
                table: "aerators",
                id: missing,
            }
            .into());
        }

        Ok(AeratorSystemState {
            aerators: aerators.into_iter().map(|row| row.0).collect(),
            mode: system.mode,
            auto_activated: system.auto_activated,
            auto_activation_reason: system.auto_activation_reason,
            last_updated: system.last_updated,
        })
    }

    async fn write(&self, state: AeratorSystemState) -> Result<AeratorSystemState, TambakError> {
        let reason_json =
            serde_json::to_string(&state.auto_activation_reason).map_err(StorageError::from)?;

        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        for aerator in &state.aerators {
            let result = sqlx::query(UPDATE_AERATOR)
                .bind(aerator.status)
                .bind(i64::from(aerator.id.get()))
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            if result.rows_affected() == 0 {
                // dropping tx rolls back
                return Err(StorageError::MissingRow {
                    table: "aerators",
                    id: i64::from(aerator.id.get()),
                }
                .into());
            }
        }

        sqlx::query(UPSERT_SYSTEM)
            .bind(state.mode.to_string())
            .bind(state.auto_activated)
            .bind(&reason_json)
            .bind(encode_timestamp(state.last_updated))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;

        Ok(state)
    }
}
