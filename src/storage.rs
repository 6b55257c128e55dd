//! SQLite storage layer for Footprint.
//!
//! This is the record store and factor catalog the engine talks to. The engine
//! only reads factors; [`Storage::seed_factors`] exists so a fresh database
//! can be loaded with a starter catalog and is insert-if-absent.
//!
//! Timestamps are stored as RFC 3339 strings with nanosecond precision in UTC,
//! which sort lexicographically in time order.

use chrono::{DateTime, SecondsFormat, Utc};
use futures::{Stream, StreamExt, TryStreamExt};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, warn};

use crate::cache::RecordVersion;
use crate::model::{
    Breakdown, CategoryTotals, EmissionFactor, FootprintRecord, LatestFootprint, Period, UserInfo,
};

/// Latest record per user: newest `date_calculated`, ties to the greatest id.
const LATEST_PER_USER_SQL: &str = r#"
    SELECT r.user_id, r.total_co2e, u.username, u.region
    FROM (
        SELECT user_id, total_co2e,
               ROW_NUMBER() OVER (
                   PARTITION BY user_id
                   ORDER BY date_calculated DESC, id DESC
               ) AS rn
        FROM footprint_records
    ) r
    LEFT JOIN users u ON u.user_id = r.user_id
    WHERE r.rn = 1
    ORDER BY r.user_id
"#;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new storage instance and initialize the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:footprint.db" or "sqlite::memory:")
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let storage = Self { pool };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    async fn initialize_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emission_factors (
                factor_id TEXT PRIMARY KEY,
                value REAL NOT NULL,
                unit TEXT NOT NULL,
                source TEXT NOT NULL,
                category TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                username TEXT,
                region TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // No unique constraint on (user_id, period): rows written before
        // replace-on-recalculate may hold several records for one month.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS footprint_records (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                period TEXT NOT NULL,
                date_calculated TEXT NOT NULL,
                total_co2e REAL NOT NULL,
                energy REAL NOT NULL,
                transport REAL NOT NULL,
                consumption REAL NOT NULL,
                waste REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_footprint_records_user_period
            ON footprint_records(user_id, period)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All active factors, as one consistent listing.
    ///
    /// Rows with an unrecognised category are skipped.
    pub async fn get_all_active_factors(&self) -> anyhow::Result<Vec<EmissionFactor>> {
        let rows = sqlx::query(
            r#"
            SELECT factor_id, value, unit, source, category
            FROM emission_factors
            WHERE active = 1
            ORDER BY factor_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut factors = Vec::with_capacity(rows.len());
        for row in rows {
            let factor_id: String = row.get("factor_id");
            let category: String = row.get("category");
            match category.parse() {
                Ok(category) => factors.push(EmissionFactor {
                    factor_id,
                    value: row.get("value"),
                    unit: row.get("unit"),
                    source: row.get("source"),
                    category,
                }),
                Err(e) => warn!(factor_id = %factor_id, error = %e, "Skipping catalog row"),
            }
        }

        Ok(factors)
    }

    /// Insert factors that are not in the catalog yet. Existing ids are left
    /// untouched. Returns the number of rows inserted.
    pub async fn seed_factors(&self, factors: &[EmissionFactor]) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for factor in factors {
            inserted += sqlx::query(
                r#"
                INSERT OR IGNORE INTO emission_factors (factor_id, value, unit, source, category)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&factor.factor_id)
            .bind(factor.value)
            .bind(&factor.unit)
            .bind(&factor.source)
            .bind(factor.category.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Record display metadata for a user.
    pub async fn upsert_user(&self, user_id: &str, info: &UserInfo) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, region)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                region = excluded.region
            "#,
        )
        .bind(user_id)
        .bind(&info.username)
        .bind(&info.region)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist `record`, replacing every record the user already has for the
    /// same period.
    ///
    /// The delete and insert run in one transaction, so concurrent
    /// recalculations of the same month serialize and the stored total always
    /// belongs to the stored breakdown.
    pub async fn upsert_record(&self, record: FootprintRecord) -> anyhow::Result<FootprintRecord> {
        let period = record.period.to_string();
        let parts = *record.results.breakdown_co2e();

        let mut tx = self.pool.begin().await?;

        let replaced = sqlx::query(
            r#"
            DELETE FROM footprint_records
            WHERE user_id = ? AND period = ?
            "#,
        )
        .bind(&record.user_id)
        .bind(&period)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            r#"
            INSERT INTO footprint_records
                (id, user_id, period, date_calculated, total_co2e,
                 energy, transport, consumption, waste)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&period)
        .bind(format_timestamp(record.date_calculated))
        .bind(record.results.total_co2e())
        .bind(parts.energy)
        .bind(parts.transport)
        .bind(parts.consumption)
        .bind(parts.waste)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            user_id = %record.user_id,
            period = %period,
            replaced,
            "Footprint record stored"
        );

        Ok(record)
    }

    /// All records for a user, oldest period first.
    ///
    /// Rows with an unreadable period or timestamp are skipped.
    pub async fn list_records(&self, user_id: &str) -> anyhow::Result<Vec<FootprintRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, period, date_calculated, total_co2e,
                   energy, transport, consumption, waste
            FROM footprint_records
            WHERE user_id = ?
            ORDER BY period, date_calculated, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(record_from_row).collect())
    }

    /// Each user's latest total with their display metadata, ordered by user id.
    pub async fn list_latest_per_user(&self) -> anyhow::Result<Vec<LatestFootprint>> {
        self.stream_latest_per_user().try_collect().await
    }

    /// Same as [`Storage::list_latest_per_user`], row by row.
    pub fn stream_latest_per_user(
        &self,
    ) -> impl Stream<Item = anyhow::Result<LatestFootprint>> + '_ {
        sqlx::query(LATEST_PER_USER_SQL)
            .fetch(&self.pool)
            .map(|row| -> anyhow::Result<LatestFootprint> {
                let row = row?;
                Ok(LatestFootprint {
                    user_id: row.get("user_id"),
                    co2e: row.get("total_co2e"),
                    user_info: UserInfo {
                        username: row.get("username"),
                        region: row.get("region"),
                    },
                })
            })
    }

    /// Latest calculation time and record count for a user, or `None` when
    /// the user has no records.
    pub async fn record_version(&self, user_id: &str) -> anyhow::Result<Option<RecordVersion>> {
        let row = sqlx::query(
            r#"
            SELECT MAX(date_calculated) AS latest, COUNT(*) AS total
            FROM footprint_records
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let latest: Option<String> = row.get("latest");
        let record_count: i64 = row.get("total");

        Ok(latest
            .as_deref()
            .and_then(parse_timestamp)
            .map(|latest_calculated| RecordVersion {
                latest_calculated,
                record_count,
            }))
    }

    /// Remove all of a user's records. Returns the number deleted.
    pub async fn delete_user_records(&self, user_id: &str) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM footprint_records WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn record_from_row(row: &SqliteRow) -> Option<FootprintRecord> {
    let id: String = row.get("id");
    let raw_period: String = row.get("period");
    let raw_calculated: String = row.get("date_calculated");

    let period: Period = match raw_period.parse() {
        Ok(period) => period,
        Err(e) => {
            warn!(record_id = %id, error = %e, "Skipping record with unreadable period");
            return None;
        }
    };
    let Some(date_calculated) = parse_timestamp(&raw_calculated) else {
        warn!(record_id = %id, date_calculated = %raw_calculated, "Skipping record with unreadable timestamp");
        return None;
    };

    let totals = CategoryTotals {
        energy: row.get("energy"),
        transport: row.get("transport"),
        consumption: row.get("consumption"),
        waste: row.get("waste"),
    };

    Some(FootprintRecord {
        id,
        user_id: row.get("user_id"),
        period,
        date_calculated,
        results: Breakdown::restore(row.get("total_co2e"), totals),
    })
}
