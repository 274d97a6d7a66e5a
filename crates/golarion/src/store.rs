//! 祝日・投稿先チャンネル・日次ジョブの実行記録を永続化する SQLite ストア。

use std::str::FromStr as _;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use golarion_calendar::{HolidayCalendar, HolidayRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

/// 日次更新の投稿先。ギルドごとに高々 1 件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedDestination {
    /// Discord ギルド ID
    pub guild_id: u64,
    /// 投稿先チャンネル ID
    pub channel_id: u64,
}

/// SQLite への非同期アクセスを提供するストア。clone してタスク間で共有できる。
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// データベースに接続し、マイグレーションを適用する。ファイルが無ければ作成する。
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .context("Invalid database URL")?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Self::migrate(pool).await
    }

    /// テスト用のインメモリデータベース。接続ごとに別の DB になるため接続数は 1 に固定する。
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(Self { pool })
    }

    /// 祝日を登録する。既に同じ月日の祝日があるものは無視し、追加した件数を返す。
    pub async fn seed_holidays(&self, holidays: &[HolidayRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for holiday in holidays {
            let result = sqlx::query(
                "INSERT INTO golarion_holidays (month, day, name) VALUES (?, ?, ?)
                 ON CONFLICT (month, day) DO NOTHING",
            )
            .bind(holiday.month())
            .bind(holiday.day())
            .bind(holiday.name())
            .execute(&mut *tx)
            .await
            .context("Failed to insert holiday")?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// 登録済みの祝日を月日順に取得する。不正な月日の行はログに残して読み飛ばす。
    pub async fn holidays(&self) -> Result<Vec<HolidayRecord>> {
        let rows: Vec<(i64, i64, String)> =
            sqlx::query_as("SELECT month, day, name FROM golarion_holidays ORDER BY month, day")
                .fetch_all(&self.pool)
                .await
                .context("Failed to fetch holidays")?;

        let holidays = rows
            .into_iter()
            .filter_map(|(month, day, name)| {
                let record = match (u32::try_from(month), u32::try_from(day)) {
                    (Ok(m), Ok(d)) => HolidayRecord::new(m, d, &name).map_err(anyhow::Error::from),
                    _ => Err(anyhow::anyhow!("Month or day out of range")),
                };
                match record {
                    Ok(holiday) => Some(holiday),
                    Err(e) => {
                        warn!(error = %e, month, day, name = %name, "Skipping invalid holiday record");
                        None
                    }
                }
            })
            .collect();

        Ok(holidays)
    }

    pub async fn holiday_calendar(&self) -> Result<HolidayCalendar> {
        Ok(HolidayCalendar::from_records(self.holidays().await?))
    }

    /// 投稿先を登録する。同じギルドに既存の登録があれば上書きする。
    pub async fn set_destination(&self, destination: TrackedDestination) -> Result<()> {
        sqlx::query(
            "INSERT INTO tracked_channels (guild_id, channel_id) VALUES (?, ?)
             ON CONFLICT (guild_id) DO UPDATE SET channel_id = excluded.channel_id",
        )
        .bind(to_db_id(destination.guild_id))
        .bind(to_db_id(destination.channel_id))
        .execute(&self.pool)
        .await
        .context("Failed to save tracked channel")?;

        debug!(
            guild_id = destination.guild_id,
            channel_id = destination.channel_id,
            "Tracked channel saved"
        );
        Ok(())
    }

    pub async fn destination(&self, guild_id: u64) -> Result<Option<TrackedDestination>> {
        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT guild_id, channel_id FROM tracked_channels WHERE guild_id = ?")
                .bind(to_db_id(guild_id))
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch tracked channel")?;

        Ok(row.map(from_db_row))
    }

    pub async fn destinations(&self) -> Result<Vec<TrackedDestination>> {
        let rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT guild_id, channel_id FROM tracked_channels ORDER BY guild_id")
                .fetch_all(&self.pool)
                .await
                .context("Failed to fetch tracked channels")?;

        Ok(rows.into_iter().map(from_db_row).collect())
    }

    /// ジョブを最後に実行した現地日付を取得する。
    pub async fn last_run(&self, job_id: &str) -> Result<Option<NaiveDate>> {
        let row: Option<(NaiveDate,)> =
            sqlx::query_as("SELECT last_run_date FROM scheduled_job_runs WHERE job_id = ?")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch last run date")?;

        Ok(row.map(|(date,)| date))
    }

    /// ジョブを実行した現地日付を記録する。
    pub async fn record_run(&self, job_id: &str, date: NaiveDate) -> Result<()> {
        sqlx::query(
            "INSERT INTO scheduled_job_runs (job_id, last_run_date) VALUES (?, ?)
             ON CONFLICT (job_id) DO UPDATE SET last_run_date = excluded.last_run_date",
        )
        .bind(job_id)
        .bind(date)
        .execute(&self.pool)
        .await
        .context("Failed to record job run")?;
        Ok(())
    }
}

// Discord の snowflake は 63 bit に収まるため i64 で保存する
fn to_db_id(id: u64) -> i64 {
    id as i64
}

fn from_db_row((guild_id, channel_id): (i64, i64)) -> TrackedDestination {
    TrackedDestination {
        guild_id: guild_id as u64,
        channel_id: channel_id as u64,
    }
}
