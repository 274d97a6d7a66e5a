//! 米国中部時間 (手動 DST ルール) の決まった時刻に 1 日 1 回ジョブを実行するスケジューラ。
//!
//! 実行した現地日付をストアに記録してから実行するため、
//! 再起動や再接続をまたいでも同じ日に 2 回実行されることはない。
//! 起動が発火時刻より遅れた日は、起動直後に 1 回だけ実行する。

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use golarion_calendar::clock;
use serenity::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::store::Store;

/// 1 日 1 回実行されるジョブ。
#[async_trait]
pub trait DailyJob: Send + Sync + 'static {
    /// `today` は発火時点の現地日付。
    async fn run(&self, today: NaiveDate) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// 登録済みジョブの情報。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub id: String,
    pub at: NaiveTime,
    pub next_run: Option<DateTime<Utc>>,
    /// ジョブのループが動いているかどうか
    pub active: bool,
}

struct JobSpec {
    id: String,
    at: NaiveTime,
    job: Arc<dyn DailyJob>,
    store: Store,
}

struct JobEntry {
    spec: Arc<JobSpec>,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    state: SchedulerState,
    jobs: BTreeMap<String, JobEntry>,
}

pub struct Scheduler {
    store: Store,
    inner: Mutex<Inner>,
}

impl Scheduler {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            inner: Mutex::new(Inner {
                state: SchedulerState::Stopped,
                jobs: BTreeMap::new(),
            }),
        }
    }

    /// スケジューラを開始する。既に開始済みなら何もせず `false` を返す。
    pub async fn start(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.state == SchedulerState::Running {
            info!("Scheduler is already running");
            return false;
        }

        info!("Starting the scheduler");
        inner.state = SchedulerState::Running;
        for entry in inner.jobs.values_mut() {
            entry.handle = Some(tokio::spawn(run_job_loop(entry.spec.clone())));
        }
        true
    }

    /// 毎日 `at` (現地時刻) に実行するジョブを登録する。
    ///
    /// 同じ ID のジョブが既にあれば何もせず `false` を返す。
    /// 開始済みのスケジューラに登録した場合はすぐに動き始める。
    pub async fn add_daily_job(
        &self,
        id: impl Into<String>,
        at: NaiveTime,
        job: Arc<dyn DailyJob>,
    ) -> bool {
        let id = id.into();
        let mut inner = self.inner.lock().await;
        if inner.jobs.contains_key(&id) {
            debug!(job_id = %id, "Job already registered");
            return false;
        }

        let spec = Arc::new(JobSpec {
            id: id.clone(),
            at,
            job,
            store: self.store.clone(),
        });
        let handle = (inner.state == SchedulerState::Running)
            .then(|| tokio::spawn(run_job_loop(spec.clone())));

        info!(job_id = %id, %at, "Daily job registered");
        inner.jobs.insert(id, JobEntry { spec, handle });
        true
    }

    pub async fn state(&self) -> SchedulerState {
        self.inner.lock().await.state
    }

    /// 登録済みジョブと次回実行予定を返す。
    pub async fn jobs(&self) -> Vec<ScheduledJob> {
        let now = Utc::now();
        self.inner
            .lock()
            .await
            .jobs
            .values()
            .map(|entry| ScheduledJob {
                id: entry.spec.id.clone(),
                at: entry.spec.at,
                next_run: clock::next_trigger_after(now, entry.spec.at),
                active: entry
                    .handle
                    .as_ref()
                    .is_some_and(|handle| !handle.is_finished()),
            })
            .collect()
    }
}

impl JobSpec {
    /// 実行すべき日であれば、実行日を記録してからジョブを実行する。
    ///
    /// ジョブの失敗やパニックはログに残すだけで、再実行はしない。
    async fn run_if_due(&self, now: DateTime<Utc>) -> Result<Option<NaiveDate>> {
        let last_run = self.store.last_run(&self.id).await?;
        let Some(today) = clock::due_date(now, self.at, last_run) else {
            return Ok(None);
        };

        self.store.record_run(&self.id, today).await?;
        info!(job_id = %self.id, %today, "Daily job triggered");

        let job = self.job.clone();
        match tokio::spawn(async move { job.run(today).await }).await {
            Ok(Ok(())) => info!(job_id = %self.id, %today, "Daily job finished"),
            Ok(Err(e)) => error!(job_id = %self.id, error = %e, "Daily job failed"),
            Err(e) => error!(job_id = %self.id, error = %e, "Daily job panicked"),
        }

        Ok(Some(today))
    }
}

async fn run_job_loop(spec: Arc<JobSpec>) {
    loop {
        if let Err(e) = spec.run_if_due(Utc::now()).await {
            error!(job_id = %spec.id, error = %e, "Failed to check daily job");
        }

        let now = Utc::now();
        let Some(next_run) = clock::next_trigger_after(now, spec.at) else {
            error!(job_id = %spec.id, "No upcoming trigger time, stopping job");
            return;
        };
        let wait = (next_run - now).to_std().unwrap_or_default();

        info!(
            job_id = %spec.id,
            next_run = %next_run,
            wait = %humantime::format_duration(Duration::from_secs(wait.as_secs())),
            "Next daily job scheduled"
        );
        tokio::time::sleep(wait).await;
    }
}
