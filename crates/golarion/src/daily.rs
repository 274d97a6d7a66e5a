//! 日次更新メッセージを登録済みの全チャンネルへ配信する。

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use serenity::all::ChannelId;
use serenity::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::messages;
use crate::scheduler::DailyJob;
use crate::store::{Store, TrackedDestination};
use crate::year_offset::YearOffset;

/// 投稿先が解決できなかった理由。ログに残して配信をスキップする。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    #[error("Guild {guild_id} not found")]
    GuildNotFound { guild_id: u64 },
    #[error("Channel {channel_id} not found")]
    ChannelNotFound { channel_id: u64 },
    #[error("Channel {channel_id} does not belong to guild {guild_id}")]
    ChannelNotInGuild { guild_id: u64, channel_id: u64 },
}

/// メッセージの配信手段。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 登録済みの投稿先を実際のチャンネルに解決する。
    async fn resolve(&self, destination: &TrackedDestination) -> Result<ChannelId, LookupMiss>;

    async fn send(&self, channel_id: ChannelId, content: &str) -> Result<()>;
}

/// 1 回の配信結果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// 投稿先が解決できずスキップした数
    pub skipped: usize,
    /// 送信に失敗した数
    pub failed: usize,
}

/// 現在のゴラリオン暦の日付と次の祝日を全投稿先へ送る日次ジョブ。
pub struct DailyUpdate {
    store: Store,
    year_offset: YearOffset,
    transport: Arc<dyn Transport>,
}

impl DailyUpdate {
    pub fn new(store: Store, year_offset: YearOffset, transport: Arc<dyn Transport>) -> Self {
        Self {
            store,
            year_offset,
            transport,
        }
    }

    /// `today` の日次更新を配信する。1 件の失敗で残りの配信を止めない。
    pub async fn deliver(&self, today: NaiveDate) -> Result<DeliveryReport> {
        let holidays = self.store.holiday_calendar().await?;
        let content = messages::daily_update(today, self.year_offset.get(), &holidays);
        let destinations = self.store.destinations().await?;

        let mut report = DeliveryReport::default();

        for destination in &destinations {
            let channel_id = match self.transport.resolve(destination).await {
                Ok(channel_id) => channel_id,
                Err(miss) => {
                    warn!(
                        guild_id = destination.guild_id,
                        channel_id = destination.channel_id,
                        reason = %miss,
                        "Skipping daily update destination"
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            match self.transport.send(channel_id, &content).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!(
                        guild_id = destination.guild_id,
                        channel_id = destination.channel_id,
                        error = %e,
                        "Failed to send daily update"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            %today,
            delivered = report.delivered,
            skipped = report.skipped,
            failed = report.failed,
            "Daily update delivered"
        );
        Ok(report)
    }
}

#[async_trait]
impl DailyJob for DailyUpdate {
    async fn run(&self, today: NaiveDate) -> Result<()> {
        self.deliver(today).await.map(|_| ())
    }
}
