//! Status Scheduler - periodic bot status panel
//!
//! Renders uptime, gateway latency, guild count and whitelist count into a
//! single panel message, refreshed at a fixed interval.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rankboard::{
    DomainError, MessageId, PanelBody, PanelGateway, PanelSlot, StatusReport, WhitelistRepository,
    WhitelistService,
};
use serenity::gateway::ShardManager;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Where the gateway heartbeat latency comes from
#[async_trait]
pub trait LatencySource: Send + Sync {
    /// `None` until a heartbeat has been acknowledged
    async fn latency(&self) -> Option<Duration>;
}

#[async_trait]
impl LatencySource for ShardManager {
    /// Worst latency across the running shards
    async fn latency(&self) -> Option<Duration> {
        let runners = self.runners.lock().await;
        runners.values().filter_map(|runner| runner.latency).max()
    }
}

/// Status panel scheduler
pub struct StatusScheduler<G: PanelGateway, R: WhitelistRepository> {
    slot: PanelSlot<G>,
    whitelist: Arc<WhitelistService<R>>,
    guild_count: Arc<AtomicUsize>,
    latency: Option<Arc<dyn LatencySource>>,
    started_at: DateTime<Utc>,
    interval: Duration,
}

impl<G, R> StatusScheduler<G, R>
where
    G: PanelGateway + 'static,
    R: WhitelistRepository + 'static,
{
    pub fn new(
        slot: PanelSlot<G>,
        whitelist: Arc<WhitelistService<R>>,
        guild_count: Arc<AtomicUsize>,
        started_at: DateTime<Utc>,
        interval: Duration,
    ) -> Self {
        Self {
            slot,
            whitelist,
            guild_count,
            latency: None,
            started_at,
            interval,
        }
    }

    pub fn with_latency(mut self, source: Arc<dyn LatencySource>) -> Self {
        self.latency = Some(source);
        self
    }

    /// Current status snapshot. A failing count is reported as zero.
    pub async fn report(&self) -> StatusReport {
        let whitelist_count = self.whitelist.count().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to count whitelist applications");
            0
        });
        let latency = match &self.latency {
            Some(source) => source.latency().await,
            None => None,
        };

        StatusReport {
            started_at: self.started_at,
            guild_count: self.guild_count.load(Ordering::Relaxed),
            whitelist_count,
            latency_ms: latency.map(|d| d.as_millis() as u64),
            updated_at: Utc::now(),
        }
    }

    /// Render the status panel once
    pub async fn tick(&self) -> Result<MessageId, DomainError> {
        let report = self.report().await;
        self.slot.reconcile(&PanelBody::Status(report)).await
    }

    /// Start the scheduler (runs in background)
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop. The first render happens immediately.
    async fn run(self) {
        tracing::info!(
            "📊 Status scheduler started (interval: {:?})",
            self.interval
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.tick().await {
                Ok(message_id) => {
                    tracing::debug!(message_id = %message_id, "Status panel updated");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "❌ Failed to update status panel");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::memory_pool;
    use crate::adapters::SqliteWhitelistRepository;
    use rankboard::{ChannelId, MemberId, MessageSummary, WhitelistForm};
    use std::sync::Mutex;

    /// Channel that keeps the latest body per message
    #[derive(Default)]
    struct RecordingChannel {
        messages: Mutex<Vec<(MessageId, PanelBody)>>,
        edits: AtomicUsize,
    }

    impl RecordingChannel {
        fn bodies(&self) -> Vec<PanelBody> {
            let messages = self.messages.lock().unwrap();
            messages.iter().map(|(_, b)| b.clone()).collect()
        }
    }

    #[async_trait]
    impl PanelGateway for RecordingChannel {
        async fn recent_messages(
            &self,
            _channel: ChannelId,
            _limit: u8,
        ) -> Result<Vec<MessageSummary>, DomainError> {
            Ok(Vec::new())
        }

        async fn send_panel(
            &self,
            _channel: ChannelId,
            body: &PanelBody,
        ) -> Result<MessageId, DomainError> {
            let mut messages = self.messages.lock().unwrap();
            let id = MessageId(messages.len() as u64 + 1);
            messages.push((id, body.clone()));
            Ok(id)
        }

        async fn edit_panel(
            &self,
            _channel: ChannelId,
            message: MessageId,
            body: &PanelBody,
        ) -> Result<(), DomainError> {
            let mut messages = self.messages.lock().unwrap();
            let entry = messages
                .iter_mut()
                .find(|(id, _)| *id == message)
                .ok_or_else(|| DomainError::not_found("Message", message))?;
            entry.1 = body.clone();
            self.edits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FixedLatency(Option<Duration>);

    #[async_trait]
    impl LatencySource for FixedLatency {
        async fn latency(&self) -> Option<Duration> {
            self.0
        }
    }

    async fn scheduler(
        channel: Arc<RecordingChannel>,
    ) -> StatusScheduler<RecordingChannel, SqliteWhitelistRepository> {
        let repo = Arc::new(SqliteWhitelistRepository::new(memory_pool().await));
        StatusScheduler::new(
            PanelSlot::new(channel, ChannelId(1)),
            Arc::new(WhitelistService::new(repo)),
            Arc::new(AtomicUsize::new(3)),
            Utc::now(),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn test_report_counts_whitelists() {
        let channel = Arc::new(RecordingChannel::default());
        let scheduler = scheduler(channel).await;
        let form = WhitelistForm {
            name: "Joao".into(),
            game_id: "1".into(),
            recruiter_name: "Ana".into(),
            recruiter_id: "2".into(),
        };
        scheduler.whitelist.submit(MemberId(5), form).await.unwrap();

        let report = scheduler.report().await;

        assert_eq!(report.guild_count, 3);
        assert_eq!(report.whitelist_count, 1);
        assert_eq!(report.latency_ms, None);
        assert!(report.updated_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_report_carries_gateway_latency() {
        let channel = Arc::new(RecordingChannel::default());
        let scheduler = scheduler(channel.clone())
            .await
            .with_latency(Arc::new(FixedLatency(Some(Duration::from_millis(87)))));

        assert_eq!(scheduler.report().await.latency_ms, Some(87));

        scheduler.tick().await.unwrap();
        let bodies = channel.bodies();
        assert!(matches!(&bodies[0], PanelBody::Status(r) if r.latency_ms == Some(87)));
    }

    #[tokio::test]
    async fn test_latency_unknown_before_first_heartbeat() {
        let channel = Arc::new(RecordingChannel::default());
        let scheduler = scheduler(channel)
            .await
            .with_latency(Arc::new(FixedLatency(None)));

        assert_eq!(scheduler.report().await.latency_ms, None);
    }

    #[tokio::test]
    async fn test_ticks_edit_one_message() {
        let channel = Arc::new(RecordingChannel::default());
        let scheduler = scheduler(channel.clone()).await;

        let first = scheduler.tick().await.unwrap();
        scheduler.guild_count.store(4, Ordering::Relaxed);
        let second = scheduler.tick().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(channel.edits.load(Ordering::SeqCst), 1);
        let bodies = channel.bodies();
        assert_eq!(bodies.len(), 1);
        assert!(matches!(&bodies[0], PanelBody::Status(r) if r.guild_count == 4));
    }
}
