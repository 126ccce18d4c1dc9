//! Realtime channels with throttled invalidation
//!
//! One channel exists per (tenant, table) while at least one subscriber is
//! attached. Each channel owns a worker task that coalesces bursts of
//! [`ChangeEvent`]s into a single [`Invalidation`] notice: a burst ends after
//! `debounce` without new events, or `max_wait` after its first event,
//! whichever comes first. Notices fan out to subscribers through a bounded
//! broadcast buffer; a subscriber that falls behind receives a `resync`
//! notice instead of the ones it missed.

use super::events::{ChangeEvent, ChangePublisher};
use crate::config::RealtimeConfig;
use crate::contract::model::{ChangeKind, ChangeTable};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, sleep_until, Instant};
use uuid::Uuid;

/// Identity of a realtime channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub tenant_id: Uuid,
    pub table: ChangeTable,
}

impl ChannelKey {
    pub fn new(tenant_id: Uuid, table: ChangeTable) -> Self {
        Self { tenant_id, table }
    }

    pub fn name(&self) -> String {
        format!("realtime:{}:{}", self.tenant_id, self.table)
    }
}

/// Coalesced notice that cached rows of a table are stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub channel: String,
    pub tenant_id: Uuid,
    pub table: ChangeTable,
    pub kinds: BTreeSet<ChangeKind>,
    pub record_ids: BTreeSet<Uuid>,
    pub store_ids: BTreeSet<Uuid>,
    pub product_ids: BTreeSet<Uuid>,
    /// Number of change events folded into this notice
    pub event_count: usize,
    pub first_at: DateTime<Utc>,
    pub last_at: DateTime<Utc>,
    /// Notices were dropped; everything cached for the table is suspect
    pub resync: bool,
}

impl Invalidation {
    fn start(key: &ChannelKey, event: &ChangeEvent) -> Self {
        let mut notice = Self {
            channel: key.name(),
            tenant_id: key.tenant_id,
            table: key.table,
            kinds: BTreeSet::new(),
            record_ids: BTreeSet::new(),
            store_ids: BTreeSet::new(),
            product_ids: BTreeSet::new(),
            event_count: 0,
            first_at: event.occurred_at,
            last_at: event.occurred_at,
            resync: false,
        };
        notice.absorb(event);
        notice
    }

    fn absorb(&mut self, event: &ChangeEvent) {
        self.kinds.insert(event.kind);
        self.record_ids.insert(event.record_id);
        if let Some(store_id) = event.store_id {
            self.store_ids.insert(store_id);
        }
        self.product_ids.extend(event.product_ids.iter().copied());
        self.event_count += 1;
        self.first_at = self.first_at.min(event.occurred_at);
        self.last_at = self.last_at.max(event.occurred_at);
    }

    fn resync(key: &ChannelKey) -> Self {
        let now = Utc::now();
        Self {
            channel: key.name(),
            tenant_id: key.tenant_id,
            table: key.table,
            kinds: BTreeSet::new(),
            record_ids: BTreeSet::new(),
            store_ids: BTreeSet::new(),
            product_ids: BTreeSet::new(),
            event_count: 0,
            first_at: now,
            last_at: now,
            resync: true,
        }
    }

    /// Whether a consumer caching rows of `store_id` must refresh
    pub fn touches_store(&self, store_id: Uuid) -> bool {
        self.resync || self.store_ids.is_empty() || self.store_ids.contains(&store_id)
    }
}

/// Point-in-time view of one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub channel: String,
    pub tenant_id: Uuid,
    pub table: ChangeTable,
    pub subscribers: usize,
    pub events_received: u64,
    pub notices_sent: u64,
}

#[derive(Default)]
struct ChannelCounters {
    received: AtomicU64,
    sent: AtomicU64,
}

struct ChannelSlot {
    events_tx: mpsc::UnboundedSender<ChangeEvent>,
    notices_tx: broadcast::Sender<Invalidation>,
    subscribers: usize,
    counters: Arc<ChannelCounters>,
}

struct Inner {
    config: RealtimeConfig,
    channels: Mutex<HashMap<ChannelKey, ChannelSlot>>,
    closed: AtomicBool,
}

impl Inner {
    fn release(&self, key: ChannelKey) {
        let mut channels = self.channels.lock();
        let Some(slot) = channels.get_mut(&key) else {
            return;
        };
        slot.subscribers = slot.subscribers.saturating_sub(1);
        if slot.subscribers == 0 {
            // Dropping the slot closes the event queue; the worker flushes and exits.
            channels.remove(&key);
            tracing::debug!(channel = %key.name(), "realtime channel closed");
        }
    }
}

/// Registry of live realtime channels
///
/// Cheap to clone; clones share the same channels. Must be used from within
/// a Tokio runtime because opening a channel spawns its worker.
#[derive(Clone)]
pub struct ChannelManager {
    inner: Arc<Inner>,
}

impl ChannelManager {
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                channels: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Attach to the channel for (tenant, table), opening it if needed
    pub fn subscribe(&self, tenant_id: Uuid, table: ChangeTable) -> Subscription {
        let key = ChannelKey::new(tenant_id, table);
        let mut channels = self.inner.channels.lock();
        if self.inner.closed.load(Ordering::SeqCst) {
            // Sender dropped at once: the first recv reports the end
            let (_, rx) = broadcast::channel(1);
            return Subscription {
                key,
                rx,
                manager: Weak::new(),
            };
        }
        let slot = channels
            .entry(key)
            .or_insert_with(|| open_channel(key, &self.inner.config));
        slot.subscribers += 1;
        tracing::debug!(
            channel = %key.name(),
            subscribers = slot.subscribers,
            "realtime subscriber attached"
        );

        Subscription {
            key,
            rx: slot.notices_tx.subscribe(),
            manager: Arc::downgrade(&self.inner),
        }
    }

    /// Route an event to its channel; dropped when nobody listens
    pub fn publish(&self, event: ChangeEvent) {
        let key = ChannelKey::new(event.tenant_id, event.table);
        let channels = self.inner.channels.lock();
        let Some(slot) = channels.get(&key) else {
            return;
        };
        slot.counters.received.fetch_add(1, Ordering::Relaxed);
        if slot.events_tx.send(event).is_err() {
            tracing::warn!(channel = %key.name(), "realtime worker gone, event dropped");
        }
    }

    /// Close every channel and refuse new ones
    ///
    /// Workers flush what they hold and exit; subscribers then see the end
    /// of their stream. Used on shutdown so long-lived streams let go.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let closed = std::mem::take(&mut *self.inner.channels.lock());
        tracing::info!(channels = closed.len(), "realtime channels closed");
    }

    pub fn subscriber_count(&self, tenant_id: Uuid, table: ChangeTable) -> usize {
        self.inner
            .channels
            .lock()
            .get(&ChannelKey::new(tenant_id, table))
            .map_or(0, |slot| slot.subscribers)
    }

    pub fn channel_count(&self) -> usize {
        self.inner.channels.lock().len()
    }

    /// Statistics for every open channel, ordered by channel name
    pub fn stats(&self) -> Vec<ChannelStats> {
        let mut stats: Vec<ChannelStats> = self
            .inner
            .channels
            .lock()
            .iter()
            .map(|(key, slot)| ChannelStats {
                channel: key.name(),
                tenant_id: key.tenant_id,
                table: key.table,
                subscribers: slot.subscribers,
                events_received: slot.counters.received.load(Ordering::Relaxed),
                notices_sent: slot.counters.sent.load(Ordering::Relaxed),
            })
            .collect();
        stats.sort_by(|a, b| a.channel.cmp(&b.channel));
        stats
    }
}

fn open_channel(key: ChannelKey, config: &RealtimeConfig) -> ChannelSlot {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (notices_tx, _) = broadcast::channel(config.channel_capacity.max(1));
    let counters = Arc::new(ChannelCounters::default());

    tokio::spawn(run_worker(
        key,
        events_rx,
        notices_tx.clone(),
        counters.clone(),
        config.debounce,
        config.max_wait,
    ));
    tracing::debug!(channel = %key.name(), "realtime channel opened");

    ChannelSlot {
        events_tx,
        notices_tx,
        subscribers: 0,
        counters,
    }
}

async fn run_worker(
    key: ChannelKey,
    mut events_rx: mpsc::UnboundedReceiver<ChangeEvent>,
    notices_tx: broadcast::Sender<Invalidation>,
    counters: Arc<ChannelCounters>,
    debounce: Duration,
    max_wait: Duration,
) {
    while let Some(first) = events_rx.recv().await {
        let mut notice = Invalidation::start(&key, &first);
        let deadline = Instant::now() + max_wait;
        let mut open = true;

        loop {
            tokio::select! {
                biased;
                _ = sleep_until(deadline) => break,
                next = events_rx.recv() => match next {
                    Some(event) => notice.absorb(&event),
                    None => {
                        open = false;
                        break;
                    }
                },
                _ = sleep(debounce) => break,
            }
        }

        counters.sent.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            channel = %notice.channel,
            events = notice.event_count,
            "realtime notice flushed"
        );
        // No receivers is fine: the last subscriber may have just left.
        let _ = notices_tx.send(notice);

        if !open {
            break;
        }
    }
}

/// Handle on a realtime channel; detaches on drop
pub struct Subscription {
    key: ChannelKey,
    rx: broadcast::Receiver<Invalidation>,
    manager: Weak<Inner>,
}

impl Subscription {
    pub fn key(&self) -> ChannelKey {
        self.key
    }

    pub fn channel_name(&self) -> String {
        self.key.name()
    }

    /// Next notice, or `None` once the manager has shut down
    pub async fn recv(&mut self) -> Option<Invalidation> {
        match self.rx.recv().await {
            Ok(notice) => Some(notice),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    channel = %self.key.name(),
                    skipped,
                    "realtime subscriber lagged, requesting resync"
                );
                Some(Invalidation::resync(&self.key))
            }
            Err(RecvError::Closed) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.manager.upgrade() {
            inner.release(self.key);
        }
    }
}

/// Publisher that feeds row changes into realtime channels
///
/// Stock-affecting changes are also mirrored onto the derived
/// `stock_levels` channel.
pub struct RealtimePublisher {
    manager: ChannelManager,
}

impl RealtimePublisher {
    pub fn new(manager: ChannelManager) -> Self {
        Self { manager }
    }
}

#[async_trait::async_trait]
impl ChangePublisher for RealtimePublisher {
    async fn publish(&self, event: ChangeEvent) -> anyhow::Result<()> {
        if let Some(derived) = event.derived_stock() {
            self.manager.publish(derived);
        }
        self.manager.publish(event);
        Ok(())
    }
}
