//! Report cadence sources.
//!
//! The reporter does not know how often it runs; it awaits a `Ticker`. Real
//! deployments use `IntervalTicker`, tests and manual triggers use
//! `ChannelTicker`.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. Returns `false` once the ticker is exhausted.
    async fn tick(&mut self) -> bool;

    /// Start a fresh period from now. Tickers without a schedule ignore this.
    fn restart(&mut self) {}
}

/// Fixed-period ticker. The first tick fires one full period after creation.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        // Missed ticks shift the schedule instead of firing in a burst.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }

    fn restart(&mut self) {
        self.interval.reset();
    }
}

/// Ticks once per message received; exhausted when every sender is dropped.
#[derive(Debug)]
pub struct ChannelTicker {
    rx: mpsc::Receiver<()>,
}

impl ChannelTicker {
    /// Create a ticker and the sender that drives it.
    pub fn new(buffer: usize) -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
