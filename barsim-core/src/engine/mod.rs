//! Simulation kernel: the bar-by-bar dispatch loop.
//!
//! Each bar runs the same fixed pipeline, every step to completion before the next:
//!
//! 1. Fetch the next market update from the data source
//! 2. Order matcher executes orders submitted on earlier bars
//! 3. Strategy reacts to the update and publishes signals
//! 4. Portfolio receives this bar's signals, then this bar's fills
//! 5. Portfolio's orders are submitted to the matcher for the next bar
//!
//! Orders only reach the matcher after step 2 has finished, so an order
//! created while processing bar N is first evaluated against bar N+1.

pub mod state;

pub use state::{EngineConfig, RunSummary};

use crate::domain::{Fill, MarketUpdate, Signal};
use crate::error::EngineError;
use crate::event::Event;
use crate::execution::OrderMatcher;
use crate::sink::{EventQueue, EventSink};
use crate::traits::{DataSource, Portfolio, Strategy};
use chrono::{DateTime, Utc};

/// Drives one simulation over a data source.
pub struct Engine<D, S, P> {
    config: EngineConfig,
    data_source: D,
    strategy: S,
    portfolio: P,
    matcher: OrderMatcher,
    queue: EventQueue,
    bar_signals: Vec<Signal>,
    bar_fills: Vec<Fill>,
    summary: RunSummary,
    last_timestamp: Option<DateTime<Utc>>,
}

impl<D, S, P> Engine<D, S, P>
where
    D: DataSource,
    S: Strategy,
    P: Portfolio,
{
    pub fn new(config: EngineConfig, data_source: D, strategy: S, portfolio: P) -> Self {
        let matcher = OrderMatcher::new(config.execution.clone());
        Self {
            config,
            data_source,
            strategy,
            portfolio,
            matcher,
            queue: EventQueue::new(),
            bar_signals: Vec::new(),
            bar_fills: Vec::new(),
            summary: RunSummary::default(),
            last_timestamp: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn matcher(&self) -> &OrderMatcher {
        &self.matcher
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn portfolio(&self) -> &P {
        &self.portfolio
    }

    /// Tear the engine down, returning the collaborators.
    pub fn into_parts(self) -> (D, S, P) {
        (self.data_source, self.strategy, self.portfolio)
    }

    /// Run until the data source is exhausted.
    ///
    /// A data source error aborts the run before anything from the failed
    /// bar reaches a downstream component.
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        let span = tracing::info_span!("run");
        let _enter = span.enter();

        self.summary = RunSummary::default();
        self.strategy.start();

        while self.data_source.has_next() {
            let update = self.data_source.next().map_err(|source| {
                tracing::error!(bars = self.summary.bars_processed, error = %source, "data source failed");
                EngineError::DataSource {
                    bars_processed: self.summary.bars_processed,
                    source,
                }
            })?;
            self.process_update(&update);
        }

        self.summary.pending_at_end = self.matcher.pending_len();
        let summary = std::mem::take(&mut self.summary);
        tracing::info!(
            bars = summary.bars_processed,
            signals = summary.signals,
            orders = summary.orders_submitted,
            rejected = summary.orders_rejected,
            fills = summary.fills_executed,
            zero_fills = summary.zero_fills,
            commission = summary.total_commission,
            "run complete"
        );
        Ok(summary)
    }

    fn process_update(&mut self, update: &MarketUpdate) {
        let ts = update.timestamp;
        if let Some(prev) = self.last_timestamp {
            if ts < prev {
                tracing::warn!(%prev, current = %ts, "market update out of timestamp order");
            }
        }
        self.last_timestamp = Some(ts);
        tracing::debug!(%ts, bars = update.len(), pending = self.matcher.pending_len(), "bar");

        if self.config.record_events {
            self.summary.events.push(Event::Market(update.clone()));
        }

        // Step 2: execute orders from earlier bars.
        self.matcher.on_market_update(update, &mut self.queue);
        self.route();

        // Step 3: strategy.
        self.strategy.on_update(update, &mut self.queue);
        self.route();

        // Step 4: portfolio sees signals, then fills.
        let signals = std::mem::take(&mut self.bar_signals);
        self.portfolio.on_signals(&signals);
        let fills = std::mem::take(&mut self.bar_fills);
        self.portfolio.on_fills(&fills);

        // Step 5: new orders become pending for the next bar.
        for order in self.portfolio.send_orders() {
            self.queue.publish(Event::order(ts, order));
        }
        self.route();

        self.summary.bars_processed += 1;
    }

    /// Drain the queue, handing each event to its consumer.
    fn route(&mut self) {
        while let Some(event) = self.queue.pop() {
            if self.config.record_events {
                self.summary.events.push(event.clone());
            }

            match event {
                Event::Fill { fill, .. } => {
                    if fill.is_zero() {
                        self.summary.zero_fills += 1;
                    } else {
                        self.summary.fills_executed += 1;
                        self.summary.total_commission += fill.commission;
                        tracing::debug!(
                            ticker = %fill.ticker,
                            side = %fill.side,
                            qty = fill.quantity,
                            price = fill.price,
                            commission = fill.commission,
                            "fill"
                        );
                    }
                    self.bar_fills.push(fill);
                }
                Event::Signal { signal, .. } => {
                    self.summary.signals += 1;
                    self.bar_signals.push(signal);
                }
                Event::Order { order, .. } => match self.matcher.submit(order) {
                    Ok(()) => self.summary.orders_submitted += 1,
                    Err(err) => {
                        tracing::warn!(error = %err, "order rejected");
                        self.summary.orders_rejected += 1;
                    }
                },
                Event::Market(update) => {
                    tracing::warn!(ts = %update.timestamp, "dropping republished market update");
                }
            }
        }
    }
}
