//! Integration tests for the engine dispatch loop.
//!
//! Tests:
//! 1. End-to-end: a market order submitted before a bar fills at that bar's open
//! 2. No-lookahead: orders created on bar N are first matched against bar N+1
//! 3. Dispatch order: matcher → strategy → portfolio signals → fills → orders
//! 4. Failure policy: a data source error aborts with no partial bar delivered
//! 5. Routing: rejected orders, sink-published orders, republished market updates

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use barsim_core::{
    Bar, DataError, DataSource, Engine, EngineConfig, EngineError, Event, EventKind, EventSink,
    ExecutionConfig, Fill, MarketUpdate, Order, OrderSide, Portfolio, Signal, Strategy,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

// ─── Helpers ──────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<String>>>;

fn day(i: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + Duration::days(i)
}

fn update(i: i64, ticker: &str, open: f64, high: f64, low: f64, close: f64) -> MarketUpdate {
    let ts = day(i);
    MarketUpdate::from_bars(
        ts,
        vec![Bar {
            ticker: ticker.into(),
            timestamp: ts,
            open,
            high,
            low,
            close,
            volume: 1_000.0,
        }],
    )
}

struct ScriptedSource {
    items: VecDeque<Result<MarketUpdate, DataError>>,
}

impl ScriptedSource {
    fn ok(updates: Vec<MarketUpdate>) -> Self {
        Self {
            items: updates.into_iter().map(Ok).collect(),
        }
    }
}

impl DataSource for ScriptedSource {
    fn has_next(&self) -> bool {
        !self.items.is_empty()
    }

    fn next(&mut self) -> Result<MarketUpdate, DataError> {
        self.items
            .pop_front()
            .unwrap_or_else(|| Err(DataError::Unavailable("exhausted".into())))
    }
}

#[derive(Default)]
struct ScriptedStrategy {
    starts: usize,
    bars_seen: usize,
    /// Signals to publish, keyed by bar number.
    signals: HashMap<usize, Vec<Signal>>,
    /// Orders to publish straight into the sink, keyed by bar number.
    orders: HashMap<usize, Vec<Order>>,
    republish_market: bool,
    log: Option<Log>,
}

impl Strategy for ScriptedStrategy {
    fn start(&mut self) {
        self.starts += 1;
    }

    fn on_update(&mut self, update: &MarketUpdate, sink: &mut dyn EventSink) {
        if let Some(log) = &self.log {
            log.borrow_mut().push("strategy".into());
        }
        for signal in self.signals.remove(&self.bars_seen).unwrap_or_default() {
            sink.publish(Event::signal(update.timestamp, signal));
        }
        for order in self.orders.remove(&self.bars_seen).unwrap_or_default() {
            sink.publish(Event::order(update.timestamp, order));
        }
        if self.republish_market {
            sink.publish(Event::Market(update.clone()));
        }
        self.bars_seen += 1;
    }
}

#[derive(Default)]
struct ScriptedPortfolio {
    /// Orders to send, keyed by bar number.
    orders: HashMap<usize, Vec<Order>>,
    bar: usize,
    fills_by_bar: Vec<Vec<Fill>>,
    signals_by_bar: Vec<Vec<Signal>>,
    log: Option<Log>,
}

impl Portfolio for ScriptedPortfolio {
    fn on_signals(&mut self, signals: &[Signal]) {
        if let Some(log) = &self.log {
            log.borrow_mut().push("signals".into());
        }
        self.signals_by_bar.push(signals.to_vec());
    }

    fn on_fills(&mut self, fills: &[Fill]) {
        if let Some(log) = &self.log {
            log.borrow_mut().push("fills".into());
        }
        self.fills_by_bar.push(fills.to_vec());
    }

    fn send_orders(&mut self) -> Vec<Order> {
        if let Some(log) = &self.log {
            log.borrow_mut().push("send_orders".into());
        }
        let orders = self.orders.remove(&self.bar).unwrap_or_default();
        self.bar += 1;
        orders
    }
}

fn portfolio_with(orders: Vec<(usize, Order)>) -> ScriptedPortfolio {
    let mut portfolio = ScriptedPortfolio::default();
    for (bar, order) in orders {
        portfolio.orders.entry(bar).or_default().push(order);
    }
    portfolio
}

fn engine(
    updates: Vec<MarketUpdate>,
    strategy: ScriptedStrategy,
    portfolio: ScriptedPortfolio,
) -> Engine<ScriptedSource, ScriptedStrategy, ScriptedPortfolio> {
    let config = EngineConfig::new(ExecutionConfig::new(0.0005, 0.35)).recording();
    Engine::new(config, ScriptedSource::ok(updates), strategy, portfolio)
}

// ─── End-to-end ───────────────────────────────────────────────────────

#[test]
fn market_buy_fills_at_next_open_with_commission() {
    let updates = vec![
        update(0, "AAPL", 149.0, 151.0, 147.0, 150.0),
        update(1, "AAPL", 150.0, 155.0, 148.0, 152.0),
    ];
    let portfolio = portfolio_with(vec![(0, Order::market("AAPL", OrderSide::Buy, 100.0))]);
    let mut engine = engine(updates, ScriptedStrategy::default(), portfolio);

    let summary = engine.run().unwrap();

    let fills = &engine.portfolio().fills_by_bar;
    assert_eq!(fills.len(), 2);
    assert!(fills[0].is_empty());
    assert_eq!(fills[1].len(), 1);
    let fill = &fills[1][0];
    assert_eq!(fill.ticker, "AAPL");
    assert_eq!(fill.quantity, 100.0);
    assert_eq!(fill.price, 150.0);
    assert!((fill.commission - 35.0).abs() < 1e-12);

    assert_eq!(summary.bars_processed, 2);
    assert_eq!(summary.orders_submitted, 1);
    assert_eq!(summary.fills_executed, 1);
    assert_eq!(summary.zero_fills, 0);
    assert!((summary.total_commission - 35.0).abs() < 1e-12);
    assert_eq!(summary.pending_at_end, 0);
}

// ─── No-lookahead ─────────────────────────────────────────────────────

#[test]
fn order_created_on_bar_n_is_not_matched_against_bar_n() {
    // The limit at 95 would fill against bar 0 (low 90) but not bar 1 (low 100).
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 90.0, 100.0),
        update(1, "SPY", 105.0, 110.0, 100.0, 108.0),
    ];
    let portfolio = portfolio_with(vec![(0, Order::limit("SPY", OrderSide::Buy, 10.0, 95.0))]);
    let mut engine = engine(updates, ScriptedStrategy::default(), portfolio);

    let summary = engine.run().unwrap();

    let fills = &engine.portfolio().fills_by_bar;
    assert!(fills[0].is_empty(), "no fill may appear on the submission bar");
    assert_eq!(fills[1].len(), 1);
    assert!(fills[1][0].is_zero());
    assert_eq!(summary.zero_fills, 1);
    assert_eq!(summary.fills_executed, 0);
}

#[test]
fn market_order_uses_following_bar_open() {
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
        update(1, "SPY", 110.0, 111.0, 109.0, 110.0),
        update(2, "SPY", 120.0, 121.0, 119.0, 120.0),
    ];
    let portfolio = portfolio_with(vec![
        (0, Order::market("SPY", OrderSide::Buy, 1.0)),
        (1, Order::market("SPY", OrderSide::Sell, 1.0)),
    ]);
    let mut engine = engine(updates, ScriptedStrategy::default(), portfolio);
    engine.run().unwrap();

    let fills = &engine.portfolio().fills_by_bar;
    assert_eq!(fills[1][0].price, 110.0);
    assert_eq!(fills[1][0].side, OrderSide::Buy);
    assert_eq!(fills[2][0].price, 120.0);
    assert_eq!(fills[2][0].side, OrderSide::Sell);
}

#[test]
fn orders_published_by_strategy_wait_for_next_bar() {
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
        update(1, "SPY", 110.0, 111.0, 109.0, 110.0),
    ];
    let mut strategy = ScriptedStrategy::default();
    strategy
        .orders
        .insert(0, vec![Order::market("SPY", OrderSide::Buy, 5.0)]);
    let mut engine = engine(updates, strategy, ScriptedPortfolio::default());
    let summary = engine.run().unwrap();

    let fills = &engine.portfolio().fills_by_bar;
    assert!(fills[0].is_empty());
    assert_eq!(fills[1][0].price, 110.0);
    assert_eq!(summary.orders_submitted, 1);
}

// ─── Dispatch order ───────────────────────────────────────────────────

#[test]
fn start_hook_runs_exactly_once() {
    let updates = (0..5)
        .map(|i| update(i, "SPY", 100.0, 101.0, 99.0, 100.0))
        .collect();
    let mut engine = engine(updates, ScriptedStrategy::default(), ScriptedPortfolio::default());
    engine.run().unwrap();
    assert_eq!(engine.strategy().starts, 1);
    assert_eq!(engine.strategy().bars_seen, 5);
}

#[test]
fn collaborators_are_called_in_fixed_order_each_bar() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let strategy = ScriptedStrategy {
        log: Some(log.clone()),
        ..Default::default()
    };
    let portfolio = ScriptedPortfolio {
        log: Some(log.clone()),
        ..Default::default()
    };
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
        update(1, "SPY", 100.0, 101.0, 99.0, 100.0),
    ];
    let mut engine = engine(updates, strategy, portfolio);
    engine.run().unwrap();

    let expected: Vec<String> = ["strategy", "signals", "fills", "send_orders"]
        .iter()
        .cycle()
        .take(8)
        .map(|s| s.to_string())
        .collect();
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn journal_shows_fills_before_signals_before_orders() {
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
        update(1, "SPY", 100.0, 101.0, 99.0, 100.0),
    ];
    let mut strategy = ScriptedStrategy::default();
    strategy.signals.insert(1, vec![Signal::new("s", "SPY", 1.0)]);
    let portfolio = portfolio_with(vec![
        (0, Order::market("SPY", OrderSide::Buy, 1.0)),
        (1, Order::market("SPY", OrderSide::Sell, 1.0)),
    ]);
    let mut engine = engine(updates, strategy, portfolio);
    let summary = engine.run().unwrap();

    let kinds: Vec<EventKind> = summary.events.iter().map(Event::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Market,
            EventKind::Order,
            EventKind::Market,
            EventKind::Fill,
            EventKind::Signal,
            EventKind::Order,
        ]
    );
    assert_eq!(summary.pending_at_end, 1);
}

#[test]
fn signals_and_fills_are_delivered_on_the_bar_they_occur() {
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
        update(1, "SPY", 100.0, 101.0, 99.0, 100.0),
    ];
    let mut strategy = ScriptedStrategy::default();
    strategy.signals.insert(0, vec![Signal::new("s", "SPY", 2.5)]);
    let mut engine = engine(updates, strategy, ScriptedPortfolio::default());
    let summary = engine.run().unwrap();

    let signals = &engine.portfolio().signals_by_bar;
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0], vec![Signal::new("s", "SPY", 2.5)]);
    assert!(signals[1].is_empty());
    assert_eq!(summary.signals, 1);
}

// ─── Failure policy ───────────────────────────────────────────────────

#[test]
fn data_source_error_aborts_without_delivering_the_bar() {
    let source = ScriptedSource {
        items: VecDeque::from(vec![
            Ok(update(0, "SPY", 100.0, 101.0, 99.0, 100.0)),
            Err(DataError::Parse {
                line: 3,
                reason: "bad price".into(),
            }),
            Ok(update(2, "SPY", 100.0, 101.0, 99.0, 100.0)),
        ]),
    };
    let config = EngineConfig::default();
    let mut engine = Engine::new(
        config,
        source,
        ScriptedStrategy::default(),
        ScriptedPortfolio::default(),
    );

    let err = engine.run().unwrap_err();
    match err {
        EngineError::DataSource {
            bars_processed,
            source,
        } => {
            assert_eq!(bars_processed, 1);
            assert!(matches!(source, DataError::Parse { line: 3, .. }));
        }
    }
    assert_eq!(engine.strategy().bars_seen, 1);
    assert_eq!(engine.portfolio().fills_by_bar.len(), 1);
}

#[test]
fn empty_source_runs_zero_bars_but_still_starts() {
    let mut engine = engine(Vec::new(), ScriptedStrategy::default(), ScriptedPortfolio::default());
    let summary = engine.run().unwrap();
    assert_eq!(summary.bars_processed, 0);
    assert_eq!(engine.strategy().starts, 1);
}

// ─── Routing ──────────────────────────────────────────────────────────

#[test]
fn invalid_orders_are_rejected_and_never_matched() {
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
        update(1, "SPY", 100.0, 101.0, 99.0, 100.0),
    ];
    let portfolio = portfolio_with(vec![
        (0, Order::market("SPY", OrderSide::Buy, 0.0)),
        (0, Order::market("SPY", OrderSide::Buy, -3.0)),
    ]);
    let mut engine = engine(updates, ScriptedStrategy::default(), portfolio);
    let summary = engine.run().unwrap();

    assert_eq!(summary.orders_rejected, 2);
    assert_eq!(summary.orders_submitted, 0);
    assert_eq!(summary.total_fills(), 0);
}

#[test]
fn republished_market_update_is_dropped() {
    let updates = vec![
        update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
        update(1, "SPY", 100.0, 101.0, 99.0, 100.0),
    ];
    let strategy = ScriptedStrategy {
        republish_market: true,
        ..Default::default()
    };
    let mut engine = engine(updates, strategy, ScriptedPortfolio::default());
    let summary = engine.run().unwrap();
    assert_eq!(summary.bars_processed, 2);
    assert_eq!(engine.strategy().bars_seen, 2);
}

#[test]
fn identical_inputs_produce_identical_runs() {
    let make = || {
        let updates = vec![
            update(0, "SPY", 100.0, 101.0, 99.0, 100.0),
            update(1, "SPY", 102.0, 104.0, 94.0, 103.0),
            update(2, "SPY", 103.0, 106.0, 101.0, 105.0),
        ];
        let portfolio = portfolio_with(vec![
            (0, Order::limit("SPY", OrderSide::Buy, 10.0, 95.0)),
            (0, Order::market("SPY", OrderSide::Buy, 3.0)),
            (1, Order::limit("SPY", OrderSide::Sell, 13.0, 105.0)),
        ]);
        engine(updates, ScriptedStrategy::default(), portfolio)
    };

    let first = make().run().unwrap();
    let second = make().run().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.fills_executed, 3);
}

#[test]
fn journal_is_empty_unless_recording() {
    let updates = vec![update(0, "SPY", 100.0, 101.0, 99.0, 100.0)];
    let mut engine = Engine::new(
        EngineConfig::default(),
        ScriptedSource::ok(updates),
        ScriptedStrategy::default(),
        ScriptedPortfolio::default(),
    );
    let summary = engine.run().unwrap();
    assert!(summary.events.is_empty());
}
