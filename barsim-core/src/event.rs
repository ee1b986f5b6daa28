//! Events carried through the publish channel.
//!
//! The set of kinds is closed, so routing is an exhaustive `match` over
//! [`Event`]. Every event carries the timestamp of the bar that produced it.

use crate::domain::{Fill, MarketUpdate, Order, Signal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of an [`Event`], for logging and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Market => "MARKET",
            EventKind::Signal => "SIGNAL",
            EventKind::Order => "ORDER",
            EventKind::Fill => "FILL",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Market(MarketUpdate),
    Signal {
        timestamp: DateTime<Utc>,
        signal: Signal,
    },
    Order {
        timestamp: DateTime<Utc>,
        order: Order,
    },
    Fill {
        timestamp: DateTime<Utc>,
        fill: Fill,
    },
}

impl Event {
    pub fn signal(timestamp: DateTime<Utc>, signal: Signal) -> Self {
        Event::Signal { timestamp, signal }
    }

    pub fn order(timestamp: DateTime<Utc>, order: Order) -> Self {
        Event::Order { timestamp, order }
    }

    pub fn fill(timestamp: DateTime<Utc>, fill: Fill) -> Self {
        Event::Fill { timestamp, fill }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market(_) => EventKind::Market,
            Event::Signal { .. } => EventKind::Signal,
            Event::Order { .. } => EventKind::Order,
            Event::Fill { .. } => EventKind::Fill,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Event::Market(update) => update.timestamp,
            Event::Signal { timestamp, .. }
            | Event::Order { timestamp, .. }
            | Event::Fill { timestamp, .. } => *timestamp,
        }
    }

    pub fn as_fill(&self) -> Option<&Fill> {
        match self {
            Event::Fill { fill, .. } => Some(fill),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<&Signal> {
        match self {
            Event::Signal { signal, .. } => Some(signal),
            _ => None,
        }
    }

    pub fn as_order(&self) -> Option<&Order> {
        match self {
            Event::Order { order, .. } => Some(order),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderSide;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn kind_matches_variant() {
        let update = MarketUpdate::new(ts());
        assert_eq!(Event::Market(update).kind(), EventKind::Market);
        assert_eq!(
            Event::signal(ts(), Signal::new("s", "AAPL", 1.0)).kind(),
            EventKind::Signal
        );
        assert_eq!(
            Event::order(ts(), Order::market("AAPL", OrderSide::Buy, 1.0)).kind(),
            EventKind::Order
        );
        assert_eq!(
            Event::fill(ts(), Fill::zero("AAPL", OrderSide::Buy)).kind(),
            EventKind::Fill
        );
    }

    #[test]
    fn timestamp_comes_from_payload_or_envelope() {
        let event = Event::fill(ts(), Fill::zero("AAPL", OrderSide::Buy));
        assert_eq!(event.timestamp(), ts());
        assert_eq!(Event::Market(MarketUpdate::new(ts())).timestamp(), ts());
    }

    #[test]
    fn accessors_only_match_their_kind() {
        let event = Event::signal(ts(), Signal::new("s", "AAPL", -1.0));
        assert!(event.as_signal().is_some());
        assert!(event.as_fill().is_none());
        assert!(event.as_order().is_none());
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::order(ts(), Order::limit("AAPL", OrderSide::Buy, 5.0, 148.0));
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
