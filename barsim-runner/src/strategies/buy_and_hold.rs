use std::collections::HashSet;

use barsim_core::{Event, EventSink, MarketUpdate, Signal, Strategy};

pub const BUY_AND_HOLD_ID: &str = "buy_and_hold";

/// Signals one entry per ticker, on the first bar it appears, at that bar's close.
#[derive(Debug, Default)]
pub struct BuyAndHold {
    seen: HashSet<String>,
}

impl BuyAndHold {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHold {
    fn start(&mut self) {
        self.seen.clear();
    }

    fn on_update(&mut self, update: &MarketUpdate, sink: &mut dyn EventSink) {
        for bar in update.bars.values() {
            if bar.is_void() || !self.seen.insert(bar.ticker.clone()) {
                continue;
            }
            sink.publish(Event::signal(
                update.timestamp,
                Signal::new(BUY_AND_HOLD_ID, bar.ticker.clone(), bar.close),
            ));
        }
    }
}
