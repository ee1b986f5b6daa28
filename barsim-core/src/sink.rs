//! The publish channel.
//!
//! Producers hand events back to the kernel through [`EventSink::publish`].
//! The sink is passed to each collaborator call by `&mut` borrow, so no
//! component holds a long-lived pointer to the kernel.

use crate::domain::{Fill, Order, Signal};
use crate::event::Event;
use std::collections::VecDeque;

/// Single-method capability for publishing events.
///
/// Publishing moves the event; the producer keeps nothing.
pub trait EventSink {
    fn publish(&mut self, event: Event);
}

/// FIFO processing path owned by the engine.
///
/// Events accumulate while a collaborator runs and are drained by the engine
/// as soon as that call returns.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventQueue {
    fn publish(&mut self, event: Event) {
        self.events.push_back(event);
    }
}

/// Test double that records every published event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn fills(&self) -> Vec<&Fill> {
        self.events.iter().filter_map(Event::as_fill).collect()
    }

    pub fn signals(&self) -> Vec<&Signal> {
        self.events.iter().filter_map(Event::as_signal).collect()
    }

    pub fn orders(&self) -> Vec<&Order> {
        self.events.iter().filter_map(Event::as_order).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for RecordingSink {
    fn publish(&mut self, event: Event) {
        self.events.push(event);
    }
}
