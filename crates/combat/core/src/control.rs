//! Deferred control messages.
//!
//! Deaths are never processed inline with the damage that caused them. The
//! resolver enqueues a [`ControlMessage`] and the runtime drains the queue
//! after the current action completes.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::state::EntityId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMessage {
    /// Run the death handler for this creature.
    HandleDeath(EntityId),
}

/// Destination for deferred control messages.
pub trait ControlSink {
    fn enqueue(&self, message: ControlMessage);
}

/// Single-threaded in-memory queue.
#[derive(Debug, Default)]
pub struct ControlBuffer {
    queue: RefCell<VecDeque<ControlMessage>>,
}

impl ControlBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<ControlMessage> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn drain(&self) -> Vec<ControlMessage> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl ControlSink for ControlBuffer {
    fn enqueue(&self, message: ControlMessage) {
        self.queue.borrow_mut().push_back(message);
    }
}
