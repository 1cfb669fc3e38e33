//! Connection slots
//!
//! Admission limit for the listener: a connection is only accepted once a
//! slot is free, and its slot returns to the pool when the handler ends.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Bounded pool of connection slots
#[derive(Debug, Clone)]
pub struct ConnectionSlots {
    inner: Arc<SlotsInner>,
}

#[derive(Debug)]
struct SlotsInner {
    in_use: Mutex<usize>,
    freed: Condvar,
    capacity: usize,
}

impl ConnectionSlots {
    /// Create a pool with `capacity` slots (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(SlotsInner {
                in_use: Mutex::new(0),
                freed: Condvar::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Block until a slot is free and take it
    pub fn acquire(&self) -> SlotPermit {
        let mut in_use = self.inner.in_use.lock();
        while *in_use >= self.inner.capacity {
            self.inner.freed.wait(&mut in_use);
        }
        *in_use += 1;

        SlotPermit {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Slots currently taken
    pub fn in_use(&self) -> usize {
        *self.inner.in_use.lock()
    }

    /// Total slots
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

/// A taken slot, released on drop
#[derive(Debug)]
pub struct SlotPermit {
    inner: Arc<SlotsInner>,
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        let mut in_use = self.inner.in_use.lock();
        *in_use -= 1;
        self.inner.freed.notify_one();
    }
}
