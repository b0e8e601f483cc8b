// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Producer buffer queue.

use std::collections::VecDeque;

/// Bounded FIFO of queued producer buffers.
///
/// A producer that outruns the consumer by more than `capacity` buffers
/// loses its oldest buffer, the way a buffer queue recycles its oldest slot.
#[derive(Debug)]
pub(crate) struct BufferQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    dropped: u64,
}

impl<T> BufferQueue<T> {
    pub(crate) const DEFAULT_CAPACITY: usize = 16;

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Queues `item`, returning `true` if the oldest buffer was recycled.
    pub(crate) fn push(&mut self, item: T) -> bool {
        let overflow = self.items.len() == self.capacity;
        if overflow {
            let _ = self.items.pop_front();
            self.dropped += 1;
        }
        self.items.push_back(item);
        overflow
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped
    }
}
