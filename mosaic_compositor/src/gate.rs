// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded counting rendezvous between a producer and the composition loop.
//!
//! A [`FrameGate`] counts frames a producer has queued but the composition
//! loop has not yet consumed. The producer side calls [`FrameGate::signal`]
//! from its callback thread; the composition thread calls
//! [`FrameGate::wait`]. The count never leaves `0..=capacity`: a producer
//! that runs ahead blocks in `signal` until the loop catches up, and the loop
//! blocks in `wait` until a frame is available.
//!
//! Blocked callers re-check the count at least once per poll interval, so a
//! lost wake-up costs one poll period rather than a hang. [`FrameGate::release`]
//! unblocks both sides permanently.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::error::{GateError, GateReleased};

/// Default number of frames a gate may hold.
pub const DEFAULT_GATE_CAPACITY: u32 = 10;

/// Default re-poll period for blocked callers.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct GateState {
    pending: u32,
    released: bool,
}

/// Bounded, releasable frame counter shared by one producer and one consumer.
#[derive(Debug)]
pub struct FrameGate {
    state: Mutex<GateState>,
    changed: Condvar,
    capacity: u32,
    poll_interval: Duration,
}

impl FrameGate {
    /// Creates a gate holding at most `capacity` frames.
    ///
    /// A capacity of zero is promoted to one.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self::with_poll_interval(capacity, DEFAULT_POLL_INTERVAL)
    }

    /// Creates a gate with an explicit re-poll period.
    #[must_use]
    pub fn with_poll_interval(capacity: u32, poll_interval: Duration) -> Self {
        Self {
            state: Mutex::new(GateState {
                pending: 0,
                released: false,
            }),
            changed: Condvar::new(),
            capacity: capacity.max(1),
            poll_interval,
        }
    }

    /// Records one newly queued frame, blocking while the gate is full.
    ///
    /// Returns the pending count after the increment.
    pub fn signal(&self) -> Result<u32, GateReleased> {
        let mut state = self.state.lock();
        loop {
            if state.released {
                return Err(GateReleased);
            }
            if state.pending < self.capacity {
                break;
            }
            self.changed.wait_for(&mut state, self.poll_interval);
        }
        state.pending += 1;
        let pending = state.pending;
        drop(state);
        self.changed.notify_all();
        Ok(pending)
    }

    /// Consumes one frame, blocking while none is pending.
    ///
    /// Returns the pending count after the decrement, so `Ok(0)` means the
    /// caller has caught up with the producer.
    pub fn wait(&self) -> Result<u32, GateReleased> {
        let mut state = self.state.lock();
        loop {
            if state.released {
                return Err(GateReleased);
            }
            if state.pending > 0 {
                break;
            }
            self.changed.wait_for(&mut state, self.poll_interval);
        }
        state.pending -= 1;
        let pending = state.pending;
        drop(state);
        self.changed.notify_all();
        Ok(pending)
    }

    /// Non-blocking [`signal`](Self::signal).
    pub fn try_signal(&self) -> Result<u32, GateError> {
        let mut state = self.state.lock();
        if state.released {
            return Err(GateError::Released);
        }
        if state.pending >= self.capacity {
            return Err(GateError::Full);
        }
        state.pending += 1;
        let pending = state.pending;
        drop(state);
        self.changed.notify_all();
        Ok(pending)
    }

    /// Non-blocking [`wait`](Self::wait).
    pub fn try_wait(&self) -> Result<u32, GateError> {
        let mut state = self.state.lock();
        if state.released {
            return Err(GateError::Released);
        }
        if state.pending == 0 {
            return Err(GateError::Empty);
        }
        state.pending -= 1;
        let pending = state.pending;
        drop(state);
        self.changed.notify_all();
        Ok(pending)
    }

    /// Closes the gate and wakes every blocked caller.
    ///
    /// Idempotent. Every later blocking call returns [`GateReleased`].
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.released = true;
        drop(state);
        self.changed.notify_all();
    }

    /// Frames queued but not yet consumed.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.state.lock().pending
    }

    /// Maximum number of pending frames.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Re-poll period for blocked callers.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether [`release`](Self::release) has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn waits_return_post_decrement_counts() {
        let gate = FrameGate::default();
        for expected in 1..=5 {
            assert_eq!(gate.signal(), Ok(expected));
        }
        let counts: Vec<u32> = (0..5).map(|_| gate.wait().unwrap()).collect();
        assert_eq!(counts, [4, 3, 2, 1, 0]);
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn full_gate_drains_in_order() {
        let gate = FrameGate::default();
        for expected in 1..=DEFAULT_GATE_CAPACITY {
            assert_eq!(gate.signal(), Ok(expected));
        }
        assert_eq!(gate.try_signal(), Err(GateError::Full));

        let counts: Vec<u32> = (0..DEFAULT_GATE_CAPACITY)
            .map(|_| gate.wait().unwrap())
            .collect();
        let expected: Vec<u32> = (0..DEFAULT_GATE_CAPACITY).rev().collect();
        assert_eq!(counts, expected);
        assert_eq!(gate.try_wait(), Err(GateError::Empty));
    }

    #[test]
    fn zero_capacity_is_promoted_to_one() {
        let gate = FrameGate::new(0);
        assert_eq!(gate.capacity(), 1);
        assert_eq!(gate.try_signal(), Ok(1));
        assert_eq!(gate.try_signal(), Err(GateError::Full));
    }

    #[test]
    fn try_variants_respect_bounds() {
        let gate = FrameGate::new(2);
        assert_eq!(gate.try_wait(), Err(GateError::Empty));
        assert_eq!(gate.try_signal(), Ok(1));
        assert_eq!(gate.try_signal(), Ok(2));
        assert_eq!(gate.try_signal(), Err(GateError::Full));
        assert_eq!(gate.pending(), 2);
        assert_eq!(gate.try_wait(), Ok(1));
        assert_eq!(gate.try_wait(), Ok(0));
        assert_eq!(gate.try_wait(), Err(GateError::Empty));
    }

    #[test]
    fn signal_past_capacity_blocks_until_wait() {
        let gate = Arc::new(FrameGate::with_poll_interval(10, Duration::from_millis(1)));
        for _ in 0..10 {
            gate.signal().unwrap();
        }

        let done = Arc::new(AtomicBool::new(false));
        let producer = {
            let gate = Arc::clone(&gate);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let result = gate.signal();
                done.store(true, Ordering::SeqCst);
                result
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst), "11th signal must block");
        assert_eq!(gate.pending(), 10);

        assert_eq!(gate.wait(), Ok(9));
        assert_eq!(producer.join().unwrap(), Ok(10));
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(gate.pending(), 10);
    }

    #[test]
    fn wait_blocks_until_signal() {
        let gate = Arc::new(FrameGate::default());
        let consumer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait())
        };
        thread::sleep(Duration::from_millis(20));
        gate.signal().unwrap();
        assert_eq!(consumer.join().unwrap(), Ok(0));
    }

    #[test]
    fn release_unblocks_waiter() {
        let gate = Arc::new(FrameGate::default());
        let consumer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.wait())
        };
        thread::sleep(Duration::from_millis(20));
        gate.release();
        assert_eq!(consumer.join().unwrap(), Err(GateReleased));
        assert!(gate.is_released());
    }

    #[test]
    fn release_unblocks_full_producer() {
        let gate = Arc::new(FrameGate::new(1));
        gate.signal().unwrap();
        let producer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.signal())
        };
        thread::sleep(Duration::from_millis(20));
        gate.release();
        assert_eq!(producer.join().unwrap(), Err(GateReleased));
    }

    #[test]
    fn release_is_idempotent_and_sticky() {
        let gate = FrameGate::new(4);
        gate.signal().unwrap();
        gate.release();
        gate.release();
        assert_eq!(gate.signal(), Err(GateReleased));
        assert_eq!(gate.wait(), Err(GateReleased));
        assert_eq!(gate.try_wait(), Err(GateError::Released));
        assert_eq!(gate.try_signal(), Err(GateError::Released));
    }

    #[test]
    fn count_stays_in_bounds_under_contention() {
        const FRAMES: u32 = 2_000;
        let gate = Arc::new(FrameGate::with_poll_interval(3, Duration::from_millis(1)));

        let producer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                for _ in 0..FRAMES {
                    let n = gate.signal().unwrap();
                    assert!((1..=3).contains(&n));
                }
            })
        };

        for _ in 0..FRAMES {
            let n = gate.wait().unwrap();
            assert!(n < 3);
        }
        producer.join().unwrap();
        assert_eq!(gate.pending(), 0);
    }
}
