// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Windowed minimum and maximum
//!
//! Monotonic-deque extremum over the last `N` samples, O(1) amortized per
//! update. Every admitted sample is tagged with a sequence number; the deque
//! front is evicted only when the sample leaving the FIFO carries the same
//! tag, so duplicate values in the window cannot evict the wrong entry.

use std::collections::VecDeque;
use std::marker::PhantomData;

/// Ordering policy for a [`WindowedExtremum`]
pub trait Dominance {
    /// True if `incoming` makes `held` irrelevant as a future extremum
    fn dominates(incoming: f64, held: f64) -> bool;
}

/// Policy for a running maximum
#[derive(Debug, Clone, Copy, Default)]
pub struct Greatest;

impl Dominance for Greatest {
    #[inline]
    fn dominates(incoming: f64, held: f64) -> bool {
        held <= incoming
    }
}

/// Policy for a running minimum
#[derive(Debug, Clone, Copy, Default)]
pub struct Least;

impl Dominance for Least {
    #[inline]
    fn dominates(incoming: f64, held: f64) -> bool {
        held >= incoming
    }
}

/// Maximum over the last `N` samples
pub type WindowedMax = WindowedExtremum<Greatest>;

/// Minimum over the last `N` samples
pub type WindowedMin = WindowedExtremum<Least>;

#[derive(Debug, Clone, Copy)]
struct Entry {
    seq: u64,
    value: f64,
}

/// Sliding-window extremum selected by the `D` policy
#[derive(Debug, Clone)]
pub struct WindowedExtremum<D> {
    window: usize,
    /// Admitted samples in arrival order, at most `window` long
    fifo: VecDeque<Entry>,
    /// Candidate extrema; a subsequence of `fifo`, monotonic front to back
    deque: VecDeque<Entry>,
    next_seq: u64,
    _policy: PhantomData<D>,
}

impl<D: Dominance> WindowedExtremum<D> {
    /// Create an extremum over `window` samples (a zero window is treated as 1)
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            fifo: VecDeque::with_capacity(window),
            deque: VecDeque::new(),
            next_seq: 0,
            _policy: PhantomData,
        }
    }

    /// Admit a sample, evicting the oldest once the window is full
    pub fn add(&mut self, value: f64) {
        if self.fifo.len() == self.window {
            if let Some(evicted) = self.fifo.pop_front() {
                if self.deque.front().is_some_and(|front| front.seq == evicted.seq) {
                    self.deque.pop_front();
                }
            }
        }

        let entry = Entry {
            seq: self.next_seq,
            value,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        self.fifo.push_back(entry);

        while self
            .deque
            .back()
            .is_some_and(|tail| D::dominates(value, tail.value))
        {
            self.deque.pop_back();
        }
        self.deque.push_back(entry);
    }

    /// Current extremum, 0 if the window holds no sample
    pub fn value(&self) -> f64 {
        self.deque.front().map(|e| e.value).unwrap_or(0.0)
    }

    /// True once the window holds `N` samples
    pub fn ready(&self) -> bool {
        self.fifo.len() == self.window
    }

    /// Discard every sample
    pub fn reset(&mut self) {
        self.fifo.clear();
        self.deque.clear();
    }

    /// Window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of samples held
    pub fn len(&self) -> usize {
        self.fifo.len()
    }

    /// True if the window holds no sample
    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }
}
