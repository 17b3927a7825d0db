//! A time-ordered pool of pending events.
//!
//! Stations keep two of these — one for pending arrivals, one for pending
//! departures — and repeatedly ask "what's the earliest thing in here?".
//! That's a priority queue, so this wraps a binary heap instead of the
//! sorted-`Vec`/`BTreeMap` shape used for discrete tick scheduling: ties on
//! [`Time`] are broken by insertion order so FIFO agents created at the same
//! instant stay in arrival order.
//!
//! An empty pool reports [`Time::INFINITY`] as its head time rather than
//! using a literal sentinel value, so callers can always compare two pools'
//! head times without special-casing "nothing scheduled".

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use qn_core::Time;

#[derive(Clone)]
struct Entry<T> {
    time: Time,
    seq: u64,
    value: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest time first.
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A min-priority queue over `(Time, T)`, FIFO among equal times.
#[derive(Clone)]
pub struct TimeOrderedPool<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for TimeOrderedPool<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimeOrderedPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: Time, value: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { time, seq, value });
    }

    /// Removes and returns the earliest-scheduled entry, if any.
    pub fn pop(&mut self) -> Option<(Time, T)> {
        self.heap.pop().map(|e| (e.time, e.value))
    }

    pub fn peek(&self) -> Option<(Time, &T)> {
        self.heap.peek().map(|e| (e.time, &e.value))
    }

    /// The time of the earliest pending entry, or [`Time::INFINITY`] if the
    /// pool is empty. This is what lets a station compare "next arrival" and
    /// "next departure" unconditionally.
    pub fn head_time(&self) -> Time {
        self.heap.peek().map(|e| e.time).unwrap_or(Time::INFINITY)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_earliest_first() {
        let mut pool = TimeOrderedPool::new();
        pool.push(Time(5.0), "late");
        pool.push(Time(1.0), "early");
        pool.push(Time(3.0), "mid");
        assert_eq!(pool.pop(), Some((Time(1.0), "early")));
        assert_eq!(pool.pop(), Some((Time(3.0), "mid")));
        assert_eq!(pool.pop(), Some((Time(5.0), "late")));
        assert_eq!(pool.pop(), None);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut pool = TimeOrderedPool::new();
        pool.push(Time(2.0), "first");
        pool.push(Time(2.0), "second");
        assert_eq!(pool.pop(), Some((Time(2.0), "first")));
        assert_eq!(pool.pop(), Some((Time(2.0), "second")));
    }

    #[test]
    fn empty_pool_head_time_is_infinity() {
        let pool: TimeOrderedPool<()> = TimeOrderedPool::new();
        assert_eq!(pool.head_time(), Time::INFINITY);
        assert!(pool.head_time().is_infinite());
    }

    #[test]
    fn head_time_tracks_without_popping() {
        let mut pool = TimeOrderedPool::new();
        pool.push(Time(4.0), 1);
        assert_eq!(pool.head_time(), Time(4.0));
        pool.push(Time(2.0), 2);
        assert_eq!(pool.head_time(), Time(2.0));
        pool.pop();
        assert_eq!(pool.head_time(), Time(4.0));
    }
}
