//! Keeps the global station order sorted by descending event time.
//!
//! The scheduler holds every active station's id in one `Vec<StationId>`,
//! sorted so the *earliest* next event sits at the **tail** — popping the
//! next station to process is then an O(1) `Vec::pop`, and re-inserting it
//! afterward (its event time having just changed) is the only per-step cost
//! that matters.
//!
//! In steady state a station's new event time is usually only a short hop
//! from where it was — most stations' delay distributions don't jump it
//! across the whole order in one step — so [`one_sort`] and [`two_sort`]
//! walk the element to its new spot by local swaps, which is cheaper than a
//! binary search when the hop is short. [`bisect_insert`] and
//! [`one_bisect_sort`] fall back to binary search for the cases where the
//! hop can be arbitrarily large: a brand-new station entering the order for
//! the first time, or a station whose time just moved from one extreme to
//! the other (e.g. reactivation after `Time::INFINITY`).

use qn_core::{StationId, Time};

/// Inserts a station id that is not currently present in `order`, keeping
/// descending order. Used when a station transitions from having no
/// pending event (and so wasn't in `order` at all) to having one — most
/// commonly, activation.
pub fn bisect_insert(order: &mut Vec<StationId>, id: StationId, time_of: impl Fn(StationId) -> Time) {
    let time = time_of(id);
    let pos = order.partition_point(|&s| time_of(s) > time);
    order.insert(pos, id);
}

/// Removes `id` from `order` (if present) and bisect-inserts it back at its
/// current time. Correct for any size of jump, at `O(n)` (the removal
/// shift) rather than `one_sort`'s `O(distance moved)`.
pub fn one_bisect_sort(order: &mut Vec<StationId>, id: StationId, time_of: impl Fn(StationId) -> Time) {
    if let Some(pos) = order.iter().position(|&s| s == id) {
        order.remove(pos);
    }
    bisect_insert(order, id, time_of);
}

/// Walks the element at `pos` to its correct descending-order position by
/// swapping with a neighbor one step at a time, and returns its new index.
/// Cheap when the station's event time only moved a short distance in the
/// order, which is the common case once the simulation has warmed up.
pub fn one_sort(order: &mut [StationId], mut pos: usize, time_of: impl Fn(StationId) -> Time) -> usize {
    let n = order.len();
    while pos + 1 < n && time_of(order[pos]) < time_of(order[pos + 1]) {
        order.swap(pos, pos + 1);
        pos += 1;
    }
    while pos > 0 && time_of(order[pos]) > time_of(order[pos - 1]) {
        order.swap(pos, pos - 1);
        pos -= 1;
    }
    pos
}

/// Repositions two stations by id, via [`one_sort`], in one pass. The
/// common case is a zero-lag departure→arrival transfer: the source
/// station's next event time and the destination station's next event time
/// both change in the same scheduler step.
pub fn two_sort(order: &mut [StationId], a: StationId, b: StationId, time_of: impl Fn(StationId) -> Time) {
    if let Some(pos) = order.iter().position(|&s| s == a) {
        one_sort(order, pos, &time_of);
    }
    if let Some(pos) = order.iter().position(|&s| s == b) {
        one_sort(order, pos, &time_of);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn times(pairs: &[(u32, f64)]) -> HashMap<StationId, Time> {
        pairs.iter().map(|&(id, t)| (StationId(id), Time(t))).collect()
    }

    #[test]
    fn bisect_insert_keeps_descending_order() {
        let mut order = vec![StationId(0), StationId(1), StationId(2)];
        let t = times(&[(0, 9.0), (1, 5.0), (2, 1.0), (3, 4.0)]);
        bisect_insert(&mut order, StationId(3), |s| t[&s]);
        assert_eq!(order, vec![StationId(0), StationId(1), StationId(3), StationId(2)]);
    }

    #[test]
    fn one_sort_moves_element_toward_head_when_time_increases() {
        let mut order = vec![StationId(0), StationId(1), StationId(2)];
        // StationId(2) (tail, smallest time) now has the largest time.
        let t = times(&[(0, 5.0), (1, 3.0), (2, 9.0)]);
        let pos = one_sort(&mut order, 2, |s| t[&s]);
        assert_eq!(pos, 0);
        assert_eq!(order, vec![StationId(2), StationId(0), StationId(1)]);
    }

    #[test]
    fn one_sort_moves_element_toward_tail_when_time_decreases() {
        let mut order = vec![StationId(0), StationId(1), StationId(2)];
        let t = times(&[(0, 0.5), (1, 3.0), (2, 1.0)]);
        let pos = one_sort(&mut order, 0, |s| t[&s]);
        assert_eq!(pos, 2);
        assert_eq!(order, vec![StationId(1), StationId(2), StationId(0)]);
    }

    #[test]
    fn one_bisect_sort_handles_a_station_not_yet_present() {
        let mut order = vec![StationId(0), StationId(1)];
        let t = times(&[(0, 5.0), (1, 2.0), (2, 3.5)]);
        one_bisect_sort(&mut order, StationId(2), |s| t[&s]);
        assert_eq!(order, vec![StationId(0), StationId(2), StationId(1)]);
    }

    #[test]
    fn two_sort_repositions_both_stations() {
        let mut order = vec![StationId(0), StationId(1), StationId(2), StationId(3)];
        let t = times(&[(0, 1.0), (1, 8.0), (2, 2.0), (3, 7.0)]);
        two_sort(&mut order, StationId(0), StationId(2), |s| t[&s]);
        // Descending by time: 1(8), 3(7), 2(2), 0(1)
        assert_eq!(order, vec![StationId(1), StationId(3), StationId(2), StationId(0)]);
    }
}
