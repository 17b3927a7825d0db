//! Unit tests for qn-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::Time;
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    #[test]
    fn total_order_for_heap() {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(Time(3.5)));
        heap.push(Reverse(Time(1.0)));
        heap.push(Reverse(Time(2.25)));
        assert_eq!(heap.pop().unwrap().0, Time(1.0));
        assert_eq!(heap.pop().unwrap().0, Time(2.25));
        assert_eq!(heap.pop().unwrap().0, Time(3.5));
    }

    #[test]
    fn infinity_sorts_last() {
        assert!(Time::INFINITY > Time(1_000_000.0));
        assert!(Time::ZERO < Time::INFINITY);
    }

    #[test]
    fn equality_uses_total_cmp() {
        assert_eq!(Time(1.5), Time(1.5));
        assert_ne!(Time(1.5), Time(1.50001));
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn gen_index_in_bounds() {
        let mut rng = SimRng::new(7);
        for _ in 0..1000 {
            let v = rng.gen_index(5);
            assert!(v < 5);
        }
    }

    #[test]
    fn derive_differs_from_root() {
        let mut root = SimRng::new(1);
        let mut child = SimRng::derive(1, 1);
        let a: u64 = root.random();
        let b: u64 = child.random();
        assert_ne!(a, b);
    }
}
