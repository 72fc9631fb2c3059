//! Offset-action matching for hop additions.
//!
//! A hop is due on the first tick where the countdown has reported a
//! remaining time and that time is at or below `offset_min * 60 + 1`.
//! Fired hops are tracked in a write-once bitmask: there is no way to clear a
//! bit short of building a new set.

use crate::config::{HopAction, MAX_HOPS};

/// Set of hop slots (1..=6) that have already fired in this run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FiredHops(u8);

impl FiredHops {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    fn bit(index: u8) -> u8 {
        debug_assert!((1..=MAX_HOPS as u8).contains(&index));
        1 << (index.saturating_sub(1) & 0x07)
    }

    #[inline]
    pub fn contains(&self, index: u8) -> bool {
        self.0 & Self::bit(index) != 0
    }

    /// Mark a slot fired. Returns false when it already was.
    #[inline]
    pub fn insert(&mut self, index: u8) -> bool {
        let was = self.contains(index);
        self.0 |= Self::bit(index);
        !was
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Fired slot numbers in ascending order.
    pub fn indices(&self) -> Vec<u8> {
        (1..=MAX_HOPS as u8).filter(|i| self.contains(*i)).collect()
    }
}

/// Whether `hop` is due at `remaining_s`, ignoring whether it already fired.
#[inline]
pub fn is_due(hop: &HopAction, remaining_s: Option<u64>) -> bool {
    matches!(remaining_s, Some(r) if r <= hop.due_at_s())
}

/// Hops due at `remaining_s` that have not fired yet, in slot order.
pub fn due_hops<'a>(
    hops: &'a [HopAction],
    fired: &'a FiredHops,
    remaining_s: Option<u64>,
) -> impl Iterator<Item = &'a HopAction> + 'a {
    hops.iter()
        .filter(move |h| !fired.contains(h.index) && is_due(h, remaining_s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn insert_is_write_once() {
        let mut f = FiredHops::new();
        assert!(f.insert(3));
        assert!(!f.insert(3));
        assert!(f.contains(3));
        assert!(!f.contains(2));
        assert_eq!(f.indices(), vec![3]);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn all_six_slots_fit() {
        let mut f = FiredHops::new();
        for i in 1..=6 {
            f.insert(i);
        }
        assert_eq!(f.len(), 6);
        assert_eq!(f.indices(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(1200), false)]
    #[case(Some(302), false)]
    #[case(Some(301), true)]
    #[case(Some(300), true)]
    #[case(Some(0), true)]
    fn five_minute_hop_due(#[case] remaining: Option<u64>, #[case] due: bool) {
        assert_eq!(is_due(&HopAction::new(1, 5), remaining), due);
    }

    #[test]
    fn due_hops_skips_fired_and_keeps_order() {
        let hops = vec![
            HopAction::new(1, 10),
            HopAction::new(2, 5),
            HopAction::new(3, 60),
        ];
        let mut fired = FiredHops::new();
        fired.insert(3);
        let due: Vec<u8> = due_hops(&hops, &fired, Some(290)).map(|h| h.index).collect();
        assert_eq!(due, vec![1, 2]);
    }
}
