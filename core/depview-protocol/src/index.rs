//! Exact keys for the dependency view.
//!
//! Tokens sit at whole numbers `1..=N` (with `0` as the synthetic root) and
//! markup tags sit strictly between two neighbouring tokens. The fractional
//! part is an exact reduced fraction, so keys never drift the way float
//! keys do once the denominators grow.

use core::cmp::Ordering;
use core::fmt;

/// A position in the indexed dependency view.
///
/// The value is `anchor + numerator / denominator` with
/// `0 <= numerator < denominator`, always stored in lowest terms so that
/// derived equality and hashing agree with the numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex {
    anchor: u32,
    numerator: u32,
    denominator: u32,
}

impl NodeIndex {
    /// The synthetic root every governor-less token hangs from.
    pub const ROOT: NodeIndex = NodeIndex::token(0);

    /// Key of the token at `position` (1-based, `0` is the root).
    pub const fn token(position: u32) -> Self {
        Self {
            anchor: position,
            numerator: 0,
            denominator: 1,
        }
    }

    /// Key strictly between `anchor` and `anchor + 1`.
    ///
    /// Returns `None` unless `0 < numerator < denominator`.
    pub fn between(anchor: u32, numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || numerator >= denominator {
            return None;
        }
        let divisor = gcd(numerator, denominator);
        Some(Self {
            anchor,
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    /// Key of the `slot`-th (1-based) of `count` tags queued after `anchor`:
    /// `anchor + slot / (count + 1)`.
    pub fn markup_slot(anchor: u32, slot: u32, count: u32) -> Option<Self> {
        if slot > count {
            return None;
        }
        Self::between(anchor, slot, count.checked_add(1)?)
    }

    /// Whole-number part of the key.
    pub fn anchor(&self) -> u32 {
        self.anchor
    }

    /// The token position, or `None` for a markup key.
    pub fn as_token(&self) -> Option<u32> {
        self.is_token().then_some(self.anchor)
    }

    pub fn is_token(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_markup(&self) -> bool {
        !self.is_token()
    }

    /// Fractional part as `(numerator, denominator)` in lowest terms.
    pub fn fraction(&self) -> (u32, u32) {
        (self.numerator, self.denominator)
    }

    /// Lossy float view, for display only.
    pub fn to_f64(&self) -> f64 {
        f64::from(self.anchor) + f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl Ord for NodeIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.anchor.cmp(&other.anchor).then_with(|| {
            let lhs = u64::from(self.numerator) * u64::from(other.denominator);
            let rhs = u64::from(other.numerator) * u64::from(self.denominator);
            lhs.cmp(&rhs)
        })
    }
}

impl PartialOrd for NodeIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u32> for NodeIndex {
    fn from(position: u32) -> Self {
        Self::token(position)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_token() {
            write!(f, "{}", self.anchor)
        } else {
            write!(f, "{}+{}/{}", self.anchor, self.numerator, self.denominator)
        }
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn test_markup_slots_are_quarters() {
        let keys: [NodeIndex; 3] = [
            NodeIndex::markup_slot(2, 1, 3).unwrap(),
            NodeIndex::markup_slot(2, 2, 3).unwrap(),
            NodeIndex::markup_slot(2, 3, 3).unwrap(),
        ];

        assert_eq!(keys[0].fraction(), (1, 4));
        assert_eq!(keys[1].fraction(), (1, 2));
        assert_eq!(keys[2].fraction(), (3, 4));
        assert_eq!(keys[1].to_f64(), 2.5);

        assert!(NodeIndex::token(2) < keys[0]);
        assert!(keys[0] < keys[1] && keys[1] < keys[2]);
        assert!(keys[2] < NodeIndex::token(3));
    }

    #[test]
    fn test_reduced_form_keeps_eq_and_ord_aligned() {
        let a = NodeIndex::between(5, 2, 4).unwrap();
        let b = NodeIndex::between(5, 1, 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_invalid_fractions_rejected() {
        assert!(NodeIndex::between(1, 0, 3).is_none());
        assert!(NodeIndex::between(1, 3, 3).is_none());
        assert!(NodeIndex::markup_slot(1, 0, 2).is_none());
        assert!(NodeIndex::markup_slot(1, 3, 2).is_none());
        assert!(NodeIndex::markup_slot(1, 1, u32::MAX).is_none());
    }

    #[test]
    fn test_large_denominators_do_not_collide() {
        // Float keys start colliding long before u32 denominators run out.
        let a = NodeIndex::between(0, 4_000_000_000, 4_000_000_001).unwrap();
        let b = NodeIndex::between(0, 3_999_999_999, 4_000_000_000).unwrap();
        assert!(b < a);
        assert!(a < NodeIndex::token(1));
    }

    #[test]
    fn test_display() {
        use alloc::string::ToString;

        assert_eq!(NodeIndex::token(7).to_string(), "7");
        assert_eq!(NodeIndex::markup_slot(7, 1, 1).unwrap().to_string(), "7+1/2");
    }

    proptest! {
        #[test]
        fn test_markup_batches_fill_the_gap_in_order(
            batches in proptest::collection::btree_map(0u32..100_000, 1u32..300, 1..8)
        ) {
            let mut keys: Vec<NodeIndex> = Vec::new();
            for (&anchor, &count) in &batches {
                keys.push(NodeIndex::token(anchor));
                for slot in 1..=count {
                    let key = NodeIndex::markup_slot(anchor, slot, count).unwrap();
                    prop_assert!(key.is_markup());
                    prop_assert_eq!(key.as_token(), None);
                    prop_assert_eq!(key.anchor(), anchor);
                    prop_assert!(NodeIndex::token(anchor) < key);
                    prop_assert!(key < NodeIndex::token(anchor + 1));
                    keys.push(key);
                }
            }
            // Tokens and tags interleaved in insertion order are already sorted and distinct
            prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
