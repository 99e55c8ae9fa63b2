//! Size Estimator Module
//!
//! Approximates the in-memory footprint of cached values. Estimates are
//! deterministic and never fail; they are used for memory accounting only,
//! not as a measurement of real heap usage.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

// == Estimation Constants ==
/// Cost of any numeric value
pub const NUMBER_BYTES: usize = 8;

/// Cost of a boolean
pub const BOOL_BYTES: usize = 4;

/// Fallback cost for opaque values and for subtrees below the depth limit
pub const REFERENCE_BYTES: usize = 8;

/// Bookkeeping cost added per element of a sequence or mapping
pub const ELEMENT_OVERHEAD_BYTES: usize = 8;

/// Nesting depth past which composite values are no longer walked
pub const MAX_ESTIMATE_DEPTH: usize = 32;

// == Estimate Size Trait ==
/// Types whose footprint can be estimated for memory accounting.
///
/// Implementations map the value onto one of a small set of shapes using
/// the helpers in this module: [`text`], [`NUMBER_BYTES`], [`BOOL_BYTES`],
/// [`sequence`], [`mapping`], or the [`REFERENCE_BYTES`] fallback.
pub trait EstimateSize {
    /// Estimates the size of `self`, which sits `depth` levels below the root.
    fn estimate_at_depth(&self, depth: usize) -> usize;

    /// Estimates the size of `self` as a root value.
    fn estimated_size(&self) -> usize {
        self.estimate_at_depth(0)
    }
}

/// Estimates the footprint of `value`.
pub fn estimate<T: EstimateSize + ?Sized>(value: &T) -> usize {
    value.estimated_size()
}

// == Shape Helpers ==
/// Strings cost their length in bytes.
pub fn text(s: &str) -> usize {
    s.len()
}

/// Sum of element sizes plus a per-element overhead.
pub fn sequence<'a, T, I>(items: I, depth: usize) -> usize
where
    T: EstimateSize + 'a + ?Sized,
    I: IntoIterator<Item = &'a T>,
{
    if depth >= MAX_ESTIMATE_DEPTH {
        return REFERENCE_BYTES;
    }

    items
        .into_iter()
        .map(|item| item.estimate_at_depth(depth + 1) + ELEMENT_OVERHEAD_BYTES)
        .sum()
}

/// Sum of key and value sizes plus a per-pair overhead.
pub fn mapping<'a, K, V, I>(pairs: I, depth: usize) -> usize
where
    K: EstimateSize + 'a + ?Sized,
    V: EstimateSize + 'a + ?Sized,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    if depth >= MAX_ESTIMATE_DEPTH {
        return REFERENCE_BYTES;
    }

    pairs
        .into_iter()
        .map(|(k, v)| {
            k.estimate_at_depth(depth + 1) + v.estimate_at_depth(depth + 1) + ELEMENT_OVERHEAD_BYTES
        })
        .sum()
}

// == Opaque Values ==
/// Wrapper for payloads that should be charged the flat fallback cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque<T>(pub T);

impl<T> EstimateSize for Opaque<T> {
    fn estimate_at_depth(&self, _depth: usize) -> usize {
        REFERENCE_BYTES
    }
}

// == Primitive Implementations ==
impl EstimateSize for str {
    fn estimate_at_depth(&self, _depth: usize) -> usize {
        text(self)
    }
}

impl EstimateSize for String {
    fn estimate_at_depth(&self, _depth: usize) -> usize {
        text(self)
    }
}

impl EstimateSize for bool {
    fn estimate_at_depth(&self, _depth: usize) -> usize {
        BOOL_BYTES
    }
}

impl EstimateSize for () {
    fn estimate_at_depth(&self, _depth: usize) -> usize {
        REFERENCE_BYTES
    }
}

macro_rules! impl_numeric {
    ($($t:ty),*) => {
        $(
            impl EstimateSize for $t {
                fn estimate_at_depth(&self, _depth: usize) -> usize {
                    NUMBER_BYTES
                }
            }
        )*
    };
}

impl_numeric!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// == Wrapper Implementations ==
impl<T: EstimateSize + ?Sized> EstimateSize for &T {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        (**self).estimate_at_depth(depth)
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Box<T> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        (**self).estimate_at_depth(depth)
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        (**self).estimate_at_depth(depth)
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Rc<T> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        (**self).estimate_at_depth(depth)
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        match self {
            Some(inner) => inner.estimate_at_depth(depth),
            None => REFERENCE_BYTES,
        }
    }
}

// == Composite Implementations ==
impl<T: EstimateSize> EstimateSize for [T] {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        sequence(self.iter(), depth)
    }
}

impl<T: EstimateSize> EstimateSize for Vec<T> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        sequence(self.iter(), depth)
    }
}

impl<T: EstimateSize> EstimateSize for VecDeque<T> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        sequence(self.iter(), depth)
    }
}

impl<K: EstimateSize, V: EstimateSize, S: BuildHasher> EstimateSize for HashMap<K, V, S> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        mapping(self.iter(), depth)
    }
}

impl<K: EstimateSize, V: EstimateSize> EstimateSize for BTreeMap<K, V> {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        mapping(self.iter(), depth)
    }
}

// == JSON Implementation ==
impl EstimateSize for Value {
    fn estimate_at_depth(&self, depth: usize) -> usize {
        match self {
            Value::Null => REFERENCE_BYTES,
            Value::Bool(_) => BOOL_BYTES,
            Value::Number(_) => NUMBER_BYTES,
            Value::String(s) => text(s),
            Value::Array(items) => sequence(items.iter(), depth),
            Value::Object(map) => mapping(map.iter(), depth),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_costs_its_length() {
        assert_eq!(estimate("hello"), 5);
        assert_eq!(estimate(&"x".repeat(500)), 500);
        assert_eq!(estimate(""), 0);
    }

    #[test]
    fn test_primitive_costs() {
        assert_eq!(estimate(&42u32), NUMBER_BYTES);
        assert_eq!(estimate(&-1.5f64), NUMBER_BYTES);
        assert_eq!(estimate(&true), BOOL_BYTES);
        assert_eq!(estimate(&Opaque(vec![0u8; 4096])), REFERENCE_BYTES);
    }

    #[test]
    fn test_sequence_adds_overhead_per_element() {
        let items = vec!["ab".to_string(), "cde".to_string()];
        assert_eq!(estimate(&items), 2 + 3 + 2 * ELEMENT_OVERHEAD_BYTES);
        assert_eq!(estimate(&Vec::<u8>::new()), 0);
    }

    #[test]
    fn test_mapping_charges_keys_and_values() {
        let mut map = BTreeMap::new();
        map.insert("title".to_string(), "Dune".to_string());
        map.insert("year".to_string(), "2021".to_string());

        let expected = (5 + 4) + (4 + 4) + 2 * ELEMENT_OVERHEAD_BYTES;
        assert_eq!(estimate(&map), expected);
    }

    #[test]
    fn test_json_value_shapes() {
        assert_eq!(estimate(&json!(null)), REFERENCE_BYTES);
        assert_eq!(estimate(&json!(false)), BOOL_BYTES);
        assert_eq!(estimate(&json!(3.14)), NUMBER_BYTES);
        assert_eq!(estimate(&json!("movie")), 5);

        let value = json!({ "ids": [1, 2], "title": "Up" });
        let ids = 2 * (NUMBER_BYTES + ELEMENT_OVERHEAD_BYTES);
        let expected = (3 + ids + ELEMENT_OVERHEAD_BYTES) + (5 + 2 + ELEMENT_OVERHEAD_BYTES);
        assert_eq!(estimate(&value), expected);
    }

    #[test]
    fn test_depth_limit_falls_back_to_reference_cost() {
        let mut value = json!("leaf-with-a-long-payload");
        for _ in 0..(MAX_ESTIMATE_DEPTH + 10) {
            value = json!([value]);
        }

        // Every level above the cut-off costs one overhead; the cut subtree
        // costs a single reference.
        let expected = MAX_ESTIMATE_DEPTH * ELEMENT_OVERHEAD_BYTES + REFERENCE_BYTES;
        assert_eq!(estimate(&value), expected);
    }

    #[test]
    fn test_estimates_are_deterministic() {
        let value = json!({ "a": [1, "two", { "three": true }], "b": null });
        let first = estimate(&value);
        for _ in 0..10 {
            assert_eq!(estimate(&value.clone()), first);
        }
    }

    #[test]
    fn test_shared_pointer_delegates() {
        let value = Arc::new("shared".to_string());
        assert_eq!(estimate(&value), 6);
        assert_eq!(estimate(&Some(Box::new(7u64))), NUMBER_BYTES);
        assert_eq!(estimate(&None::<String>), REFERENCE_BYTES);
    }
}
