//! A pure-Rust oracle for the host's own sequence-slicing semantics (§4.5:
//! "preserve the exact semantics of the reference language's sequence
//! slicing, including negative indices, open ends, zero-length results,
//! and negative steps"). `glyph-codegen` never evaluates a slice itself —
//! it emits a literal `target[start:stop:step]` expression and lets the
//! host interpreter do the work (see [`crate::generator::Generator::gen_slice`])
//! — but the generator's choice to do that is only correct if the host's
//! slicing really does implement this algorithm, so this module is the
//! executable specification of that claim, checked against the six fixed
//! scenarios in the testable-properties table plus randomized cases.

/// Mirrors CPython's `slice.indices(len)` normalization: negative indices
/// count from the end, out-of-range bounds clamp rather than error, and a
/// negative `step` reverses the walk direction and default-open bounds.
pub fn python_slice<T: Clone>(items: &[T], start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Vec<T> {
    let len = items.len() as i64;
    let step = step.unwrap_or(1);
    assert_ne!(step, 0, "slice step must not be zero");

    let clamp = |v: i64, lower: i64, upper: i64| v.max(lower).min(upper);
    let normalize = |index: Option<i64>, default_positive: i64, default_negative: i64| -> i64 {
        match index {
            None => {
                if step > 0 {
                    default_positive
                } else {
                    default_negative
                }
            }
            Some(i) => {
                let i = if i < 0 { i + len } else { i };
                if step > 0 {
                    clamp(i, 0, len)
                } else {
                    clamp(i, -1, len - 1)
                }
            }
        }
    };

    let start = normalize(start, 0, len - 1);
    let stop = normalize(stop, len, -1);

    let mut result = Vec::new();
    if step > 0 {
        let mut i = start;
        while i < stop {
            if (0..len).contains(&i) {
                result.push(items[i as usize].clone());
            }
            i += step;
        }
    } else {
        let mut i = start;
        while i > stop {
            if (0..len).contains(&i) {
                result.push(items[i as usize].clone());
            }
            i += step;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ARR: &[i32] = &[10, 20, 30, 40, 50];

    #[test]
    fn six_fixed_conformance_scenarios() {
        assert_eq!(python_slice(ARR, Some(1), Some(4), None), vec![20, 30, 40]);
        assert_eq!(python_slice(ARR, None, Some(3), None), vec![10, 20, 30]);
        assert_eq!(python_slice(ARR, Some(-1), None, None), vec![50]);
        assert_eq!(python_slice(ARR, None, None, Some(-1)), vec![50, 40, 30, 20, 10]);
        assert_eq!(python_slice(ARR, Some(3), Some(1), None), Vec::<i32>::new());
        assert_eq!(python_slice(ARR, Some(-1), None, Some(-1)), vec![50, 40, 30, 20, 10]);
    }

    #[test]
    fn full_forward_slice_is_identity() {
        assert_eq!(python_slice(ARR, None, None, None), ARR.to_vec());
    }

    #[test]
    fn empty_input_never_panics() {
        let empty: &[i32] = &[];
        assert_eq!(python_slice(empty, Some(-5), Some(5), None), Vec::<i32>::new());
        assert_eq!(python_slice(empty, None, None, Some(-1)), Vec::<i32>::new());
    }

    #[test]
    #[should_panic(expected = "step must not be zero")]
    fn zero_step_panics() {
        python_slice(ARR, None, None, Some(0));
    }

    proptest! {
        #[test]
        fn reversing_a_full_reverse_restores_the_original(v in prop::collection::vec(any::<i32>(), 0..20)) {
            let reversed = python_slice(&v, None, None, Some(-1));
            let restored = python_slice(&reversed, None, None, Some(-1));
            prop_assert_eq!(restored, v);
        }

        #[test]
        fn out_of_range_bounds_clamp_instead_of_panicking(
            v in prop::collection::vec(any::<i32>(), 0..20),
            start in -50i64..50,
            stop in -50i64..50,
        ) {
            // Must not panic for any bound, however far outside `[-len, len)`.
            let _ = python_slice(&v, Some(start), Some(stop), None);
        }

        #[test]
        fn forward_slice_never_exceeds_source_length(
            v in prop::collection::vec(any::<i32>(), 0..20),
            start in -30i64..30,
            stop in -30i64..30,
        ) {
            let sliced = python_slice(&v, Some(start), Some(stop), None);
            prop_assert!(sliced.len() <= v.len());
        }
    }
}
