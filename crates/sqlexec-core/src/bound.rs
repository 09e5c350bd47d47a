//! Clamp a value into an optionally one- or two-sided range.
//!
//! Used for the backoff delay and for pulling user-configured retry settings
//! back into their hard limits.

/// Bound `x` by `[min_x, max_x]`.
///
/// A `None` bound means that side is unbounded. With both bounds present the
/// upper bound wins if they cross (`min_x > max_x`).
pub fn clamp<T: PartialOrd>(min_x: Option<T>, max_x: Option<T>, x: T) -> T {
    match (min_x, max_x) {
        (None, None) => x,
        (None, Some(hi)) => at_most(hi, x),
        (Some(lo), None) => at_least(lo, x),
        (Some(lo), Some(hi)) => at_most(hi, at_least(lo, x)),
    }
}

fn at_most<T: PartialOrd>(hi: T, x: T) -> T {
    if x > hi {
        hi
    } else {
        x
    }
}

fn at_least<T: PartialOrd>(lo: T, x: T) -> T {
    if x < lo {
        lo
    } else {
        x
    }
}
