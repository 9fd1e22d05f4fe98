use num_traits::{Bounded, NumCast, Zero};

/// Rounds to the nearest integer, ties go to the even neighbour (2.5 -> 2, 3.5 -> 4).
#[inline]
pub fn round_even(n: f64) -> f64 {
    n.round_ties_even()
}

/// Reads a real as an integer of type `T`.
///
/// Rounds half to even and clamps to the bounds of `T`. NaN reads as zero.
/// Never fails, so callers can use it on any argument.
pub fn to_int<T>(n: f64) -> T
where
    T: NumCast + Bounded + Zero,
{
    if n.is_nan() {
        return T::zero();
    }

    let r = round_even(n);
    match <T as NumCast>::from(r) {
        Some(v) => v,
        None if r > 0.0 => T::max_value(),
        None => T::min_value(),
    }
}

/// Formats a real for display.
///
/// Both infinities print as `INF` (the sign is dropped) and NaN prints as `NAN`.
/// Finite values use the shortest decimal that parses back to the same `f64`,
/// without an exponent and without a trailing `.0` on integral values.
pub fn format_real(n: f64) -> String {
    if n.is_infinite() {
        "INF".into()
    } else if n.is_nan() {
        "NAN".into()
    } else if n == 0.0 {
        // catches -0.0 as well
        "0".into()
    } else {
        n.to_string()
    }
}

/// Parses text as a real, the way `real()` reads a string argument.
///
/// Surrounding whitespace is ignored. Text that is not a plain decimal number
/// (including the words `inf` and `nan`) reads as 0.
pub fn parse_real(s: &str) -> f64 {
    let s = s.trim();
    let digits = s.trim_start_matches(['+', '-']);
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return 0.0;
    }

    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}
