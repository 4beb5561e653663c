//! Raw mantissa rescaling between exponent representations
//!
//! The shared primitive behind every cast and arithmetic downscale. All
//! mantissa math runs widened to `i128`, the widest native storage, which
//! puts the widening ahead of any left shift; narrowing back to the
//! destination storage happens after the shift.
//!
//! Right shifts lose precision and round under one build-wide policy,
//! selected by cargo feature. Every narrowing site in the engine goes
//! through this module, so independently compiled users of the same policy
//! stay bit-compatible.

#[cfg(all(feature = "round-nearest", feature = "round-down"))]
compile_error!("select exactly one rounding policy feature");
#[cfg(all(feature = "round-nearest", feature = "round-to-zero"))]
compile_error!("select exactly one rounding policy feature");
#[cfg(all(feature = "round-down", feature = "round-to-zero"))]
compile_error!("select exactly one rounding policy feature");
#[cfg(not(any(
    feature = "round-nearest",
    feature = "round-down",
    feature = "round-to-zero"
)))]
compile_error!("a rounding policy feature must be enabled");

/// Rounding applied wherever a mantissa loses low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Plain arithmetic shift, biased toward negative infinity.
    Down,
    /// Truncates toward zero.
    ToZero,
    /// Nearest step, ties away from zero.
    Nearest,
}

/// The policy this build was compiled with.
pub const ROUNDING: Rounding = if cfg!(feature = "round-down") {
    Rounding::Down
} else if cfg!(feature = "round-to-zero") {
    Rounding::ToZero
} else {
    Rounding::Nearest
};

/// Arithmetic right shift under the active policy.
const fn shift_right(raw: i128, shift: u32) -> i128 {
    if shift == 0 {
        return raw;
    }
    if shift > 126 {
        // Wider than any gap between two valid representations; every
        // mantissa bit sits below the destination step.
        return match ROUNDING {
            Rounding::Down => raw >> 126 >> 1,
            Rounding::ToZero | Rounding::Nearest => 0,
        };
    }
    let floor = raw >> shift;
    let rem = raw - (floor << shift); // in [0, 2^shift)
    match ROUNDING {
        Rounding::Down => floor,
        Rounding::ToZero => {
            if raw < 0 && rem != 0 {
                floor + 1
            } else {
                floor
            }
        }
        Rounding::Nearest => {
            let half = 1i128 << (shift - 1);
            // Ties go away from zero on both sides.
            let up = if raw < 0 { rem > half } else { rem >= half };
            if up {
                floor + 1
            } else {
                floor
            }
        }
    }
}

/// Left shift for an exponent decrease. Bits pushed past the top would be
/// a violation of the caller's declared range, not a checked condition.
const fn shift_left(raw: i128, shift: u32) -> i128 {
    if shift > 127 {
        0
    } else {
        raw.wrapping_shl(shift)
    }
}

/// Convert a raw mantissa between two binary exponents.
pub const fn rescale(raw: i128, exp_src: i32, exp_dst: i32) -> i128 {
    if exp_dst < exp_src {
        shift_left(raw, (exp_src - exp_dst) as u32)
    } else if exp_dst > exp_src {
        shift_right(raw, (exp_dst - exp_src) as u32)
    } else {
        raw
    }
}

/// Negate and rescale in one step, shifting ahead of negation when the
/// most negative mantissa has no positive counterpart.
pub const fn neg_rescaled(raw: i128, exp_src: i32, exp_dst: i32) -> i128 {
    if raw == i128::MIN {
        rescale(raw, exp_src, exp_dst).wrapping_neg()
    } else {
        rescale(-raw, exp_src, exp_dst)
    }
}

/// Integer division rounded under the active policy.
pub const fn div_round(num: i128, den: i128) -> i128 {
    let quot = num / den;
    let rem = num % den;
    if rem == 0 {
        return quot;
    }
    let negative = (num < 0) != (den < 0);
    match ROUNDING {
        Rounding::ToZero => quot,
        Rounding::Down => {
            if negative {
                quot - 1
            } else {
                quot
            }
        }
        Rounding::Nearest => {
            if rem.unsigned_abs() >= den.unsigned_abs().div_ceil(2) {
                if negative {
                    quot - 1
                } else {
                    quot + 1
                }
            } else {
                quot
            }
        }
    }
}

/// Round a pre-scaled float to a raw mantissa under the active policy.
pub(crate) fn round_f64(x: f64) -> i128 {
    match ROUNDING {
        Rounding::ToZero => x as i128,
        Rounding::Down => {
            let t = x as i128;
            if t as f64 > x {
                t - 1
            } else {
                t
            }
        }
        Rounding::Nearest => {
            if x < 0.0 {
                (x - 0.5) as i128
            } else {
                (x + 0.5) as i128
            }
        }
    }
}

/// `2^e` as `f64`, built from the exponent field.
pub(crate) const fn pow2(e: i32) -> f64 {
    let biased = e + 1023;
    f64::from_bits(match biased {
        0x7FF.. => 0x7FFu64 << 52,
        1..=0x7FE => (biased as u64) << 52,
        -51..=0 => 1u64 << (51 + biased),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_identity() {
        assert_eq!(rescale(1234, -7, -7), 1234);
        assert_eq!(rescale(-1234, 3, 3), -1234);
    }

    #[test]
    fn test_left_shift_is_exact() {
        assert_eq!(rescale(5, 0, -4), 80);
        assert_eq!(rescale(-5, -2, -6), -80);
    }

    #[cfg(feature = "round-nearest")]
    #[test]
    fn test_right_shift_rounds_to_nearest() {
        assert_eq!(rescale(3, -1, 0), 2); // 1.5 away from zero
        assert_eq!(rescale(-3, -1, 0), -2);
        assert_eq!(rescale(5, -2, 0), 1); // 1.25 down
        assert_eq!(rescale(7, -2, 0), 2); // 1.75 up
        assert_eq!(rescale(-5, -2, 0), -1);
        assert_eq!(rescale(-7, -2, 0), -2);
    }

    #[cfg(feature = "round-down")]
    #[test]
    fn test_right_shift_rounds_down() {
        assert_eq!(rescale(3, -1, 0), 1);
        assert_eq!(rescale(-3, -1, 0), -2);
    }

    #[cfg(feature = "round-to-zero")]
    #[test]
    fn test_right_shift_rounds_to_zero() {
        assert_eq!(rescale(3, -1, 0), 1);
        assert_eq!(rescale(-3, -1, 0), -1);
    }

    #[cfg(feature = "round-nearest")]
    #[test]
    fn test_div_round_nearest() {
        assert_eq!(div_round(7, 2), 4);
        assert_eq!(div_round(-7, 2), -4);
        assert_eq!(div_round(5, 3), 2);
        assert_eq!(div_round(4, 3), 1);
        assert_eq!(div_round(-4, 3), -1);
        assert_eq!(div_round(6, 3), 2);
    }

    #[cfg(feature = "round-down")]
    #[test]
    fn test_div_round_down() {
        assert_eq!(div_round(7, 2), 3);
        assert_eq!(div_round(-7, 2), -4);
    }

    #[test]
    fn test_neg_rescaled_most_negative() {
        // i128::MIN has no positive counterpart; the right shift must land
        // before the negation.
        assert_eq!(neg_rescaled(i128::MIN, -1, 0), 1i128 << 126);
        assert_eq!(neg_rescaled(-5, 0, 0), 5);
    }

    #[test]
    fn test_pow2() {
        assert_eq!(pow2(0), 1.0);
        assert_eq!(pow2(10), 1024.0);
        assert_eq!(pow2(-3), 0.125);
        // Below the subnormal floor everything flushes to zero.
        assert_eq!(pow2(-1080), 0.0);
        assert_eq!(pow2(-1070), f64::from_bits(1 << 4));
    }
}
