#![feature(generic_const_exprs)]
#![allow(incomplete_features)]

use akribeia_fix::{exponent, rescale, Fix};
use proptest::prelude::*;

/// Left shift that reports lost bits instead of dropping them.
fn shl_checked(m: u128, s: u32) -> Option<u128> {
    if s == 0 {
        Some(m)
    } else if s >= 128 || m > (u128::MAX >> s) {
        None
    } else {
        Some(m << s)
    }
}

/// Exact check that `max` fits below `(2^(bits-1) - 1) * 2^exp`.
fn fits_upper(max: i128, bits: u32, exp: i32) -> bool {
    if max <= 0 {
        return true;
    }
    let m = max as u128;
    let cap = (1u128 << (bits - 1)) - 1;
    if exp >= 0 {
        match shl_checked(cap, exp as u32) {
            None => true,
            Some(bound) => m <= bound,
        }
    } else {
        match shl_checked(m, exp.unsigned_abs()) {
            None => false,
            Some(scaled) => scaled <= cap,
        }
    }
}

/// Exact check that `min` fits above `-2^(bits-1) * 2^exp`.
fn fits_lower(min: i128, bits: u32, exp: i32) -> bool {
    if min >= 0 {
        return true;
    }
    let m = min.unsigned_abs();
    let e = bits as i32 - 1 + exp;
    if e >= 128 {
        true
    } else if e < 0 {
        false
    } else {
        m <= 1u128 << e
    }
}

// Property 1: the estimator is deterministic and its result covers both
// bounds, for arbitrary skewed ranges and widths up to the full 128 bits.
proptest! {
    #[test]
    fn prop_exponent_covers_range(
        a in -(1i128 << 96)..(1i128 << 96),
        b in -(1i128 << 96)..(1i128 << 96),
        bits in 2u32..=128,
    ) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let exp = exponent(min, max, bits);
        prop_assert_eq!(exp, exponent(min, max, bits));
        prop_assert!(fits_lower(min, bits, exp), "min {} escapes at exp {}", min, exp);
        prop_assert!(fits_upper(max, bits, exp), "max {} escapes at exp {}", max, exp);
    }
}

// Property 2: the chosen exponent is the finest that still covers, except
// for the point range at zero where every exponent covers.
proptest! {
    #[test]
    fn prop_exponent_is_minimal(
        a in -(1i128 << 96)..(1i128 << 96),
        b in -(1i128 << 96)..(1i128 << 96),
        bits in 2u32..=128,
    ) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        prop_assume!(min != 0 || max != 0);
        let exp = exponent(min, max, bits);
        let finer_covers = fits_lower(min, bits, exp - 1) && fits_upper(max, bits, exp - 1);
        prop_assert!(!finer_covers, "exp {} is not minimal for [{}, {}]", exp, min, max);
    }
}

// Property 3: gaining precision is exact and reverses losslessly.
proptest! {
    #[test]
    fn prop_left_shift_roundtrips(
        raw in -(1i128 << 100)..(1i128 << 100),
        exp in -60i32..60,
        gain in 1u32..24,
    ) {
        let finer = rescale(raw, exp, exp - gain as i32);
        prop_assert_eq!(rescale(finer, exp - gain as i32, exp), raw);
    }
}

// Property 4: losing precision stays within one destination step, in the
// direction the active policy dictates.
proptest! {
    #[test]
    fn prop_right_shift_error_is_bounded(
        raw in -(1i128 << 100)..(1i128 << 100),
        exp in -60i32..60,
        loss in 1u32..24,
    ) {
        let coarser = rescale(raw, exp, exp + loss as i32);
        let back = coarser << loss;
        let err = raw - back;
        let step = 1i128 << loss;
        if cfg!(feature = "round-down") {
            prop_assert!(err >= 0 && err < step);
        } else if cfg!(feature = "round-to-zero") {
            prop_assert!(err.unsigned_abs() < step as u128);
            prop_assert!(err == 0 || (err > 0) == (raw > 0));
        } else {
            prop_assert!(err.unsigned_abs() <= (step / 2) as u128);
        }
    }
}

// Property 5: float round trip lands within one mantissa step.
proptest! {
    #[test]
    fn prop_float_roundtrip(x in -1000.0f64..1000.0) {
        let fix = Fix::<-1000, 1000, 32>::from_f64(x);
        let step = libm::exp2(Fix::<-1000, 1000, 32>::EXP as f64);
        prop_assert!((fix.to_f64() - x).abs() <= step);
    }
}

// Property 6: two declarations with different ranges agree on every value
// both can represent.
proptest! {
    #[test]
    fn prop_cross_representation_equality(n in (-5i64 << 25)..(20i64 << 25)) {
        let x = n as f64 * libm::exp2(-25.0);
        let wide = Fix::<-10, 50, 32>::from_f64(x);
        let narrow = Fix::<-5, 20, 32>::from_f64(x);
        prop_assert!(wide == narrow);
        prop_assert!(narrow == wide);
    }
}

// Property 7: arithmetic agrees with the float baseline within one step of
// the inferred result type.
proptest! {
    #[test]
    fn prop_arithmetic_matches_baseline(a in -100.0f64..100.0, b in -100.0f64..100.0) {
        type Operand = Fix<-100, 100, 32>;
        let fa = Operand::from_f64(a);
        let fb = Operand::from_f64(b);
        // Quantized inputs make the baseline exact up to f64 rounding.
        let (a, b) = (fa.to_f64(), fb.to_f64());

        let sum: Fix<-200, 200, 32> = fa + fb;
        let step = libm::exp2(Fix::<-200, 200, 32>::EXP as f64);
        prop_assert!((sum.to_f64() - (a + b)).abs() <= step);

        let diff: Fix<-200, 200, 32> = fa - fb;
        prop_assert!((diff.to_f64() - (a - b)).abs() <= step);

        let prod: Fix<-10000, 10000, 32> = fa * fb;
        let step = libm::exp2(Fix::<-10000, 10000, 32>::EXP as f64);
        // The baseline itself rounds once in f64; allow for that on top of
        // the one-step contract.
        let tol = step + (a * b).abs() * 1e-12;
        prop_assert!((prod.to_f64() - a * b).abs() <= tol);
    }
}

// Property 8: division against the float baseline, divisor bounded away
// from zero by its type.
proptest! {
    #[test]
    fn prop_division_matches_baseline(a in -100.0f64..100.0, b in 1.0f64..100.0) {
        let fa = Fix::<-100, 100, 32>::from_f64(a);
        let fb = Fix::<1, 100, 32>::from_f64(b);
        let (a, b) = (fa.to_f64(), fb.to_f64());

        let quot: Fix<-100, 100, 32> = fa / fb;
        let step = libm::exp2(Fix::<-100, 100, 32>::EXP as f64);
        let tol = step + (a / b).abs() * 1e-12;
        prop_assert!((quot.to_f64() - a / b).abs() <= tol);
    }
}

// Property 9: whole and fractional parts recompose exactly.
proptest! {
    #[test]
    fn prop_trunc_fract_recompose(x in -10.0f64..15.0) {
        let fix = Fix::<-10, 15, 32>::from_f64(x);
        let quantized = fix.to_f64();
        prop_assert_eq!(fix.trunc().to_f64() + fix.fract().to_f64(), quantized);
        // The whole part truncates toward zero.
        prop_assert_eq!(fix.trunc().to_f64(), quantized.trunc());
    }
}
