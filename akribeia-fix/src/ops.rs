//! Operators over range-typed values
//!
//! Every binary operator derives its result range by interval arithmetic
//! over the operand ranges and its result width from the operand widths,
//! then moves the mantissas through the shared rescaler. Preconditions
//! that cannot be met by rescaling (a divisor range that straddles zero, a
//! product mantissa wider than the widest native integer) are rejected
//! during const evaluation, so they fail the build instead of the run.

use core::cmp::Ordering;
use core::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

use crate::exponent::exponent;
use crate::fix::Fix;
use crate::range::{max2, min2, prod_hi, prod_lo, quot_hi, quot_lo, rem_hi, rem_lo, wider};
use crate::rescale::{div_round, neg_rescaled, rescale};
use crate::storage::{store_width, Storage, Width};

const fn assert_mul_fits(bits_a: u32, bits_b: u32) {
    assert!(
        bits_a + bits_b <= 128,
        "full product mantissa exceeds the widest native integer"
    );
}

const fn assert_div_fits(
    min_a: i128,
    max_a: i128,
    bits_a: u32,
    min_b: i128,
    max_b: i128,
    bits_b: u32,
) {
    assert!(min_b > 0 || max_b < 0, "divisor range includes zero");
    let exp_a = exponent(min_a, max_a, bits_a);
    let exp_b = exponent(min_b, max_b, bits_b);
    let exp_q = exponent(
        quot_lo(min_a, max_a, min_b, max_b),
        quot_hi(min_a, max_a, min_b, max_b),
        wider(bits_a, bits_b),
    );
    let pre = exp_a - exp_b - exp_q;
    let widened = bits_a as i32 + if pre > 0 { pre } else { 0 };
    assert!(
        widened <= 127,
        "pre-scaled numerator exceeds the widest native integer"
    );
}

const fn assert_rem_fits(
    min_a: i128,
    max_a: i128,
    bits_a: u32,
    min_b: i128,
    max_b: i128,
    bits_b: u32,
) {
    assert!(min_b > 0 || max_b < 0, "divisor range includes zero");
    let exp_a = exponent(min_a, max_a, bits_a);
    let exp_b = exponent(min_b, max_b, bits_b);
    let common = if exp_a < exp_b { exp_a } else { exp_b };
    assert!(
        bits_a as i32 + (exp_a - common) <= 127 && bits_b as i32 + (exp_b - common) <= 127,
        "common-scale operand exceeds the widest native integer"
    );
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> Neg for Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
    [(); { -MAX } as usize]:,
    [(); { -MIN } as usize]:,
{
    type Output = Fix<{ -MAX }, { -MIN }, BITS>;

    #[inline]
    fn neg(self) -> Self::Output {
        // The mirrored range can resolve to a coarser exponent when its
        // positive bound is a power of two; rescaling covers that case.
        Fix::from_wide(neg_rescaled(
            self.to_wide(),
            Self::EXP,
            exponent(-MAX, -MIN, BITS),
        ))
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > Add<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
    Width<{ store_width(wider(BITS_A, BITS_B)) }>: Storage,
    [(); { MIN_A + MIN_B } as usize]:,
    [(); { MAX_A + MAX_B } as usize]:,
{
    type Output = Fix<{ MIN_A + MIN_B }, { MAX_A + MAX_B }, { wider(BITS_A, BITS_B) }>;

    #[inline]
    fn add(self, rhs: Fix<MIN_B, MAX_B, BITS_B>) -> Self::Output {
        // The result width holds the worst-case sum, so both sides move to
        // the result scale first and the native add cannot overflow.
        let exp = exponent(MIN_A + MIN_B, MAX_A + MAX_B, wider(BITS_A, BITS_B));
        let a = rescale(self.to_wide(), Self::EXP, exp);
        let b = rescale(rhs.to_wide(), Fix::<MIN_B, MAX_B, BITS_B>::EXP, exp);
        Fix::from_wide(a.wrapping_add(b))
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > Sub<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
    Width<{ store_width(wider(BITS_A, BITS_B)) }>: Storage,
    [(); { MIN_A - MAX_B } as usize]:,
    [(); { MAX_A - MIN_B } as usize]:,
{
    type Output = Fix<{ MIN_A - MAX_B }, { MAX_A - MIN_B }, { wider(BITS_A, BITS_B) }>;

    #[inline]
    fn sub(self, rhs: Fix<MIN_B, MAX_B, BITS_B>) -> Self::Output {
        let exp = exponent(MIN_A - MAX_B, MAX_A - MIN_B, wider(BITS_A, BITS_B));
        let a = rescale(self.to_wide(), Self::EXP, exp);
        let b = rescale(rhs.to_wide(), Fix::<MIN_B, MAX_B, BITS_B>::EXP, exp);
        Fix::from_wide(a.wrapping_sub(b))
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > Mul<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
    Width<{ store_width(wider(BITS_A, BITS_B)) }>: Storage,
    [(); { prod_lo(MIN_A, MAX_A, MIN_B, MAX_B) } as usize]:,
    [(); { prod_hi(MIN_A, MAX_A, MIN_B, MAX_B) } as usize]:,
{
    type Output = Fix<
        { prod_lo(MIN_A, MAX_A, MIN_B, MAX_B) },
        { prod_hi(MIN_A, MAX_A, MIN_B, MAX_B) },
        { wider(BITS_A, BITS_B) },
    >;

    #[inline]
    fn mul(self, rhs: Fix<MIN_B, MAX_B, BITS_B>) -> Self::Output {
        const { assert_mul_fits(BITS_A, BITS_B) };
        // The full product needs the combined width; multiply widened and
        // rescale down to the inferred result.
        let exp = exponent(
            prod_lo(MIN_A, MAX_A, MIN_B, MAX_B),
            prod_hi(MIN_A, MAX_A, MIN_B, MAX_B),
            wider(BITS_A, BITS_B),
        );
        let wide = self.to_wide().wrapping_mul(rhs.to_wide());
        Fix::from_wide(rescale(
            wide,
            Self::EXP + Fix::<MIN_B, MAX_B, BITS_B>::EXP,
            exp,
        ))
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > Div<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
    Width<{ store_width(wider(BITS_A, BITS_B)) }>: Storage,
    [(); { quot_lo(MIN_A, MAX_A, MIN_B, MAX_B) } as usize]:,
    [(); { quot_hi(MIN_A, MAX_A, MIN_B, MAX_B) } as usize]:,
{
    type Output = Fix<
        { quot_lo(MIN_A, MAX_A, MIN_B, MAX_B) },
        { quot_hi(MIN_A, MAX_A, MIN_B, MAX_B) },
        { wider(BITS_A, BITS_B) },
    >;

    #[inline]
    fn div(self, rhs: Fix<MIN_B, MAX_B, BITS_B>) -> Self::Output {
        const { assert_div_fits(MIN_A, MAX_A, BITS_A, MIN_B, MAX_B, BITS_B) };
        let exp = exponent(
            quot_lo(MIN_A, MAX_A, MIN_B, MAX_B),
            quot_hi(MIN_A, MAX_A, MIN_B, MAX_B),
            wider(BITS_A, BITS_B),
        );
        // Pre-scale the numerator so the native quotient lands directly on
        // the result scale.
        let pre = Self::EXP - Fix::<MIN_B, MAX_B, BITS_B>::EXP - exp;
        let num = rescale(self.to_wide(), 0, -pre);
        Fix::from_wide(div_round(num, rhs.to_wide()))
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > Rem<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
    Width<{ store_width(wider(BITS_A, BITS_B)) }>: Storage,
    [(); { rem_lo(MIN_A, MIN_B, MAX_B) } as usize]:,
    [(); { rem_hi(MAX_A, MIN_B, MAX_B) } as usize]:,
{
    type Output = Fix<
        { rem_lo(MIN_A, MIN_B, MAX_B) },
        { rem_hi(MAX_A, MIN_B, MAX_B) },
        { wider(BITS_A, BITS_B) },
    >;

    #[inline]
    fn rem(self, rhs: Fix<MIN_B, MAX_B, BITS_B>) -> Self::Output {
        const { assert_rem_fits(MIN_A, MAX_A, BITS_A, MIN_B, MAX_B, BITS_B) };
        let exp_b = Fix::<MIN_B, MAX_B, BITS_B>::EXP;
        let common = if Self::EXP < exp_b { Self::EXP } else { exp_b };
        let a = rescale(self.to_wide(), Self::EXP, common);
        let b = rescale(rhs.to_wide(), exp_b, common);
        let exp = exponent(
            rem_lo(MIN_A, MIN_B, MAX_B),
            rem_hi(MAX_A, MIN_B, MAX_B),
            wider(BITS_A, BITS_B),
        );
        // The native remainder takes the dividend's sign, matching the
        // statically chosen result range.
        Fix::from_wide(rescale(a % b, common, exp))
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > PartialEq<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
{
    #[inline]
    fn eq(&self, other: &Fix<MIN_B, MAX_B, BITS_B>) -> bool {
        // Operands may carry different exponents; both move to the scale
        // of the combined range before the raw compare.
        let exp = exponent(
            min2(MIN_A, MIN_B),
            max2(MAX_A, MAX_B),
            wider(BITS_A, BITS_B),
        );
        rescale(self.to_wide(), Self::EXP, exp)
            == rescale(other.to_wide(), Fix::<MIN_B, MAX_B, BITS_B>::EXP, exp)
    }
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> Eq for Fix<MIN, MAX, BITS> where
    Width<{ store_width(BITS) }>: Storage
{
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > PartialOrd<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
{
    #[inline]
    fn partial_cmp(&self, other: &Fix<MIN_B, MAX_B, BITS_B>) -> Option<Ordering> {
        let exp = exponent(
            min2(MIN_A, MIN_B),
            max2(MAX_A, MAX_B),
            wider(BITS_A, BITS_B),
        );
        let a = rescale(self.to_wide(), Self::EXP, exp);
        let b = rescale(other.to_wide(), Fix::<MIN_B, MAX_B, BITS_B>::EXP, exp);
        Some(a.cmp(&b))
    }
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> Ord for Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_wide().cmp(&other.to_wide())
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > AddAssign<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
{
    /// In-place add without range re-inference. The caller keeps the sum
    /// inside the declared range; excursions wrap silently.
    #[inline]
    fn add_assign(&mut self, rhs: Fix<MIN_B, MAX_B, BITS_B>) {
        let b = rescale(rhs.to_wide(), Fix::<MIN_B, MAX_B, BITS_B>::EXP, Self::EXP);
        *self = Self::from_wide(self.to_wide().wrapping_add(b));
    }
}

impl<
        const MIN_A: i128,
        const MAX_A: i128,
        const BITS_A: u32,
        const MIN_B: i128,
        const MAX_B: i128,
        const BITS_B: u32,
    > SubAssign<Fix<MIN_B, MAX_B, BITS_B>> for Fix<MIN_A, MAX_A, BITS_A>
where
    Width<{ store_width(BITS_A) }>: Storage,
    Width<{ store_width(BITS_B) }>: Storage,
{
    /// In-place subtract without range re-inference; see [`AddAssign`].
    #[inline]
    fn sub_assign(&mut self, rhs: Fix<MIN_B, MAX_B, BITS_B>) {
        let b = rescale(rhs.to_wide(), Fix::<MIN_B, MAX_B, BITS_B>::EXP, Self::EXP);
        *self = Self::from_wide(self.to_wide().wrapping_sub(b));
    }
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> MulAssign<i32> for Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    /// Scalar scale-up for hot loops. Trusts the caller: the result can
    /// leave the declared range silently.
    #[inline]
    fn mul_assign(&mut self, rhs: i32) {
        *self = Self::from_wide(self.to_wide().wrapping_mul(rhs as i128));
    }
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> DivAssign<i32> for Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    /// Scalar scale-down for hot loops, rounded under the active policy.
    #[inline]
    fn div_assign(&mut self, rhs: i32) {
        *self = Self::from_wide(div_round(self.to_wide(), rhs as i128));
    }
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> RemAssign<i32> for Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    /// Remainder against a whole-number scalar, in place.
    #[inline]
    fn rem_assign(&mut self, rhs: i32) {
        let b = rescale(rhs as i128, 0, Self::EXP);
        *self = Self::from_wide(self.to_wide() % b);
    }
}
