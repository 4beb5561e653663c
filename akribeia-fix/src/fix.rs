//! Range-typed fixed-point values
//!
//! `Fix<MIN, MAX, BITS>` scales a `BITS`-wide two's-complement mantissa by
//! a power of two derived from the declared value range. The range never
//! exists at runtime; the only stored state is the raw mantissa.
//!
//! Constructors and casts do not range-check. Supplying a value outside
//! `[MIN, MAX]` wraps or loses precision under the build's rounding policy
//! with no diagnostic; the declared range is a proof obligation on the
//! caller, which is what keeps every operation branch-free on targets
//! without an FPU.

use crate::exponent::exponent;
use crate::range::{abs_limit, frac_hi, frac_lo};
use crate::rescale::{neg_rescaled, pow2, rescale, round_f64};
use crate::storage::{store_width, Storage, Width};

/// Fixed-point value in `[MIN, MAX]` with a `BITS`-wide mantissa.
///
/// The scaling exponent is a pure function of the three parameters, so two
/// independently declared `Fix` types with the same parameters share one
/// layout: an N-bit two's-complement integer, no header, no padding.
///
/// ```
/// # #![feature(generic_const_exprs)]
/// use akribeia_fix::Fix;
///
/// let rpm = Fix::<0, 6000, 32>::from_f64(1437.5);
/// assert_eq!(rpm.to_f64(), 1437.5);
/// assert_eq!(rpm.to_int(), 1438);
/// ```
///
/// Division by a range that straddles zero does not build:
///
/// ```compile_fail
/// # #![feature(generic_const_exprs)]
/// use akribeia_fix::Fix;
///
/// let num = Fix::<0, 100, 32>::from_int(10);
/// let den = Fix::<-5, 5, 32>::from_int(2);
/// let _ = num / den;
/// ```
///
/// Neither does a mantissa wider than any native integer:
///
/// ```compile_fail
/// # #![feature(generic_const_exprs)]
/// use akribeia_fix::Fix;
///
/// let x = Fix::<0, 1, 200>::from_int(0);
/// ```
#[derive(Clone, Copy)]
pub struct Fix<const MIN: i128, const MAX: i128, const BITS: u32 = 32>
where
    Width<{ store_width(BITS) }>: Storage,
{
    raw: <Width<{ store_width(BITS) }> as Storage>::Raw,
}

/// Point range: a single compile-time value.
pub type Point<const V: i128, const BITS: u32 = 32> = Fix<V, V, BITS>;

/// Inject a compile-time constant into a fixed-point expression without
/// hand-deriving its scale.
///
/// ```
/// # #![feature(generic_const_exprs)]
/// use akribeia_fix::{point, Point};
///
/// let hundred: Point<100> = point();
/// assert_eq!(hundred.to_f64(), 100.0);
/// ```
#[inline]
#[must_use]
pub fn point<const V: i128, const BITS: u32>() -> Point<V, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    Point::<V, BITS>::from_wide(rescale(V, 0, Point::<V, BITS>::EXP))
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    /// Binary scaling exponent: `value = raw * 2^EXP`.
    pub const EXP: i32 = exponent(MIN, MAX, BITS);

    /// Width of the backing native integer.
    pub const STORE_BITS: u32 = store_width(BITS);

    /// Value of one mantissa step.
    pub const STEP: f64 = pow2(Self::EXP);

    /// Wrap a raw mantissa already at this type's scale.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: <Width<{ store_width(BITS) }> as Storage>::Raw) -> Self {
        Self { raw }
    }

    /// The raw mantissa.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> <Width<{ store_width(BITS) }> as Storage>::Raw {
        self.raw
    }

    /// Wrap a widened mantissa, truncating to the native storage.
    #[inline]
    #[must_use]
    pub fn from_wide(wide: i128) -> Self {
        Self {
            raw: <Width<{ store_width(BITS) }> as Storage>::narrow(wide),
        }
    }

    /// The raw mantissa widened to `i128`.
    #[inline]
    #[must_use]
    pub fn to_wide(self) -> i128 {
        <Width<{ store_width(BITS) }> as Storage>::widen(self.raw)
    }

    /// Construct from a whole number.
    #[inline]
    #[must_use]
    pub fn from_int(n: i64) -> Self {
        Self::from_wide(rescale(n as i128, 0, Self::EXP))
    }

    /// The value as a whole number, rounded under the active policy.
    #[inline]
    #[must_use]
    pub fn to_int(self) -> i64 {
        rescale(self.to_wide(), Self::EXP, 0) as i64
    }

    /// The value as a whole number on the widest native storage, for
    /// mantissas past 64 bits.
    #[inline]
    #[must_use]
    pub fn to_i128(self) -> i128 {
        rescale(self.to_wide(), Self::EXP, 0)
    }

    /// Construct from a float, rounding under the active policy.
    ///
    /// The input must lie in `[MIN, MAX]`; out-of-range values wrap in the
    /// mantissa without diagnostic (see the module docs).
    #[inline]
    #[must_use]
    pub fn from_f64(x: f64) -> Self {
        Self::from_wide(round_f64(x * pow2(-Self::EXP)))
    }

    #[inline]
    #[must_use]
    pub fn from_f32(x: f32) -> Self {
        Self::from_f64(x as f64)
    }

    /// The value as `f64`; exact while the mantissa fits in 53 bits.
    #[inline]
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.to_wide() as f64 * pow2(Self::EXP)
    }

    #[inline]
    #[must_use]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Rescale into another declared range.
    ///
    /// The caller owns domain overlap: no check is made that the current
    /// value fits the destination range.
    #[inline]
    #[must_use]
    pub fn convert<const MIN2: i128, const MAX2: i128, const BITS2: u32>(
        self,
    ) -> Fix<MIN2, MAX2, BITS2>
    where
        Width<{ store_width(BITS2) }>: Storage,
    {
        Fix::from_wide(rescale(
            self.to_wide(),
            Self::EXP,
            Fix::<MIN2, MAX2, BITS2>::EXP,
        ))
    }

    /// The whole part, truncated toward zero, in the same type.
    #[must_use]
    pub fn trunc(self) -> Self {
        if Self::EXP >= 0 {
            return self;
        }
        let frac_bits = Self::EXP.unsigned_abs();
        let wide = self.to_wide();
        let floored = wide & (!0 << frac_bits);
        // Masking truncates toward negative infinity; pull negative
        // non-integers back up one whole step.
        if wide < 0 && floored != wide {
            Self::from_wide(floored + (1 << frac_bits))
        } else {
            Self::from_wide(floored)
        }
    }

    /// The fractional part: the remainder against one, signed like `self`.
    #[must_use]
    pub fn fract(self) -> Fix<{ frac_lo(MIN) }, { frac_hi(MAX) }, BITS> {
        let wide = self.to_wide();
        let rem = if Self::EXP >= 0 {
            0
        } else {
            wide % (1 << Self::EXP.unsigned_abs())
        };
        let out_exp = exponent(frac_lo(MIN), frac_hi(MAX), BITS);
        Fix::from_wide(rescale(rem, Self::EXP, out_exp))
    }

    /// Absolute value. The sign test folds away whenever the declared
    /// range fixes the operand's sign.
    #[must_use]
    pub fn abs(self) -> Fix<0, { abs_limit(MIN, MAX) }, BITS> {
        let out_exp = exponent(0, abs_limit(MIN, MAX), BITS);
        let wide = self.to_wide();
        let mag = if MIN >= 0 {
            rescale(wide, Self::EXP, out_exp)
        } else if MAX <= 0 || wide < 0 {
            neg_rescaled(wide, Self::EXP, out_exp)
        } else {
            rescale(wide, Self::EXP, out_exp)
        };
        Fix::from_wide(mag)
    }
}

impl<const MIN: i128, const MAX: i128, const BITS: u32> core::fmt::Debug for Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}*2^{}", self.to_wide(), Self::EXP)
    }
}

#[cfg(feature = "defmt")]
impl<const MIN: i128, const MAX: i128, const BITS: u32> defmt::Format for Fix<MIN, MAX, BITS>
where
    Width<{ store_width(BITS) }>: Storage,
{
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=f64}", self.to_f64());
    }
}
