//! Range-based fixed-point arithmetic for targets without an FPU
//!
//! Values are declared by their provable range and mantissa width; the
//! scaling exponent, the native storage, the widening around each operation
//! and the rounding at each narrowing are all derived at compile time. The
//! only runtime state is one two's-complement integer per value.
//!
//! - Native storage selection (`storage`)
//! - Exponent derivation from a range (`exponent`)
//! - Mantissa rescaling under the build-wide rounding policy (`rescale`)
//! - Result-range inference for the operators (`range`)
//! - The value type, its casts and derived views (`fix`)
//!
//! There are no runtime range checks anywhere in this crate. The declared
//! range is a proof obligation on the caller, and misuse costs precision
//! or wraps instead of panicking; that trade is the point of the design
//! and must not be "fixed" with guards.

#![no_std]
#![deny(unsafe_code)]
#![feature(generic_const_exprs)]
#![allow(incomplete_features)]

pub mod exponent;
pub mod fix;
mod ops;
pub mod range;
pub mod rescale;
pub mod storage;

pub use exponent::exponent;
pub use fix::{point, Fix, Point};
pub use rescale::{div_round, rescale, Rounding, ROUNDING};
