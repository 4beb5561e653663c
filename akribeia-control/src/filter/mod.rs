//! Signal conditioning filters
//!
//! Sensor inputs arrive noisy; these filters trade latency for stability
//! without leaving integer math.

pub mod ema;
pub mod fir;
pub mod median;

pub use ema::Ema;
pub use fir::Fir;
pub use median::Median;
