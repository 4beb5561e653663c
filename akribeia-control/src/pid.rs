//! PID controller on range-typed fixed point
//!
//! Proportional-integral-derivative control with scaled-integer gains and
//! integer-only math throughout. The error, integral and derivative terms
//! stay on the input's mantissa scale; one rescale moves the weighted sum
//! onto the output's scale.

use akribeia_fix::storage::{store_width, Storage, Width};
use akribeia_fix::{div_round, rescale, Fix};

/// PID gains in thousandths (`1500` is a gain of `1.5`).
///
/// Thousandths match the resolution configuration files usually carry and
/// avoid a float parse on the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gains {
    pub kp_x1000: i32,
    pub ki_x1000: i32,
    pub kd_x1000: i32,
}

impl Gains {
    pub const fn new(kp_x1000: i32, ki_x1000: i32, kd_x1000: i32) -> Self {
        Self {
            kp_x1000,
            ki_x1000,
            kd_x1000,
        }
    }

    /// Check if any gain is non-zero.
    pub fn is_configured(&self) -> bool {
        self.kp_x1000 != 0 || self.ki_x1000 != 0 || self.kd_x1000 != 0
    }
}

/// PID controller configuration.
#[derive(Debug, Clone, Copy)]
pub struct PidConfig<const MIN: i128, const MAX: i128, const BITS: u32>
where
    Width<{ store_width(BITS) }>: Storage,
{
    pub gains: Gains,
    /// Integral magnitude clamp, in input units.
    ///
    /// Keeps the integral term from growing without bound while the plant
    /// cannot reach the target.
    pub integral_limit: Fix<MIN, MAX, BITS>,
    /// Errors at or below this magnitude count as zero, to reduce hunting
    /// around the target.
    pub deadband: Fix<MIN, MAX, BITS>,
}

/// PID controller mapping a measured input range onto an actuator output
/// range. Both ends are declared ranges, so the output clamp costs two
/// compares on raw mantissas.
pub struct Pid<
    const MIN: i128,
    const MAX: i128,
    const BITS: u32,
    const OUT_MIN: i128,
    const OUT_MAX: i128,
    const OUT_BITS: u32,
> where
    Width<{ store_width(BITS) }>: Storage,
    Width<{ store_width(OUT_BITS) }>: Storage,
{
    config: PidConfig<MIN, MAX, BITS>,
    setpoint: Fix<MIN, MAX, BITS>,
    /// Accumulated error on the input mantissa scale.
    integral: i128,
    prev_error: Option<i128>,
}

impl<
        const MIN: i128,
        const MAX: i128,
        const BITS: u32,
        const OUT_MIN: i128,
        const OUT_MAX: i128,
        const OUT_BITS: u32,
    > Pid<MIN, MAX, BITS, OUT_MIN, OUT_MAX, OUT_BITS>
where
    Width<{ store_width(BITS) }>: Storage,
    Width<{ store_width(OUT_BITS) }>: Storage,
{
    pub fn new(config: PidConfig<MIN, MAX, BITS>, setpoint: Fix<MIN, MAX, BITS>) -> Self {
        Self {
            config,
            setpoint,
            integral: 0,
            prev_error: None,
        }
    }

    /// Update the gains.
    ///
    /// Resets internal state to prevent a stale integral from acting under
    /// the new weights.
    pub fn set_gains(&mut self, gains: Gains) {
        self.config.gains = gains;
        self.reset();
    }

    pub fn gains(&self) -> &Gains {
        &self.config.gains
    }

    /// Change the target without touching the accumulated state.
    pub fn set_target(&mut self, setpoint: Fix<MIN, MAX, BITS>) {
        self.setpoint = setpoint;
    }

    pub fn target(&self) -> Fix<MIN, MAX, BITS> {
        self.setpoint
    }

    /// Clear the integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0;
        self.prev_error = None;
    }

    /// Feed one measurement and produce the actuator command.
    ///
    /// Call at a fixed rate; the gains absorb the loop period.
    pub fn update(&mut self, measurement: Fix<MIN, MAX, BITS>) -> Fix<OUT_MIN, OUT_MAX, OUT_BITS> {
        // Setpoint and measurement share one type, so the error is a plain
        // mantissa difference.
        let mut error = self.setpoint.to_wide() - measurement.to_wide();
        if error.unsigned_abs() <= self.config.deadband.to_wide().unsigned_abs() {
            error = 0;
        }

        let limit = self.config.integral_limit.to_wide().unsigned_abs() as i128;
        self.integral = (self.integral + error).clamp(-limit, limit);

        let derivative = error - self.prev_error.unwrap_or(error);
        self.prev_error = Some(error);

        // Weighted sum on the input scale, carrying the x1000 gain factor.
        let gains = &self.config.gains;
        let sum = gains.kp_x1000 as i128 * error
            + gains.ki_x1000 as i128 * self.integral
            + gains.kd_x1000 as i128 * derivative;

        let in_exp = Fix::<MIN, MAX, BITS>::EXP;
        let out_exp = Fix::<OUT_MIN, OUT_MAX, OUT_BITS>::EXP;
        let raw = div_round(rescale(sum, in_exp, out_exp), 1000);

        let lo = rescale(OUT_MIN, 0, out_exp);
        let hi = rescale(OUT_MAX, 0, out_exp);
        Fix::from_wide(raw.clamp(lo, hi))
    }
}
