//! Control and filtering blocks on range-typed fixed point
//!
//! This crate provides integer-only building blocks for control loops on
//! targets without an FPU, all expressed over the range-typed values from
//! `akribeia-fix`:
//!
//! - Signal conditioning filters (EMA, FIR, median)
//! - PID controller with windup clamp and deadband

#![no_std]
#![deny(unsafe_code)]
#![feature(generic_const_exprs)]
#![allow(incomplete_features)]

pub mod filter;
pub mod pid;
