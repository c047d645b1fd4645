//! Shared ABI types for the PIT timer multiplexer.
//!
//! This crate is the single source of truth for the values that cross the
//! driver boundary:
//! - I/O port addresses and 8254 command-register layout
//! - Timer error codes (kernel `#[repr(i32)]` convention)
//!
//! Nothing in here touches hardware; it is plain data and arithmetic.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod arch;
pub mod error;

pub use error::*;
