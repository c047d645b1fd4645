//! Error types for the timer driver

use core::ffi::c_int;
use core::fmt;

/// Implement common methods for kernel error enums.
///
/// Generates `as_c_int()`, `from_c_int()`, `is_success()`, and `is_error()` methods
/// for `#[repr(i32)]` error enums that follow the kernel's error convention.
macro_rules! impl_kernel_error {
    ($ty:ty, fallback: $fallback:ident, variants: { $($val:literal => $variant:ident),* $(,)? }) => {
        impl $ty {
            /// Convert to C-style integer for FFI returns.
            #[inline]
            pub fn as_c_int(self) -> c_int {
                self as c_int
            }

            /// Convert from C-style integer.
            #[inline]
            pub fn from_c_int(val: c_int) -> Self {
                match val {
                    $($val => Self::$variant,)*
                    _ => Self::$fallback,
                }
            }

            /// Check if this is a success result.
            #[inline]
            pub fn is_success(self) -> bool {
                matches!(self, Self::Success)
            }

            /// Check if this is an error result.
            #[inline]
            pub fn is_error(self) -> bool {
                !self.is_success()
            }
        }
    };
}

/// Timer operation result type
pub type TimerResult<T> = Result<T, TimerError>;

/// Errors returned by countdown programming and timer registration
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerError {
    /// Operation succeeded
    #[default]
    Success = 0,
    /// Frequency or delay outside what a 16-bit countdown can represent
    InvalidArgument = -1,
    /// Descriptor already carries a live id
    AlreadyRegistered = -2,
    /// The id counter has no values left
    IdsExhausted = -3,
    /// The tick interrupt line could not be claimed
    IrqUnavailable = -4,
    /// The system timer has not been brought up yet
    NotInitialized = -5,
}

impl_kernel_error!(TimerError, fallback: InvalidArgument, variants: {
    0 => Success,
    -1 => InvalidArgument,
    -2 => AlreadyRegistered,
    -3 => IdsExhausted,
    -4 => IrqUnavailable,
    -5 => NotInitialized,
});

/// IRQ line table operation result type
pub type IrqResult<T> = Result<T, IrqError>;

/// Errors returned by the IRQ line table
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IrqError {
    /// Operation succeeded
    #[default]
    Success = 0,
    /// Line number outside the legacy IRQ range
    InvalidLine = -1,
    /// Another handler already owns the line
    LineBusy = -2,
}

impl_kernel_error!(IrqError, fallback: InvalidLine, variants: {
    0 => Success,
    -1 => InvalidLine,
    -2 => LineBusy,
});

impl TimerError {
    /// Collapse a unit result into the C return convention (0 or negative code).
    #[inline]
    pub fn c_result(result: TimerResult<()>) -> c_int {
        match result {
            Ok(()) => Self::Success.as_c_int(),
            Err(err) => err.as_c_int(),
        }
    }
}

impl From<IrqError> for TimerError {
    fn from(_: IrqError) -> Self {
        Self::IrqUnavailable
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::InvalidArgument => "argument outside the countdown range",
            Self::AlreadyRegistered => "timer is already registered",
            Self::IdsExhausted => "timer ids exhausted",
            Self::IrqUnavailable => "tick interrupt line unavailable",
            Self::NotInitialized => "system timer not initialized",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn c_int_roundtrip() {
        for err in [
            TimerError::Success,
            TimerError::InvalidArgument,
            TimerError::AlreadyRegistered,
            TimerError::IdsExhausted,
            TimerError::IrqUnavailable,
            TimerError::NotInitialized,
        ] {
            assert_eq!(TimerError::from_c_int(err.as_c_int()), err);
        }
        assert_eq!(TimerError::from_c_int(-99), TimerError::InvalidArgument);
    }

    #[test]
    fn c_result_convention() {
        assert_eq!(TimerError::c_result(Ok(())), 0);
        assert_eq!(TimerError::c_result(Err(TimerError::AlreadyRegistered)), -2);
        assert!(TimerError::AlreadyRegistered.is_error());
        assert!(TimerError::Success.is_success());
    }

    #[test]
    fn irq_failures_map_to_one_timer_code() {
        assert_eq!(TimerError::from(IrqError::LineBusy), TimerError::IrqUnavailable);
        assert_eq!(TimerError::from(IrqError::InvalidLine).as_c_int(), -4);
    }

    #[test]
    fn display_names_the_failure() {
        assert_eq!(
            TimerError::AlreadyRegistered.to_string(),
            "timer is already registered"
        );
    }
}
