//! Assertion helpers for tests that expect a block of code to fail.
//!
//! A block raises either by returning `Err(..)` or by panicking. The helpers
//! run the block once, check what it raised against an optional kind, message
//! and validator, and hand the error back. On a mismatch the current test fails
//! with a report that names the expected and actual state.
//!
//! ```
//! use std::num::ParseIntError;
//!
//! let err = raises::raises_kind::<ParseIntError>(|| "4x".parse::<u16>());
//! assert_eq!(err.to_string(), "invalid digit found in string");
//!
//! let panic = raises::raises(|| {
//!     let zero = "0".parse::<i32>().unwrap();
//!     let _ = 1 / zero;
//! });
//! assert_eq!(panic.message().as_deref(), Some("attempt to divide by zero"));
//! ```

pub use crate::assert::{
    fail, raises, raises_kind, raises_kind_satisfying, raises_kind_with_message,
    raises_with_message,
};
pub use crate::config::{config, configure, ReportConfig, Theme};
pub use crate::expect::Expect;
pub use crate::failure::Failure;
pub use crate::kind::ErrorKind;
pub use crate::raised::{capture, Block, Origin, Outcome, PanicMessage, Raised};

pub mod assert;
pub mod config;
pub mod expect;
pub mod failure;
pub mod kind;
pub mod raised;

mod panic_hook;
