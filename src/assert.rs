//! # Assertion Entry Points
//!
//! Thin wrappers over [`Expect`]. Each one runs the block exactly once and
//! either hands back the raised error or fails the current test with a
//! rendered report.
//!
//! | Function                      | Kind        | Extra check        |
//! |-------------------------------|-------------|--------------------|
//! | [`raises`]                    | any         | none               |
//! | [`raises_with_message`]       | any         | exact message      |
//! | [`raises_kind`]               | `K`         | none               |
//! | [`raises_kind_with_message`]  | `K`         | exact message      |
//! | [`raises_kind_satisfying`]    | `K`         | validator          |

use crate::{
    config::{self, ReportConfig},
    expect::Expect,
    failure::{render, Failure},
    kind::ErrorKind,
    raised::{Block, Raised},
};

/// Fails the current test with a rendered report of `failure`.
#[track_caller]
pub fn fail(failure: Failure) -> ! {
    fail_with(failure, &config::config())
}

#[track_caller]
pub(crate) fn fail_with(failure: Failure, config: &ReportConfig) -> ! {
    let report = render(&failure, config);
    panic!("{report}")
}

/// Asserts that `block` raises any error, and returns it.
///
/// ```
/// let raised = raises::raises(|| "nope".parse::<f64>());
/// assert_eq!(raised.kind_name(), "ParseFloatError");
/// ```
#[track_caller]
pub fn raises(block: impl Block) -> Raised {
    Expect::<Raised>::new().run(block)
}

/// Asserts that `block` raises any error whose message is exactly `message`.
#[track_caller]
pub fn raises_with_message(block: impl Block, message: impl Into<String>) -> Raised {
    Expect::<Raised>::new().with_message(message).run(block)
}

/// Asserts that `block` raises an error of kind `K`, and returns it.
#[track_caller]
pub fn raises_kind<K: ErrorKind>(block: impl Block) -> K {
    Expect::<K>::new().run(block)
}

/// Asserts that `block` raises an error of kind `K` whose message is exactly `message`.
#[track_caller]
pub fn raises_kind_with_message<K: ErrorKind>(block: impl Block, message: impl Into<String>) -> K {
    Expect::<K>::new().with_message(message).run(block)
}

/// Asserts that `block` raises an error of kind `K` for which `validator` returns `true`.
#[track_caller]
pub fn raises_kind_satisfying<K: ErrorKind>(
    block: impl Block,
    validator: impl FnOnce(&K) -> bool,
) -> K {
    Expect::<K>::new().satisfying(validator).run(block)
}

/// Asserts that an expression raises, optionally of a kind, with a message or
/// satisfying a predicate. Evaluates to the raised error.
///
/// ```
/// use std::num::ParseIntError;
///
/// raises::assert_raises!("x".parse::<u8>());
/// raises::assert_raises!("x".parse::<u8>(), ParseIntError);
/// raises::assert_raises!("x".parse::<u8>(), ParseIntError, "invalid digit found in string");
/// raises::assert_raises!("".parse::<u8>(), ParseIntError, |e| e.to_string().contains("empty"));
/// ```
///
/// A bare third argument is taken as the expected message only when it is a
/// string literal. Anything else, such as `&msg`, is treated as a validator
/// and fails to type-check. Pass a computed message with `message = ..`, or
/// call [`raises_kind_with_message`] directly:
///
/// ```
/// use std::num::ParseIntError;
///
/// let msg = format!("invalid digit found in {}", "string");
/// raises::assert_raises!("x".parse::<u8>(), ParseIntError, message = &msg);
/// raises::raises_kind_with_message::<ParseIntError>(|| "x".parse::<u8>(), &msg);
/// ```
#[macro_export]
macro_rules! assert_raises {
    ($expr:expr) => {
        $crate::raises(|| $expr)
    };
    ($expr:expr, $kind:ty) => {
        $crate::raises_kind::<$kind>(|| $expr)
    };
    ($expr:expr, $kind:ty, message = $message:expr) => {
        $crate::raises_kind_with_message::<$kind>(|| $expr, $message)
    };
    ($expr:expr, $kind:ty, $message:literal) => {
        $crate::raises_kind_with_message::<$kind>(|| $expr, $message)
    };
    ($expr:expr, $kind:ty, $validator:expr) => {
        $crate::raises_kind_satisfying::<$kind>(|| $expr, $validator)
    };
}
