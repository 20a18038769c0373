//! Behavioural tests for the assertion entry points.
//!
//! The panicking entry points are exercised with `#[should_panic]`; the
//! `Expect::check` form is used wherever the failure itself is inspected.

use std::{cell::Cell, fmt};

use raises::{
    assert_raises, raises, raises_kind, raises_kind_satisfying, raises_kind_with_message,
    raises_with_message, Expect, Failure, Origin, PanicMessage, Raised,
};

#[derive(Debug, PartialEq)]
struct ArgumentError;

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "argument out of range")
    }
}

impl std::error::Error for ArgumentError {}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
struct FormatError(String);

#[derive(Debug, thiserror::Error)]
#[error("operation timed out after {retry_count} retries")]
struct TimeoutError {
    retry_count: u32,
}

fn boom(message: &str) {
    panic!("{message}")
}

fn throw<T: std::any::Any + Send>(payload: T) {
    std::panic::panic_any(payload)
}

fn parse_port(input: &str) -> Result<u16, FormatError> {
    input
        .parse()
        .map_err(|_| FormatError(format!("bad input: {input}")))
}

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn divide_by_zero_is_returned_by_raises() {
        let divisor = Cell::new(0);
        let raised = raises(|| {
            let _ = 10 / divisor.get();
        });
        assert_eq!(raised.origin(), Origin::Panicked);
        assert_eq!(raised.message().as_deref(), Some("attempt to divide by zero"));
        assert!(raised.is::<PanicMessage>());
    }

    #[test]
    #[should_panic(expected = "expected an error of kind `ArgumentError` but none was raised")]
    fn nothing_raised_for_a_kind() {
        raises_kind::<ArgumentError>(|| {});
    }

    #[test]
    fn wrong_message_reports_both_messages() {
        let failure = Expect::<FormatError>::new()
            .with_message("wrong input")
            .check(|| Err::<(), _>(FormatError("bad input".into())))
            .unwrap_err();
        match failure {
            Failure::MessageMismatch {
                expected,
                actual,
                details,
                ..
            } => {
                assert_eq!(expected, "wrong input");
                assert_eq!(actual.as_deref(), Some("bad input"));
                assert!(details.contains("FormatError (returned): bad input"));
            }
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn rejected_validator_reports_the_timeout_details() {
        let failure = Expect::<TimeoutError>::new()
            .satisfying(|e| e.retry_count == 3)
            .check(|| Err::<(), _>(TimeoutError { retry_count: 2 }))
            .unwrap_err();
        assert_eq!(failure.to_string(), "validator for expected error failed");
        let details = failure.details().unwrap();
        assert!(details.contains("TimeoutError"));
        assert!(details.contains("retry_count: 2"));
    }
}

#[cfg(test)]
mod properties {
    use super::*;

    #[test]
    fn every_variant_fails_when_nothing_is_raised() {
        let outcomes = [
            Expect::<Raised>::new().check(|| {}).map(|_| ()),
            Expect::<Raised>::new()
                .with_message("x")
                .check(|| Ok::<_, FormatError>(1))
                .map(|_| ()),
            Expect::<ArgumentError>::new().check(|| {}).map(|_| ()),
            Expect::<FormatError>::new()
                .with_message("x")
                .check(|| parse_port("80"))
                .map(|_| ()),
            Expect::<TimeoutError>::new()
                .satisfying(|_| true)
                .check(|| {})
                .map(|_| ()),
        ];
        for outcome in outcomes {
            assert!(matches!(outcome, Err(Failure::NothingRaised { .. })));
        }
    }

    #[test]
    fn matching_kind_is_returned_unchanged() {
        let err = raises_kind::<FormatError>(|| parse_port("http"));
        assert_eq!(err, FormatError("bad input: http".into()));
    }

    #[test]
    fn typed_panics_match_by_kind() {
        let err = raises_kind::<ArgumentError>(|| throw(ArgumentError));
        assert_eq!(err, ArgumentError);
    }

    #[test]
    fn kind_mismatch_cites_both_kinds_and_skips_later_checks() {
        let validated = Cell::new(false);
        let failure = Expect::<ArgumentError>::new()
            .with_message("argument out of range")
            .satisfying(|_| {
                validated.set(true);
                true
            })
            .check(|| parse_port("-1"))
            .unwrap_err();
        assert_eq!(
            failure.to_string(),
            "expected an error of kind `ArgumentError` but `FormatError` was raised instead"
        );
        assert!(failure.details().unwrap().contains("bad input: -1"));
        assert!(!validated.get());
    }

    #[test]
    fn same_named_kinds_are_told_apart() {
        let failure = Expect::<std::io::Error>::new()
            .check(|| Err::<(), _>(fmt::Error))
            .unwrap_err();
        let headline = failure.to_string();
        assert!(headline.contains("io::error::Error"), "{headline}");
        assert!(headline.contains("fmt::Error"), "{headline}");
    }

    #[test]
    fn boxed_errors_report_their_concrete_kind() {
        let failure = Expect::<ArgumentError>::new()
            .check(|| -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
                Ok(parse_port("x")?)
            })
            .unwrap_err();
        assert_eq!(
            failure.to_string(),
            "expected an error of kind `ArgumentError` but `FormatError` was raised instead"
        );
    }

    #[test]
    fn non_thread_safe_boxed_errors_are_checked_by_message() {
        fn load() -> Result<u16, Box<dyn std::error::Error>> {
            Ok(parse_port("ftp")?)
        }
        let raised = raises_with_message(|| load().map_err(|e| e.to_string()), "bad input: ftp");
        assert_eq!(raised.origin(), Origin::Returned);
    }

    #[test]
    fn equal_messages_pass() {
        let err = raises_kind_with_message::<FormatError>(|| parse_port("x"), "bad input: x");
        assert_eq!(err.0, "bad input: x");
        let raised = raises_with_message(|| boom("exact"), "exact");
        assert_eq!(raised.origin(), Origin::Panicked);
    }

    #[test]
    fn message_comparison_is_case_sensitive() {
        let failure = Expect::<Raised>::new()
            .with_message("Exact")
            .check(|| boom("exact"))
            .unwrap_err();
        assert!(matches!(failure, Failure::MessageMismatch { .. }));
    }

    #[test]
    fn accepting_validator_returns_the_error() {
        let err = raises_kind_satisfying::<TimeoutError>(
            || Err::<(), _>(TimeoutError { retry_count: 3 }),
            |e| e.retry_count == 3,
        );
        assert_eq!(err.retry_count, 3);
    }

    #[test]
    fn panicking_validator_is_a_distinct_failure() {
        let failure = Expect::<TimeoutError>::new()
            .satisfying(|e| {
                assert_eq!(e.retry_count, 3, "retry count");
                true
            })
            .check(|| Err::<(), _>(TimeoutError { retry_count: 1 }))
            .unwrap_err();
        match failure {
            Failure::ValidatorPanicked {
                message,
                validator,
                details,
            } => {
                assert!(message.contains("retry count"));
                assert!(validator.contains("PanicMessage (panicked)"));
                assert!(details.contains("operation timed out after 1 retries"));
            }
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn repeated_calls_yield_the_same_outcome_class() {
        let run = || {
            Expect::<FormatError>::new()
                .with_message("bad input: q")
                .check(|| parse_port("q"))
                .is_ok()
        };
        assert!(run());
        assert_eq!(run(), run());
    }

    #[test]
    fn block_runs_exactly_once() {
        let calls = Cell::new(0);
        raises(|| {
            calls.set(calls.get() + 1);
            parse_port("once")
        });
        assert_eq!(calls.get(), 1);
    }
}

#[cfg(test)]
mod panicking_entry_points {
    use super::*;

    #[test]
    #[should_panic(expected = "expected an error of kind `FormatError` but `PanicMessage` was raised instead")]
    fn kind_mismatch_fails_the_test() {
        raises_kind::<FormatError>(|| boom("not a format error"));
    }

    #[test]
    #[should_panic(expected = "validator panicked during evaluation")]
    fn panicking_validator_fails_the_test() {
        raises_kind_satisfying::<FormatError>(|| parse_port("z"), |_| panic!("broken validator"));
    }

    #[test]
    #[should_panic(expected = "but the message was \"bad input: y\"")]
    fn macro_message_mismatch_fails_the_test() {
        assert_raises!(parse_port("y"), FormatError, "bad input: z");
    }

    #[test]
    fn macro_validator_form() {
        let err = assert_raises!(parse_port("99999"), FormatError, |e: &FormatError| e
            .0
            .ends_with("99999"));
        assert_eq!(err.0, "bad input: 99999");
    }
}
