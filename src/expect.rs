//! # Expectations
//!
//! [`Expect`] is the one evaluation routine behind every entry point in
//! [`crate::assert`]. Each optional field narrows what counts as a pass:
//!
//! 1. the block must raise;
//! 2. the raised error must be of kind `K` (downcast);
//! 3. its message must equal the expected message exactly;
//! 4. the validator must return `true` without panicking.
//!
//! Checks run in that order and stop at the first miss, so the message and
//! validator never see an error of the wrong kind.

use std::panic::{self, AssertUnwindSafe};

use crate::{
    assert::fail_with,
    config::{self, ReportConfig},
    failure::{message_diff, Failure},
    kind::ErrorKind,
    panic_hook,
    raised::{Block, Raised},
};

type Validator<'v, K> = Box<dyn FnOnce(&K) -> bool + 'v>;

/// Expectations for the error a block raises.
///
/// ```
/// use raises::Expect;
///
/// let err = Expect::<std::num::ParseIntError>::new()
///     .with_message("invalid digit found in string")
///     .run(|| "x1".parse::<u32>());
/// assert_eq!(err.to_string(), "invalid digit found in string");
/// ```
pub struct Expect<'v, K: ErrorKind = Raised> {
    message: Option<String>,
    validator: Option<Validator<'v, K>>,
    config: Option<ReportConfig>,
}

impl<'v, K: ErrorKind> Default for Expect<'v, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'v, K: ErrorKind> std::fmt::Debug for Expect<'v, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expect")
            .field("kind", &K::kind_name())
            .field("message", &self.message)
            .field("validator", &self.validator.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<'v, K: ErrorKind> Expect<'v, K> {
    pub fn new() -> Self {
        Self {
            message: None,
            validator: None,
            config: None,
        }
    }

    /// Requires the error's message to equal `message` exactly.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Requires `validator` to return `true` for the matched error.
    pub fn satisfying(mut self, validator: impl FnOnce(&K) -> bool + 'v) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Uses `config` instead of the process-wide configuration.
    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Runs the block and returns the matched error, or the reason it did not match.
    pub fn check(self, block: impl Block) -> Result<K, Failure> {
        let config = self.config.clone().unwrap_or_else(config::config);
        self.check_with(block, &config)
    }

    /// Like [`Expect::check`], but reports a failure by panicking.
    #[track_caller]
    pub fn run(self, block: impl Block) -> K {
        let config = self.config.clone().unwrap_or_else(config::config);
        match self.check_with(block, &config) {
            Ok(matched) => matched,
            Err(failure) => fail_with(failure, &config),
        }
    }

    fn check_with(self, block: impl Block, config: &ReportConfig) -> Result<K, Failure> {
        let result = self.evaluate(block, config);
        match &result {
            Ok(_) => tracing::debug!(kind = %K::kind_name(), "expectation met"),
            Err(failure) => tracing::debug!(kind = %K::kind_name(), %failure, "expectation failed"),
        }
        result
    }

    fn evaluate(self, block: impl Block, config: &ReportConfig) -> Result<K, Failure> {
        let Some(raised) = block.invoke_with(config) else {
            return Err(Failure::NothingRaised {
                expected: K::expectation(),
            });
        };

        let details = raised.details();
        let (expected_kind, actual_kind) = if K::kind_name() == raised.kind_name() {
            (K::full_kind_name(), raised.full_kind_name().to_string())
        } else {
            (K::kind_name(), raised.kind_name().to_string())
        };
        let matched = K::extract(raised).map_err(|_| Failure::KindMismatch {
            expected: expected_kind,
            actual: actual_kind,
            details: details.clone(),
        })?;

        if let Some(expected) = self.message {
            let actual = matched.message();
            if actual.as_deref() != Some(expected.as_str()) {
                let diff = match &actual {
                    Some(actual) if config.show_diff => {
                        Some(message_diff(&expected, actual))
                    }
                    _ => None,
                };
                return Err(Failure::MessageMismatch {
                    expected,
                    actual,
                    diff,
                    details,
                });
            }
        }

        if let Some(validator) = self.validator {
            let verdict = panic_hook::quietly(config.quiet_panics, || {
                panic::catch_unwind(AssertUnwindSafe(|| validator(&matched)))
            });
            match verdict {
                Ok(true) => {}
                Ok(false) => return Err(Failure::ValidatorRejected { details }),
                Err(payload) => {
                    let location = panic_hook::take_location();
                    let validator = Raised::panicked(payload, location);
                    return Err(Failure::ValidatorPanicked {
                        message: validator
                            .message()
                            .unwrap_or_else(|| validator.kind_name().to_string()),
                        validator: validator.details(),
                        details,
                    });
                }
            }
        }

        Ok(matched)
    }
}
