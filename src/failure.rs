//! # Failures
//!
//! Every way an expectation can go unmet is a variant of [`Failure`]. Each
//! carries the expected and actual state plus the full details of the raised
//! error, and renders as a miette diagnostic.

use difference::{Changeset, Difference};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NarratableReportHandler};
use thiserror::Error;

use crate::config::{ReportConfig, Theme};

#[derive(Debug, Error)]
pub enum Failure {
    #[error("expected {expected} but none was raised")]
    NothingRaised { expected: String },

    #[error("expected an error of kind `{expected}` but `{actual}` was raised instead")]
    KindMismatch {
        expected: String,
        actual: String,
        details: String,
    },

    #[error(
        "expected an error with message {expected:?} but the message was {}",
        display_actual(.actual)
    )]
    MessageMismatch {
        expected: String,
        actual: Option<String>,
        diff: Option<String>,
        details: String,
    },

    #[error("validator for expected error failed")]
    ValidatorRejected { details: String },

    #[error("validator panicked during evaluation: {message}")]
    ValidatorPanicked {
        message: String,
        validator: String,
        details: String,
    },
}

fn display_actual(actual: &Option<String>) -> String {
    match actual {
        Some(message) => format!("{message:?}"),
        None => "not a string".to_string(),
    }
}

impl Failure {
    /// Details of the raised error, when one was raised.
    pub fn details(&self) -> Option<&str> {
        match self {
            Failure::NothingRaised { .. } => None,
            Failure::KindMismatch { details, .. }
            | Failure::MessageMismatch { details, .. }
            | Failure::ValidatorRejected { details }
            | Failure::ValidatorPanicked { details, .. } => Some(details),
        }
    }

    fn code_str(&self) -> &'static str {
        match self {
            Failure::NothingRaised { .. } => "raises::nothing_raised",
            Failure::KindMismatch { .. } => "raises::kind_mismatch",
            Failure::MessageMismatch { .. } => "raises::message_mismatch",
            Failure::ValidatorRejected { .. } => "raises::validator_rejected",
            Failure::ValidatorPanicked { .. } => "raises::validator_panicked",
        }
    }

    fn help_text(&self) -> Option<String> {
        let details = self.details()?;
        let mut help = String::new();
        if let Failure::MessageMismatch {
            diff: Some(diff), ..
        } = self
        {
            help.push_str(&format!("message diff: {diff}\n"));
        }
        if let Failure::ValidatorPanicked { validator, .. } = self {
            help.push_str(&format!("validator error details: {validator}\n"));
        }
        help.push_str(&format!("actual error details: {details}"));
        Some(help)
    }
}

impl Diagnostic for Failure {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help_text()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }
}

/// Inline character diff: removed text as `[-..-]`, added text as `{+..+}`.
pub fn message_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "");
    let mut out = String::new();
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(x) => out.push_str(x),
            Difference::Rem(x) => out.push_str(&format!("[-{x}-]")),
            Difference::Add(x) => out.push_str(&format!("{{+{x}+}}")),
        }
    }
    out
}

/// Renders a failure report with the configured theme. Lines are never
/// wrapped, so messages and details appear exactly as raised.
pub fn render(failure: &Failure, config: &ReportConfig) -> String {
    let mut out = String::new();
    let rendered = match config.theme {
        Theme::Unicode => GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_width(config.width)
            .with_wrap_lines(false)
            .render_report(&mut out, failure),
        Theme::Ascii => GraphicalReportHandler::new_themed(GraphicalTheme::ascii())
            .with_width(config.width)
            .with_wrap_lines(false)
            .render_report(&mut out, failure),
        Theme::Plain => NarratableReportHandler::new().render_report(&mut out, failure),
    };
    match rendered {
        Ok(()) => out,
        Err(_) => match failure.help_text() {
            Some(help) => format!("{failure}\n{help}"),
            None => failure.to_string(),
        },
    }
}
