//! # Raised Errors
//!
//! A block under test can raise in two ways: it returns an `Err`, or it panics.
//! Both are captured into a single [`Raised`] value so that the checks in
//! [`crate::expect`] never need to care which channel an error arrived on.
//!
//! String panic payloads (`panic!("..")`, overflow, divide-by-zero, failed
//! `assert!`) become a [`PanicMessage`]. Payloads thrown with
//! [`std::panic::panic_any`] keep their concrete type and can be matched by
//! downcasting.

use std::{
    any::Any,
    error::Error,
    fmt,
    panic::{self, AssertUnwindSafe, Location},
};

use crate::{
    config::{self, ReportConfig},
    panic_hook,
};

/// Boxed error used for every error returned by a block.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

// ============================================================================
// OUTCOMES AND BLOCKS
// ============================================================================

/// The value a block evaluates to, reduced to "raised" or "not raised".
///
/// `Result<T, E>` is an outcome whenever `E: Into<BoxError>`, which covers
/// every `Error + Send + Sync` type, `Box<dyn Error + Send + Sync>`, `String`
/// and `&str`. A plain `Box<dyn Error>` is not `Send + Sync` and is rejected.
/// Map it to its message inside the block instead:
///
/// ```
/// use std::error::Error;
///
/// fn load() -> Result<u8, Box<dyn Error>> {
///     Ok("x".parse::<u8>()?)
/// }
///
/// raises::raises_with_message(
///     || load().map_err(|e| e.to_string()),
///     "invalid digit found in string",
/// );
/// ```
pub trait Outcome {
    /// Returns the raised error, or `None` when the block completed normally.
    fn into_raised(self) -> Option<Raised>;
}

impl Outcome for () {
    fn into_raised(self) -> Option<Raised> {
        None
    }
}

impl<T, E> Outcome for Result<T, E>
where
    E: Into<BoxError> + 'static,
{
    fn into_raised(self) -> Option<Raised> {
        match self {
            Ok(_) => None,
            Err(error) => Some(Raised::returned(error)),
        }
    }
}

/// A zero-argument callable under test, invoked exactly once.
pub trait Block: Sized {
    /// Invokes the block under the process-wide configuration.
    fn invoke(self) -> Option<Raised> {
        self.invoke_with(&config::config())
    }

    /// Invokes the block, catching any panic it raises.
    fn invoke_with(self, config: &ReportConfig) -> Option<Raised>;
}

impl<F, O> Block for F
where
    F: FnOnce() -> O,
    O: Outcome,
{
    fn invoke_with(self, config: &ReportConfig) -> Option<Raised> {
        capture_quietly(self, config.quiet_panics)
    }
}

/// Runs `block` once and returns what it raised, if anything.
pub fn capture<F, O>(block: F) -> Option<Raised>
where
    F: FnOnce() -> O,
    O: Outcome,
{
    capture_quietly(block, config::config().quiet_panics)
}

fn capture_quietly<F, O>(block: F, quiet: bool) -> Option<Raised>
where
    F: FnOnce() -> O,
    O: Outcome,
{
    let raised = match panic_hook::quietly(quiet, || panic::catch_unwind(AssertUnwindSafe(block))) {
        Ok(outcome) => outcome.into_raised(),
        Err(payload) => Some(Raised::panicked(payload, panic_hook::take_location())),
    };
    match &raised {
        Some(r) => tracing::debug!(kind = r.kind_name(), origin = %r.origin(), "block raised"),
        None => tracing::debug!("block completed without raising"),
    }
    raised
}

// ============================================================================
// RAISED
// ============================================================================

/// How a raised error left the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The block returned `Err(..)`.
    Returned,
    /// The block unwound with a panic.
    Panicked,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Returned => write!(f, "returned"),
            Origin::Panicked => write!(f, "panicked"),
        }
    }
}

enum Payload {
    Error(BoxError),
    Opaque(Box<dyn Any + Send>),
}

const OPAQUE_KIND: &str = "opaque panic payload";

/// An error captured from a block.
pub struct Raised {
    origin: Origin,
    kind: String,
    type_name: String,
    payload: Payload,
    location: Option<String>,
}

impl Raised {
    fn returned<E>(error: E) -> Self
    where
        E: Into<BoxError> + 'static,
    {
        let type_name = std::any::type_name::<E>();
        let error = error.into();
        // A boxed trait object hides the concrete type; its Debug form names it.
        let kind = if is_boxed_dyn(type_name) {
            debug_type_name(error.as_ref()).unwrap_or_else(|| short_type_name(type_name))
        } else {
            short_type_name(type_name)
        };
        Self {
            origin: Origin::Returned,
            kind,
            type_name: type_name.to_string(),
            payload: Payload::Error(error),
            location: None,
        }
    }

    pub(crate) fn panicked(payload: Box<dyn Any + Send>, location: Option<String>) -> Self {
        let (kind, type_name, payload) = match panic_text(payload) {
            Ok(message) => {
                let type_name = std::any::type_name::<PanicMessage>();
                (
                    short_type_name(type_name),
                    type_name.to_string(),
                    Payload::Error(Box::new(PanicMessage::new(message))),
                )
            }
            Err(opaque) => (
                OPAQUE_KIND.to_string(),
                OPAQUE_KIND.to_string(),
                Payload::Opaque(opaque),
            ),
        };
        Self {
            origin: Origin::Panicked,
            kind,
            type_name,
            payload,
            location,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Short type name of the raised error, e.g. `ParseIntError`.
    pub fn kind_name(&self) -> &str {
        &self.kind
    }

    /// Full type name of the raised error, e.g. `core::num::error::ParseIntError`.
    /// A boxed trait object keeps the name of the box.
    pub fn full_kind_name(&self) -> &str {
        &self.type_name
    }

    /// Source location of the panic, when the block panicked on this thread.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The error's `Display` output. `None` for opaque panic payloads.
    pub fn message(&self) -> Option<String> {
        match &self.payload {
            Payload::Error(error) => Some(error.to_string()),
            Payload::Opaque(_) => None,
        }
    }

    /// The raised error as a trait object, unless it is an opaque panic payload.
    pub fn as_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match &self.payload {
            Payload::Error(error) => Some(error.as_ref()),
            Payload::Opaque(_) => None,
        }
    }

    pub fn is<K: Error + 'static>(&self) -> bool {
        match &self.payload {
            Payload::Error(error) => error.is::<K>(),
            Payload::Opaque(payload) => payload.is::<K>(),
        }
    }

    /// Borrows the raised error as `K`.
    pub fn downcast_ref<K: Error + 'static>(&self) -> Option<&K> {
        match &self.payload {
            Payload::Error(error) => error.downcast_ref::<K>(),
            Payload::Opaque(payload) => payload.downcast_ref::<K>(),
        }
    }

    /// Takes the raised error as `K`, handing `self` back on a kind mismatch.
    pub fn downcast<K: Error + Send + Sync + 'static>(self) -> Result<K, Raised> {
        let Raised {
            origin,
            kind,
            type_name,
            payload,
            location,
        } = self;
        let payload = match payload {
            Payload::Error(error) => match error.downcast::<K>() {
                Ok(matched) => return Ok(*matched),
                Err(error) => Payload::Error(error),
            },
            Payload::Opaque(payload) => match payload.downcast::<K>() {
                Ok(matched) => return Ok(*matched),
                Err(payload) => Payload::Opaque(payload),
            },
        };
        Err(Raised {
            origin,
            kind,
            type_name,
            payload,
            location,
        })
    }

    /// Full diagnostic rendering: kind, origin, message, source chain, debug form
    /// and panic location.
    pub fn details(&self) -> String {
        let mut out = format!("{} ({})", self.kind, self.origin);
        match &self.payload {
            Payload::Error(error) => {
                out.push_str(&format!(": {error}"));
                let mut source = error.source();
                while let Some(cause) = source {
                    out.push_str(&format!("\n  caused by: {cause}"));
                    source = cause.source();
                }
                out.push_str(&format!("\n  debug: {error:?}"));
            }
            Payload::Opaque(_) => out.push_str(": <non-error panic payload>"),
        }
        if let Some(location) = &self.location {
            out.push_str(&format!("\n  at: {location}"));
        }
        out
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raised")
            .field("origin", &self.origin)
            .field("kind", &self.kind)
            .field("message", &self.message())
            .field("location", &self.location)
            .finish()
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None => write!(f, "{}", self.kind),
        }
    }
}

// ============================================================================
// PANIC MESSAGES
// ============================================================================

/// A panic raised with a string payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PanicMessage {
    pub message: String,
}

impl PanicMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Extracts the text of a `&str` or `String` panic payload.
pub(crate) fn panic_text(payload: Box<dyn Any + Send>) -> Result<String, Box<dyn Any + Send>> {
    match payload.downcast::<&'static str>() {
        Ok(text) => Ok((*text).to_string()),
        Err(payload) => payload.downcast::<String>().map(|text| *text),
    }
}

pub(crate) fn format_location(location: &Location<'_>) -> String {
    format!("{}:{}:{}", location.file(), location.line(), location.column())
}

/// Strips module paths from a type name: `core::num::error::ParseIntError`
/// becomes `ParseIntError`, generics included.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(last_path_segment(&segment));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(last_path_segment(&segment));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn is_boxed_dyn(type_name: &str) -> bool {
    type_name.starts_with("alloc::boxed::Box<dyn ")
}

/// Leading type identifier of an error's derived `Debug` output, e.g.
/// `ParseIntError` from `ParseIntError { kind: InvalidDigit }`.
fn debug_type_name(error: &(dyn Error + Send + Sync + 'static)) -> Option<String> {
    let debug = format!("{error:?}");
    let name: String = debug
        .chars()
        .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
        .collect();
    let rest = &debug[name.len()..];
    let starts_upper = name.chars().next().is_some_and(char::is_uppercase);
    let ends_cleanly = rest.is_empty() || rest.starts_with([' ', '(', '{']);
    (starts_upper && ends_cleanly).then_some(name)
}
