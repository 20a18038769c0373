//! Panic hook filtering for blocks under test.
//!
//! The default hook prints every panic to stderr, including the ones a block is
//! *expected* to raise. A filtering hook is installed once per process. It only
//! acts on the thread that is currently running a block: it records the panic
//! location there and, when asked to be quiet, swallows the output. Panics on
//! every other thread go to the previously installed hook.

use std::{
    cell::{Cell, RefCell},
    panic,
    sync::Once,
};

use crate::raised::format_location;

static INSTALL: Once = Once::new();

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static QUIET: Cell<bool> = const { Cell::new(true) };
    static LAST_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CAPTURING.with(Cell::get) {
                previous(info);
                return;
            }
            LAST_LOCATION.with(|slot| {
                *slot.borrow_mut() = info.location().map(format_location);
            });
            if !QUIET.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

struct Restore {
    capturing: bool,
    quiet: bool,
}

impl Drop for Restore {
    fn drop(&mut self) {
        CAPTURING.with(|flag| flag.set(self.capturing));
        QUIET.with(|flag| flag.set(self.quiet));
    }
}

/// Runs `f` with this thread marked as capturing panics. With `quiet` set,
/// panics raised by `f` are not passed on to the previous hook.
pub(crate) fn quietly<R>(quiet: bool, f: impl FnOnce() -> R) -> R {
    install();
    LAST_LOCATION.with(|slot| *slot.borrow_mut() = None);
    let _restore = Restore {
        capturing: CAPTURING.with(|flag| flag.replace(true)),
        quiet: QUIET.with(|flag| flag.replace(quiet)),
    };
    f()
}

/// Location recorded for the most recent panic captured on this thread.
pub(crate) fn take_location() -> Option<String> {
    LAST_LOCATION.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_the_location_of_a_captured_panic() {
        let result = quietly(true, || panic::catch_unwind(|| panic!("expected")));
        assert!(result.is_err());
        let location = take_location().expect("location recorded");
        assert!(location.contains("panic_hook.rs"));
        assert!(take_location().is_none());
    }

    #[test]
    fn capturing_flag_is_restored() {
        quietly(false, || {
            assert!(CAPTURING.with(Cell::get));
            assert!(!QUIET.with(Cell::get));
        });
        assert!(!CAPTURING.with(Cell::get));
        assert!(QUIET.with(Cell::get));
    }
}
