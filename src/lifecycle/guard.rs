//! Process-wide fault guard.
//!
//! The bootstrap sequence returns its failures as values; this hook is the
//! last-resort boundary for everything else. A panic on any thread, including
//! tokio workers running unrelated background tasks, is rendered to a string
//! and routed through [`fatal_error`], which terminates the process.

use std::any::Any;
use std::panic::{self, Location};
use std::sync::Once;

use crate::lifecycle::fatal::fatal_error;

static INSTALL: Once = Once::new();

/// Register the panic hook. Later calls are no-ops.
pub fn install() {
    INSTALL.call_once(|| {
        panic::set_hook(Box::new(|info| {
            fatal_error(describe_panic(info.payload(), info.location()))
        }));
    });
}

/// Render a panic payload and its location.
pub fn describe_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> String {
    let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    };

    match location {
        Some(location) => format!("Unhandled fault at {}: {}", location, message),
        None => format!("Unhandled fault: {}", message),
    }
}
