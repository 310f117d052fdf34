//! Ctrl-C handling for long batch operations.
//!
//! Batch loops (CSV import) poll a [`StopSignal`] between items so an
//! interrupt finishes the current row and leaves the database consistent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag, set from SIGINT/SIGTERM once installed.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a flag and register it for SIGINT and SIGTERM.
    pub fn install() -> std::io::Result<Self> {
        let signal = Self::default();
        for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
            signal_hook::flag::register(sig, Arc::clone(&signal.flag))?;
        }
        Ok(signal)
    }

    /// Whether a stop was requested.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Request a stop (also used by tests).
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}
