// src/os/signal.rs

//! SIGINT/SIGTERM handling for cooperative shutdown.
//!
//! The first signal only raises a flag that the monitor loop and the stream
//! buffer check between reads. A second signal while the flag is already set
//! terminates the process on the spot, for reads that never return.

use anyhow::{Context, Result};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static REQUESTED: OnceLock<Arc<AtomicBool>> = OnceLock::new();

const ABORT_MESSAGE: &[u8] = b"\nAborted by keyboard\n";

extern "C" fn on_signal(_signal: libc::c_int) {
    let Some(flag) = REQUESTED.get() else {
        return;
    };
    if flag.swap(true, Ordering::SeqCst) {
        // Only async-signal-safe calls from here on.
        unsafe {
            libc::write(
                libc::STDERR_FILENO,
                ABORT_MESSAGE.as_ptr().cast(),
                ABORT_MESSAGE.len(),
            );
            libc::_exit(0);
        }
    }
}

/// Shared "please stop" flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// A flag not connected to any signal.
    pub fn new() -> Self {
        ShutdownFlag::default()
    }

    /// Installs the SIGINT and SIGTERM handlers and returns the flag they set.
    ///
    /// Handlers are installed without `SA_RESTART`, so a blocked read returns
    /// `EINTR` and the stream notices the request right away.
    pub fn install() -> Result<Self> {
        let flag = Arc::clone(REQUESTED.get_or_init(|| Arc::new(AtomicBool::new(false))));
        let action = SigAction::new(
            SigHandler::Handler(on_signal),
            SaFlags::empty(),
            SigSet::empty(),
        );
        for signal in [Signal::SIGINT, Signal::SIGTERM] {
            // SAFETY: the handler only touches atomics and async-signal-safe libc calls.
            unsafe { sigaction(signal, &action) }
                .with_context(|| format!("Failed to install {:?} handler", signal))?;
        }
        log::debug!("Shutdown handlers installed for SIGINT and SIGTERM");
        Ok(ShutdownFlag { flag })
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The underlying atomic, for [`StreamBuffer::with_shutdown`](crate::decoder::StreamBuffer::with_shutdown).
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    #[test_log::test]
    fn test_manual_request() {
        let flag = ShutdownFlag::new();
        let handle = flag.handle();
        assert!(!flag.is_requested());
        flag.request();
        assert!(handle.load(Ordering::SeqCst));
    }

    // Raises a real signal once; a second one would end the test process.
    #[test_log::test]
    fn test_first_signal_sets_flag() {
        let flag = ShutdownFlag::install().unwrap();
        assert!(!flag.is_requested());
        raise(Signal::SIGTERM).unwrap();
        assert!(flag.is_requested());
    }
}
