use crate::error::{Md2ProjectError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ctrl+C flag checked between files. The first press asks the run to stop
/// after the current file; the second exits immediately.
pub struct GracefulShutdown {
    running: Arc<AtomicBool>,
    shutdown_message_shown: Arc<AtomicBool>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown_message_shown = Arc::new(AtomicBool::new(false));

        let running_clone = running.clone();
        let message_shown_clone = shutdown_message_shown.clone();

        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);

            if !message_shown_clone.swap(true, Ordering::SeqCst) {
                eprintln!("\n🛑 Stopping after the current file... (press Ctrl+C again to force exit)");
            } else {
                eprintln!("\n💀 Force stopping...");
                std::process::exit(130);
            }
        })
        .map_err(|e| Md2ProjectError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self {
            running,
            shutdown_message_shown,
        })
    }

    /// No signal handler is registered.
    pub fn new_for_test() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            shutdown_message_shown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(Md2ProjectError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn with_shutdown_check<F, R>(&self, operation: F) -> Result<R>
    where
        F: FnOnce() -> Result<R>,
    {
        self.check_shutdown()?;
        let result = operation()?;
        self.check_shutdown()?;
        Ok(result)
    }
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        // the handler can be installed once per process
        Self::new().unwrap_or_else(|err| {
            log::debug!("signal handler unavailable: {}", err);
            Self::new_for_test()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_state_management() {
        let shutdown = GracefulShutdown::new_for_test();

        assert!(shutdown.is_running());
        assert!(shutdown.check_shutdown().is_ok());

        shutdown.request_shutdown();
        assert!(!shutdown.is_running());
        assert!(matches!(
            shutdown.check_shutdown(),
            Err(Md2ProjectError::Cancelled)
        ));
    }

    #[test]
    fn test_default_is_running() {
        let shutdown = GracefulShutdown::default();
        assert!(shutdown.is_running());
    }

    #[test]
    fn test_with_shutdown_check() {
        let shutdown = GracefulShutdown::new_for_test();

        assert_eq!(shutdown.with_shutdown_check(|| Ok(42)).unwrap(), 42);

        shutdown.request_shutdown();
        let result = shutdown.with_shutdown_check(|| Ok(42));
        assert!(matches!(result, Err(Md2ProjectError::Cancelled)));
    }
}
