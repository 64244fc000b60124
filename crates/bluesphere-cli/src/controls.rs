//! Signals shared between the tracking loop and the input threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Runtime controls raised by Ctrl+C and the keyboard monitor.
///
/// The tracking loop sleeps through [`Controls::wait`], so a shutdown
/// request ends the sleep immediately instead of after a full poll interval.
pub struct Controls {
    shutdown: Mutex<bool>,
    wakeup: Condvar,
    ring_link_toggle: AtomicBool,
}

impl Controls {
    pub fn new() -> Self {
        Self {
            shutdown: Mutex::new(false),
            wakeup: Condvar::new(),
            ring_link_toggle: AtomicBool::new(false),
        }
    }

    /// Request shutdown and wake every waiting thread
    pub fn shutdown(&self) {
        if let Ok(mut flag) = self.shutdown.lock() {
            *flag = true;
        }
        self.wakeup.notify_all();
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        // A poisoned lock means a thread panicked mid-update; stop in that case too
        self.shutdown.lock().map_or(true, |flag| *flag)
    }

    /// Sleep for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` when the loop should stop.
    pub fn wait(&self, duration: Duration) -> bool {
        let Ok(flag) = self.shutdown.lock() else {
            return true;
        };
        match self.wakeup.wait_timeout_while(flag, duration, |stop| !*stop) {
            Ok((flag, _)) => *flag,
            Err(_) => true,
        }
    }

    /// Ask the tracking loop to flip Ring Link participation
    pub fn request_ring_link_toggle(&self) {
        // Two presses before the loop notices cancel out
        self.ring_link_toggle.fetch_xor(true, Ordering::SeqCst);
    }

    /// Consume a pending toggle request
    pub fn take_ring_link_toggle(&self) -> bool {
        self.ring_link_toggle.swap(false, Ordering::SeqCst)
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_runs_full_duration() {
        let controls = Controls::new();
        let start = Instant::now();
        assert!(!controls.wait(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_shutdown_interrupts_wait() {
        let controls = Arc::new(Controls::new());
        let waiter = Arc::clone(&controls);

        let handle = thread::spawn(move || {
            let start = Instant::now();
            (waiter.wait(Duration::from_secs(10)), start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        controls.shutdown();

        let (stopped, elapsed) = handle.join().unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(1));
        assert!(controls.is_shutdown());
    }

    #[test]
    fn test_wait_after_shutdown_returns_immediately() {
        let controls = Controls::new();
        controls.shutdown();
        let start = Instant::now();
        assert!(controls.wait(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_ring_link_toggle_is_consumed_once() {
        let controls = Controls::new();
        assert!(!controls.take_ring_link_toggle());

        controls.request_ring_link_toggle();
        assert!(controls.take_ring_link_toggle());
        assert!(!controls.take_ring_link_toggle());
    }

    #[test]
    fn test_double_toggle_cancels_out() {
        let controls = Controls::new();
        controls.request_ring_link_toggle();
        controls.request_ring_link_toggle();
        assert!(!controls.take_ring_link_toggle());
    }
}
