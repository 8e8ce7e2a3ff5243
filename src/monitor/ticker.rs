//! Cancellable fixed-interval ticker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularity at which a waiting ticker notices a stop request.
const STOP_CHECK: Duration = Duration::from_millis(100);

/// Set from the SIGINT handler.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
    // A second Ctrl-C falls through to the default action and kills us.
    // SAFETY: signal() is async-signal-safe.
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
}

/// Route SIGINT into the stop flag instead of killing the process.
fn install_interrupt_handler() {
    #[cfg(unix)]
    {
        // SAFETY: the handler only touches an atomic and calls signal().
        unsafe {
            libc::signal(libc::SIGINT, on_interrupt as libc::sighandler_t);
        }
    }
}

/// Shared stop flag for polling loops.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    watch_interrupt: bool,
}

impl StopSignal {
    /// A signal only tripped by [`StopSignal::trigger`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal also tripped by Ctrl-C (SIGINT on unix).
    pub fn interruptible() -> Self {
        install_interrupt_handler();
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            watch_interrupt: true,
        }
    }

    /// Ask every holder of this signal to stop.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || (self.watch_interrupt && INTERRUPTED.load(Ordering::SeqCst))
    }
}

/// Sleeps a fixed interval between probes, waking early on stop.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    stop: StopSignal,
}

impl Ticker {
    pub fn new(interval: Duration, stop: StopSignal) -> Self {
        Self { interval, stop }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Wait one interval. Returns `false` if stopped before it elapsed.
    pub fn wait(&self) -> bool {
        let deadline = Instant::now() + self.interval;
        loop {
            if self.stop.is_triggered() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(STOP_CHECK.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_elapses_interval() {
        let ticker = Ticker::new(Duration::from_millis(50), StopSignal::new());
        let start = Instant::now();

        assert!(ticker.wait());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn wait_returns_early_when_stopped() {
        let stop = StopSignal::new();
        let ticker = Ticker::new(Duration::from_secs(30), stop.clone());

        let trigger = stop.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            trigger.trigger();
        });

        let start = Instant::now();
        assert!(!ticker.wait());
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn clones_share_flag() {
        let stop = StopSignal::new();
        let other = stop.clone();
        other.trigger();
        assert!(stop.is_triggered());
    }

    #[test]
    fn plain_signal_ignores_global_interrupt() {
        let stop = StopSignal::new();
        assert!(!stop.is_triggered());
    }
}
