use super::{Timer, TimerConfig, TimerEvent, TimerSnapshot};
use crate::error::AppError;
use crate::safe_lock;
use log::{info, warn};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct Driver {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives a [`Timer`] in real time on a background thread.
///
/// Every event the timer produces is sent on the channel returned by
/// [`TimerService::new`]. At most one driver thread exists at a time, and
/// once [`TimerService::pause`] returns no further tick is applied.
pub struct TimerService {
    timer: Arc<Mutex<Timer>>,
    interval: Duration,
    events: Sender<TimerEvent>,
    driver: Option<Driver>,
}

impl TimerService {
    pub fn new(timer: Timer, interval: Duration) -> (Self, Receiver<TimerEvent>) {
        let (events, receiver) = mpsc::channel();
        let service = Self {
            timer: Arc::new(Mutex::new(timer)),
            interval,
            events,
            driver: None,
        };
        (service, receiver)
    }

    /// Start ticking. Starting a timer that is already being driven is a no-op.
    pub fn start(&mut self) -> Result<(), AppError> {
        if self.driver.is_some() && self.is_running() {
            return Ok(());
        }
        // A driver that is still around belongs to a timer that stopped on
        // its own; it exits on its own, so joining it here is short.
        self.stop_driver();

        safe_lock(&self.timer, "Timer").start()?;

        let (stop, stop_rx) = mpsc::channel();
        let timer = Arc::clone(&self.timer);
        let events = self.events.clone();
        let interval = self.interval;

        let handle = thread::spawn(move || {
            let mut deadline = Instant::now() + interval;
            loop {
                let wait = deadline.saturating_duration_since(Instant::now());
                match stop_rx.recv_timeout(wait) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let (emitted, still_running) = {
                    let mut timer = safe_lock(&timer, "Timer");
                    let emitted = timer.tick();
                    (emitted, timer.is_running())
                };

                for event in emitted {
                    if events.send(event).is_err() {
                        // Nobody is listening any more
                        return;
                    }
                }

                if !still_running {
                    break;
                }
                deadline += interval;
            }
        });

        self.driver = Some(Driver { stop, handle });
        info!("Timer started");
        Ok(())
    }

    /// Stop ticking. Returns whether the timer was running.
    pub fn pause(&mut self) -> bool {
        // Flip the flag first: a driver blocked on the lock will then tick a
        // paused timer, which emits nothing.
        let was_running = safe_lock(&self.timer, "Timer").pause();
        self.stop_driver();
        if was_running {
            info!("Timer paused");
        }
        was_running
    }

    pub fn reset(&mut self) {
        self.pause();
        safe_lock(&self.timer, "Timer").reset();
    }

    /// Apply a new configuration. Fails while the timer is running.
    pub fn reconfigure(&mut self, config: TimerConfig) -> Result<(), AppError> {
        safe_lock(&self.timer, "Timer").reconfigure(config)
    }

    pub fn set_completed_cycles(&mut self, completed_cycles: u32) -> Result<(), AppError> {
        safe_lock(&self.timer, "Timer").set_completed_cycles(completed_cycles)
    }

    pub fn is_running(&self) -> bool {
        safe_lock(&self.timer, "Timer").is_running()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        safe_lock(&self.timer, "Timer").snapshot()
    }

    fn stop_driver(&mut self) {
        if let Some(driver) = self.driver.take() {
            // The driver may already have exited, in which case nobody receives this
            let _ = driver.stop.send(());
            if driver.handle.join().is_err() {
                warn!("Timer driver thread panicked");
            }
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.stop_driver();
    }
}
