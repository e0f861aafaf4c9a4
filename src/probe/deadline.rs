use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::log::debug;

/// Hard deadline on one connection.
///
/// A watchdog thread shuts the socket down once `after` has elapsed, which
/// makes any blocked read or write on it fail. Dropping the guard disarms the
/// watchdog and waits for it to exit. A zero duration arms nothing.
pub(crate) struct Deadline {
    after: Duration,
    expired: Arc<AtomicBool>,
    disarm: Option<Sender<()>>,
    watchdog: Option<JoinHandle<()>>,
}

impl Deadline {
    pub(crate) fn arm(stream: &TcpStream, after: Duration) -> io::Result<Self> {
        let expired = Arc::new(AtomicBool::new(false));
        if after.is_zero() {
            return Ok(Self {
                after,
                expired,
                disarm: None,
                watchdog: None,
            });
        }

        let watched = stream.try_clone()?;
        let (disarm, disarmed) = mpsc::channel::<()>();
        let flag = Arc::clone(&expired);
        let watchdog = thread::Builder::new()
            .name("mailprobe-deadline".to_string())
            .spawn(move || {
                // Any message or a dropped sender means the guard went away first.
                if let Err(RecvTimeoutError::Timeout) = disarmed.recv_timeout(after) {
                    flag.store(true, Ordering::SeqCst);
                    debug!("deadline of {after:?} reached, closing connection");
                    let _ = watched.shutdown(Shutdown::Both);
                }
            })?;

        Ok(Self {
            after,
            expired,
            disarm: Some(disarm),
            watchdog: Some(watchdog),
        })
    }

    pub(crate) fn expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    pub(crate) fn after(&self) -> Duration {
        self.after
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.disarm.take();
        if let Some(watchdog) = self.watchdog.take() {
            let _ = watchdog.join();
        }
    }
}
