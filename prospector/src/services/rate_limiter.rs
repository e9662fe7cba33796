use std::{
    collections::HashMap,
    net::IpAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::configuration::RateLimitSettings;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct Window {
    started_at: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Window {
            started_at: now,
            count: 0,
        }
    }

    fn roll(&mut self, now: Instant, length: Duration) {
        if now.duration_since(self.started_at) >= length {
            *self = Window::new(now);
        }
    }
}

#[derive(Debug, Clone)]
struct ClientWindows {
    minute: Window,
    day: Window,
}

#[derive(Debug)]
struct Clients {
    windows: HashMap<IpAddr, ClientWindows>,
    last_sweep: Instant,
}

impl Clients {
    /// Forgets clients whose day window has run out, at most once a minute.
    fn sweep(&mut self, now: Instant) {
        if now.duration_since(self.last_sweep) < MINUTE {
            return;
        }
        self.windows
            .retain(|_, w| now.duration_since(w.day.started_at) < DAY);
        self.last_sweep = now;
    }
}

/// Fixed-window limiter keyed by client address.
#[derive(Clone)]
pub struct RateLimiter {
    per_minute: u32,
    per_day: u32,
    clients: Arc<Mutex<Clients>>,
}

impl RateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        RateLimiter {
            per_minute: settings.requests_per_minute,
            per_day: settings.requests_per_day,
            clients: Arc::new(Mutex::new(Clients {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Records a request from `ip` and reports whether it may go through.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        // A poisoned lock only means another request panicked mid-update.
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        clients.sweep(now);

        let windows = clients.windows.entry(ip).or_insert_with(|| ClientWindows {
            minute: Window::new(now),
            day: Window::new(now),
        });
        windows.minute.roll(now, MINUTE);
        windows.day.roll(now, DAY);

        if windows.minute.count >= self.per_minute || windows.day.count >= self.per_day {
            return false;
        }

        windows.minute.count += 1;
        windows.day.count += 1;
        true
    }
}
