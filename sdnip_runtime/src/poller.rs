// SDN-IP Lab: Configuration compiler and traffic playback for SDN-IP demos
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.


//! Polling the controller until all intents are installed.

use sdnip::settings::SyncSettings;
use sdnip::Stopper;

use log::*;
use std::fmt::Display;
use std::thread;
use std::time::{Duration, Instant};

/// Default interval between two polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Granularity with which the stopper is checked while sleeping
const STOP_CHECK_INTERVAL_MS: u64 = 100;

/// How often the controller is polled, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Time between two polls
    pub interval: Duration,
    /// Give up after this time. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS), timeout: None }
    }
}

impl From<&SyncSettings> for RetryPolicy {
    fn from(settings: &SyncSettings) -> Self {
        Self { interval: settings.poll_interval(), timeout: settings.poll_timeout() }
    }
}

/// Result of [`wait_for_intents`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The controller reports at least the expected number of intents.
    Reached(usize),
    /// The timeout of the retry policy has elapsed. `last` is the last count the controller
    /// reported, or `None` if no poll succeeded.
    TimedOut {
        /// Last reported count
        last: Option<usize>,
    },
    /// The stopper was triggered.
    Cancelled,
}

/// Call `poll` every `policy.interval` until it returns at least `expected`. Errors of `poll` are
/// logged and retried on the next round. The loop ends early if the timeout of the policy elapses
/// or if the stopper is triggered.
pub fn wait_for_intents<F, E>(
    mut poll: F,
    expected: usize,
    policy: &RetryPolicy,
    stopper: &Stopper,
) -> WaitOutcome
where
    F: FnMut() -> Result<usize, E>,
    E: Display,
{
    let start = Instant::now();
    let mut last = None;
    loop {
        if stopper.is_stop() {
            info!("Stopped waiting for the intents");
            return WaitOutcome::Cancelled;
        }

        match poll() {
            Ok(count) if count >= expected => {
                info!("All {} intents are installed", expected);
                return WaitOutcome::Reached(count);
            }
            Ok(count) => {
                info!("Waiting for BGP announcements ({} more intents expected)...", expected - count);
                last = Some(count);
            }
            Err(e) => warn!("Cannot get the number of intents: {}", e),
        }

        if let Some(timeout) = policy.timeout {
            if start.elapsed() >= timeout {
                warn!("Gave up waiting for the intents after {} seconds", timeout.as_secs());
                return WaitOutcome::TimedOut { last };
            }
        }

        sleep_unless_stopped(policy.interval, stopper);
    }
}

/// Sleep for `duration`, returning early if the stopper is triggered.
fn sleep_unless_stopped(duration: Duration, stopper: &Stopper) {
    let until = Instant::now() + duration;
    let step = Duration::from_millis(STOP_CHECK_INTERVAL_MS);
    loop {
        let now = Instant::now();
        if now >= until || stopper.is_stop() {
            return;
        }
        thread::sleep(step.min(until - now));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fast(timeout: Option<u64>) -> RetryPolicy {
        RetryPolicy { interval: Duration::from_millis(1), timeout: timeout.map(Duration::from_millis) }
    }

    #[test]
    fn reached_after_errors() {
        let mut answers = vec![Err("connection refused"), Ok(3), Ok(5), Ok(12), Ok(0)].into_iter();
        let mut calls = 0;
        let outcome = wait_for_intents(
            || {
                calls += 1;
                answers.next().unwrap()
            },
            10,
            &fast(None),
            &Stopper::new(),
        );
        assert_eq!(outcome, WaitOutcome::Reached(12));
        assert_eq!(calls, 4);
    }

    #[test]
    fn already_reached() {
        let outcome =
            wait_for_intents(|| Ok::<_, String>(0), 0, &RetryPolicy::default(), &Stopper::new());
        assert_eq!(outcome, WaitOutcome::Reached(0));
    }

    #[test]
    fn timeout() {
        let outcome = wait_for_intents(|| Ok::<_, String>(2), 10, &fast(Some(20)), &Stopper::new());
        assert_eq!(outcome, WaitOutcome::TimedOut { last: Some(2) });

        let outcome =
            wait_for_intents(|| Err::<usize, _>("unreachable"), 10, &fast(Some(0)), &Stopper::new());
        assert_eq!(outcome, WaitOutcome::TimedOut { last: None });
    }

    #[test]
    fn cancelled() {
        let stopper = Stopper::new();
        stopper.send_stop();
        let outcome = wait_for_intents(
            || -> Result<usize, String> { panic!("must not poll") },
            10,
            &RetryPolicy::default(),
            &stopper,
        );
        assert_eq!(outcome, WaitOutcome::Cancelled);
    }

    #[test]
    fn cancelled_while_sleeping() {
        let stopper = Stopper::new();
        let remote = stopper.clone();
        let policy = RetryPolicy { interval: Duration::from_secs(60), timeout: None };
        let waiter = thread::spawn(move || wait_for_intents(|| Ok::<_, String>(1), 5, &policy, &stopper));
        thread::sleep(Duration::from_millis(50));
        remote.send_stop();
        assert_eq!(waiter.join().unwrap(), WaitOutcome::Cancelled);
    }

    #[test]
    fn policy_from_settings() {
        let mut settings = SyncSettings::default();
        assert_eq!(RetryPolicy::from(&settings), RetryPolicy::default());
        settings.poll_interval_ms = 250;
        settings.poll_timeout_s = Some(30);
        assert_eq!(
            RetryPolicy::from(&settings),
            RetryPolicy { interval: Duration::from_millis(250), timeout: Some(Duration::from_secs(30)) }
        );
    }
}
