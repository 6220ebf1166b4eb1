use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

use crate::base32::base32_decode;
use crate::display::DisplaySink;
use crate::totp::Totp;

// Within this many seconds of a window boundary the next wakeup is the
// regeneration itself, timed to land exactly on the boundary.
const IMMINENT_WINDOW: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Display-only countdown update; next tick in one second.
    Countdown { remaining: u64 },
    /// Full regeneration scheduled at the next window boundary.
    Regenerate { in_secs: u64 },
}

impl TickAction {
    pub fn plan(epoch_secs: u64) -> Self {
        let remaining = Totp::time_remaining_at(epoch_secs);
        if remaining <= IMMINENT_WINDOW {
            TickAction::Regenerate { in_secs: remaining }
        } else {
            TickAction::Countdown { remaining }
        }
    }
}

/// Owns the single active refresh timer. Starting invalidates any pending
/// timer first, so a superseded secret can never fire a stale regeneration.
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn start<P, D>(&mut self, provider: P, mut display: D)
    where
        P: Fn() -> String + Send + 'static,
        D: DisplaySink + Send + 'static,
    {
        self.stop();

        self.handle = Some(tokio::spawn(async move {
            loop {
                // The secret is re-read on every regeneration, so a value
                // submitted while a timer was pending wins at fire time.
                let secret = provider();
                let totp = Totp::new(base32_decode(&secret));

                let code = match totp.generate() {
                    Ok(code) => code,
                    Err(err) => {
                        // Halt auto-refresh; the user has to retrigger.
                        display.set_code(&format!("Error: {err}"));
                        return;
                    }
                };
                display.set_code(&code);

                loop {
                    let epoch = match now_secs() {
                        Ok(epoch) => epoch,
                        Err(err) => {
                            display.set_code(&format!("Error: {err}"));
                            return;
                        }
                    };

                    match TickAction::plan(epoch) {
                        TickAction::Countdown { remaining } => {
                            display.set_timer(remaining);
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                        TickAction::Regenerate { in_secs } => {
                            display.set_timer(in_secs);
                            tokio::time::sleep(Duration::from_secs(in_secs)).await;
                            break;
                        }
                    }
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn now_secs() -> anyhow::Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn countdown_while_window_is_open() {
        // epoch mod 30 == 0 through 24 leaves more than 5 seconds.
        assert_eq!(TickAction::plan(60), TickAction::Countdown { remaining: 30 });
        assert_eq!(TickAction::plan(84), TickAction::Countdown { remaining: 6 });
    }

    #[test]
    fn regenerates_at_the_boundary_when_imminent() {
        // epoch mod 30 == 28 leaves 2 seconds: regenerate in exactly 2s.
        assert_eq!(TickAction::plan(88), TickAction::Regenerate { in_secs: 2 });
        assert_eq!(TickAction::plan(85), TickAction::Regenerate { in_secs: 5 });
        assert_eq!(TickAction::plan(89), TickAction::Regenerate { in_secs: 1 });
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Code(String),
        Timer(u64),
    }

    #[derive(Default, Clone)]
    struct RecordingSink(Arc<Mutex<Vec<Event>>>);

    impl DisplaySink for RecordingSink {
        fn set_code(&mut self, code: &str) {
            self.0.lock().unwrap().push(Event::Code(code.to_string()));
        }

        fn set_timer(&mut self, remaining: u64) {
            self.0.lock().unwrap().push(Event::Timer(remaining));
        }

        fn set_share_link(&mut self, _url: &str) {}
    }

    #[tokio::test]
    async fn initial_generation_fires_immediately() {
        let sink = RecordingSink::default();
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(|| "JBSWY3DPEHPK3PXP".to_string(), sink.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop();

        let events = sink.0.lock().unwrap();
        match events.first() {
            Some(Event::Code(code)) => {
                assert_eq!(code.len(), 6);
                assert!(code.bytes().all(|b| b.is_ascii_digit()));
            }
            other => panic!("expected an immediate code write, got {other:?}"),
        }
        assert!(events.iter().any(|event| matches!(
            event,
            Event::Timer(remaining) if (1..=30).contains(remaining)
        )));
    }

    #[tokio::test]
    async fn stop_halts_further_updates() {
        let sink = RecordingSink::default();
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(|| "JBSWY3DPEHPK3PXP".to_string(), sink.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop();
        // Let any in-flight poll settle before snapshotting.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let seen = sink.0.lock().unwrap().len();

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(sink.0.lock().unwrap().len(), seen);
    }
}
