// file: src/pipeline/progress.rs
// description: time-remaining estimation from live scanner output and the spinner status line
// reference: uses indicatif for the spinner and a tokio watch channel as the latest-estimate slot

use indicatif::{ProgressBar, ProgressStyle};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use tokio::sync::watch;

pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

lazy_static! {
    // "SYN Stealth Scan Timing: About 41.20% done; ETC: 14:02 (0:03:17 remaining)"
    static ref ETC_ESTIMATE: Regex = Regex::new(
        r"(?i)About [\d.]+%.*?ETC:.*?\((.*?) remaining\)"
    ).expect("ETC_ESTIMATE regex is valid");
}

/// Returns the remaining-duration phrase from an nmap timing line.
pub fn parse_remaining(line: &str) -> Option<&str> {
    ETC_ESTIMATE
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Feeds the display through a single-slot channel. Publishing overwrites
/// the previous value and never waits for the reader, even after the
/// display has stopped.
pub struct ProgressEstimator {
    latest: watch::Sender<Option<String>>,
}

impl ProgressEstimator {
    pub fn new() -> (Self, watch::Receiver<Option<String>>) {
        let (latest, receiver) = watch::channel(None);
        (Self { latest }, receiver)
    }

    pub fn observe(&self, line: &str) -> Option<String> {
        let estimate = parse_remaining(line)?.to_string();
        self.latest.send_replace(Some(estimate.clone()));
        Some(estimate)
    }
}

/// Final state published to the display when the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Running,
    Succeeded,
    Failed,
}

#[derive(Clone)]
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new(message: &str) -> Self {
        Self::with_bar(ProgressBar::new_spinner(), message)
    }

    pub fn hidden(message: &str) -> Self {
        Self::with_bar(ProgressBar::hidden(), message)
    }

    fn with_bar(bar: ProgressBar, message: &str) -> Self {
        bar.set_style(
            ProgressStyle::with_template("{prefix} [{spinner}] {msg}")
                .expect("Failed to create spinner template")
                .tick_strings(&["|", "/", "-", "\\", " "]),
        );
        bar.set_prefix(message.to_string());

        Self { bar }
    }

    pub fn status_text(estimate: Option<&str>) -> String {
        match estimate {
            Some(remaining) => format!("(Estimated time remaining: {})", remaining),
            None => String::new(),
        }
    }

    /// Prints above the status line so the spinner is not torn.
    pub fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            eprintln!("{}", line);
        } else {
            self.bar.println(line);
        }
    }

    /// Redraws on every tick until `completion` leaves `Running` or its
    /// sender is dropped, then prints the closing line.
    pub async fn run(
        self,
        mut estimates: watch::Receiver<Option<String>>,
        mut completion: watch::Receiver<Completion>,
    ) -> Completion {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);

        let outcome = loop {
            let current = *completion.borrow_and_update();
            if current != Completion::Running {
                break current;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    let estimate = estimates.borrow_and_update().clone();
                    self.bar.set_message(Self::status_text(estimate.as_deref()));
                    self.bar.tick();
                }
                changed = completion.changed() => {
                    if changed.is_err() {
                        break Completion::Failed;
                    }
                }
            }
        };

        self.finish(outcome);
        outcome
    }

    fn finish(&self, outcome: Completion) {
        self.bar.set_style(
            ProgressStyle::with_template("{prefix} {msg}")
                .expect("Failed to create completion template"),
        );
        let closing = match outcome {
            Completion::Failed => "Failed!",
            _ => "Done!",
        };
        self.bar.finish_with_message(closing);
    }
}
