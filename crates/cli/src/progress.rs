//! `indicatif`-backed [`ProgressMonitor`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tmplminer_core::worker::ProgressMonitor;

pub struct BarMonitor {
    bar: Option<ProgressBar>,
    cancelled: Arc<AtomicBool>,
}

impl BarMonitor {
    pub fn new(quiet: bool) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));

        let bar = if quiet {
            None
        } else {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
            );
            Some(bar)
        };

        Self { bar, cancelled }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressMonitor for BarMonitor {
    fn set_total(&self, total: u64) {
        if let Some(bar) = &self.bar {
            bar.set_length(total);
        }
    }

    fn update(&self, done: u64) -> bool {
        if let Some(bar) = &self.bar {
            bar.set_position(done);
        }
        self.keep_going()
    }

    fn update_with_phase(&self, done: u64, phase: &str) -> bool {
        if let Some(bar) = &self.bar {
            bar.set_position(done);
            bar.set_message(phase.to_string());
        }
        self.keep_going()
    }

    fn keep_going(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }
}
