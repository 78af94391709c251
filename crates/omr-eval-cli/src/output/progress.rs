//! Spinner adapter using indicatif.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use omr_eval_core::{ProgressEvent, ProgressSink};
use tracing::debug;

/// Loader shown on stderr while a sheet is being evaluated.
pub struct Spinner {
    bar: Mutex<Option<ProgressBar>>,
    enabled: bool,
}

impl Spinner {
    /// Creates a spinner.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, never draw anything
    /// * `show` - If true, draw the spinner while evaluating
    #[must_use]
    pub fn new(quiet: bool, show: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            enabled: !quiet && show,
        }
    }

    fn start(&self, image: &str, model: &str) {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
        {
            bar.set_style(style);
        }
        bar.set_message(format!("AI is analyzing the sheet... ({image}, {model})"));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.replace(Some(bar));
    }

    fn stop(&self) {
        self.replace(None);
    }

    fn replace(&self, next: Option<ProgressBar>) {
        let previous = match self.bar.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(e) => {
                debug!("Spinner lock poisoned: {e}");
                return;
            }
        };
        if let Some(bar) = previous {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for Spinner {
    fn on_event(&self, event: ProgressEvent) {
        if !self.enabled {
            return;
        }

        match event {
            ProgressEvent::Started { image, model } => self.start(&image, &model),
            ProgressEvent::Completed { .. }
            | ProgressEvent::Failed { .. }
            | ProgressEvent::Discarded => self.stop(),
        }
    }
}
