//! Progress and logging front-end for the driver binary.
//!
//! One verbosity switch covers both worlds: level 0 keeps the terminal quiet
//! and shows a live spinner plus a progress bar over the version matrix;
//! levels 1..3 turn the spinner off and emit standard `env_logger` text logs
//! at info/debug/trace.

use env_logger::Env;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerbosityLevel {
    Quiet = 0,
    Info = 1,
    Debug = 2,
    Trace = 3,
}

impl From<u8> for VerbosityLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Info,
            2 => VerbosityLevel::Debug,
            _ => VerbosityLevel::Trace,
        }
    }
}

impl VerbosityLevel {
    fn to_log_level(self) -> LevelFilter {
        match self {
            VerbosityLevel::Quiet => LevelFilter::Warn,
            VerbosityLevel::Info => LevelFilter::Info,
            VerbosityLevel::Debug => LevelFilter::Debug,
            VerbosityLevel::Trace => LevelFilter::Trace,
        }
    }
}

pub struct Notifier {
    verbosity: VerbosityLevel,
    multi_progress: Option<MultiProgress>,
    active_spinner: RefCell<Option<ProgressBar>>,
}

impl Notifier {
    /// Installs the global logger at the filter matching `verbosity_level`
    /// and, in quiet mode, prepares the progress UI.
    pub fn init(verbosity_level: u8) -> Self {
        let verbosity = VerbosityLevel::from(verbosity_level);

        env_logger::Builder::from_env(Env::default())
            .filter_level(verbosity.to_log_level())
            .init();

        let multi_progress = if verbosity == VerbosityLevel::Quiet {
            Some(MultiProgress::new())
        } else {
            None
        };

        Self {
            verbosity,
            multi_progress,
            active_spinner: RefCell::new(None),
        }
    }

    /// Status line: updates the quiet-mode spinner, or logs at info.
    pub fn status(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Quiet {
            if self.active_spinner.borrow().is_none() {
                if let Some(multi_progress) = &self.multi_progress {
                    let style = ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg}")
                        .unwrap();

                    let spinner = multi_progress.add(ProgressBar::new_spinner());
                    spinner.set_style(style);
                    spinner.enable_steady_tick(Duration::from_millis(100));

                    *self.active_spinner.borrow_mut() = Some(spinner);
                }
            }

            if let Some(spinner) = self.active_spinner.borrow().as_ref() {
                spinner.set_message(message.to_string());
            }
        } else {
            log::info!("{}", message);
        }
    }

    /// A bar over the version matrix; only rendered in quiet mode.
    pub fn matrix_bar(&self, length: u64) -> Option<ProgressBar> {
        let multi_progress = self.multi_progress.as_ref()?;

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> ");

        let bar = multi_progress.add(ProgressBar::new(length));
        bar.set_style(style);
        Some(bar)
    }

    /// Stops the spinner, leaving `message` as the final line.
    pub fn finish(&self, message: &str) {
        if let Some(spinner) = self.active_spinner.borrow_mut().take() {
            spinner.finish_with_message(message.to_string());
        } else if self.verbosity != VerbosityLevel::Quiet {
            log::info!("{}", message);
        }
    }
}
