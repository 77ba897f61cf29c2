pub use crate::traits::Progress;

impl Progress for indicatif::ProgressBar {
    fn inc(&self, i: u64) {
        indicatif::ProgressBar::inc(self, i)
    }

    fn finish(&self) {
        indicatif::ProgressBar::finish(self)
    }
}

impl Progress for logbar::ProgressBar {
    fn inc(&self, i: u64) {
        logbar::ProgressBar::inc(self, i as usize)
    }

    fn finish(&self) {
        logbar::ProgressBar::finish(self)
    }
}

/// Progress indicator that does nothing
pub struct NoProgress {}

impl Progress for NoProgress {
    fn inc(&self, _i: u64) {}

    fn finish(&self) {}
}

/// Progress bar for event processing
///
/// An interactive terminal gets an `indicatif` bar, other outputs a
/// plain `logbar`. Nothing is shown unless the log level is exactly
/// `info`. While the bar is shown, only warnings and errors are logged.
pub struct ProgressBar {
    bar: Box<dyn Progress + Send + Sync>,
    restore_level: Option<log::LevelFilter>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            bar: Box::new(NoProgress {}),
            restore_level: None,
        }
    }
}

impl Progress for ProgressBar {
    fn inc(&self, i: u64) {
        self.bar.inc(i);
    }

    fn finish(&self) {
        self.bar.finish();
        if let Some(level) = self.restore_level {
            log::set_max_level(level);
        }
    }
}

impl ProgressBar {
    /// Progress bar with `len` steps and the given message
    pub fn new(len: u64, message: &str) -> Self {
        let level = log::max_level();
        if level.to_level() != Some(log::Level::Info) {
            return Self::default();
        }
        let bar: Box<dyn Progress + Send + Sync> =
            if console::Term::stderr().features().is_attended() {
                let bar = indicatif::ProgressBar::new(len);
                let style = indicatif::ProgressStyle::default_bar()
                    .template("{bar:60.cyan/cyan} {msg} {pos}/{len} [{elapsed}]");
                if let Ok(style) = style {
                    bar.set_style(style);
                }
                bar.set_message(message.to_owned());
                Box::new(bar)
            } else {
                eprintln!("{message}");
                let style = logbar::Style::new().indicator('█');
                Box::new(logbar::ProgressBar::with_style(len as usize, style))
            };
        log::set_max_level(log::LevelFilter::Warn);
        Self {
            bar,
            restore_level: Some(level),
        }
    }
}
