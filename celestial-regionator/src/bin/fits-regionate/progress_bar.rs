use celestial_regionator::{LogProgress, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

/// Draws extraction and file-writing progress on the terminal.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for BarProgress {
    fn report(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::PointsExtracted { done, total } => {
                let bar = self
                    .bar
                    .get_or_insert_with(|| create_progress_bar(total as u64));
                bar.set_position(done as u64);
                if done == total {
                    if let Some(bar) = self.bar.take() {
                        bar.finish_and_clear();
                    }
                    log::info!("extracted {total} objects");
                }
            }
            ProgressEvent::TreeBuilt { .. } => {
                LogProgress.report(event);
                self.bar = Some(create_spinner("writing regions"));
            }
            ProgressEvent::FileWritten { .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ProgressEvent::Finished { files } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                log::info!("done, {files} files written");
            }
            other => LogProgress.report(other),
        }
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} objects ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn create_spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}: {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb
}
