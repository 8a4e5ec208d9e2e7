//! Progress events emitted while a run advances.
//!
//! The pipeline never prints. It reports through a [`ProgressSink`] so a
//! caller can log, draw a progress bar, or ignore the events.

use std::path::PathBuf;

/// Rows between consecutive [`ProgressEvent::PointsExtracted`] events.
pub const EXTRACT_REPORT_INTERVAL: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    HdusFound { count: usize },
    ColumnsDetected { ra: String, dec: String },
    Sorted { column: String },
    PointsExtracted { done: usize, total: usize },
    TreeBuilt { points: usize, regions: usize, depth: usize },
    FileWritten { path: PathBuf },
    IndexWritten { path: PathBuf },
    Finished { files: usize },
}

pub trait ProgressSink {
    fn report(&mut self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _event: ProgressEvent) {}
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::HdusFound { count } => log::info!("found {count} HDUs"),
            ProgressEvent::ColumnsDetected { ra, dec } => {
                log::info!("using columns {ra} (RA) and {dec} (Dec)")
            }
            ProgressEvent::Sorted { column } => log::info!("sorted rows by '{column}'"),
            ProgressEvent::PointsExtracted { done, total } => {
                log::info!("{done}/{total} objects...")
            }
            ProgressEvent::TreeBuilt {
                points,
                regions,
                depth,
            } => log::info!("placed {points} points in {regions} regions (depth {depth})"),
            ProgressEvent::FileWritten { path } => log::debug!("wrote {}", path.display()),
            ProgressEvent::IndexWritten { path } => {
                log::info!("wrote index {}", path.display())
            }
            ProgressEvent::Finished { files } => log::info!("done, {files} files written"),
        }
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn report(&mut self, event: ProgressEvent) {
        (**self).report(event);
    }
}

/// Collects events in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(sink: &mut impl ProgressSink) {
        sink.report(ProgressEvent::HdusFound { count: 2 });
        sink.report(ProgressEvent::Finished { files: 7 });
    }

    #[test]
    fn recording_keeps_order() {
        let mut sink = RecordingProgress::default();
        emit(&mut sink);
        assert_eq!(
            sink.events,
            vec![
                ProgressEvent::HdusFound { count: 2 },
                ProgressEvent::Finished { files: 7 },
            ]
        );
    }

    #[test]
    fn borrowed_sink_forwards() {
        let mut sink = RecordingProgress::default();
        {
            let mut borrowed = &mut sink;
            emit(&mut borrowed);
        }
        assert_eq!(sink.events.len(), 2);
    }

    #[test]
    fn null_and_log_sinks_accept_everything() {
        emit(&mut NullProgress);
        emit(&mut LogProgress);
    }
}
