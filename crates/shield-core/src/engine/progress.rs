use crate::core::models::trial::TrialResult;

/// Progress events emitted while a scan or study executes.
#[derive(Debug, Clone)]
pub enum Progress {
    /// A thickness scan is starting.
    ScanStart { studies: u64 },
    /// One study (one thickness) is starting.
    StudyStart { thickness: f64, runs: u64 },
    /// One trial of the current study finished.
    TrialFinish { result: TrialResult },
    /// The current study finished and its summary was recorded.
    StudyFinish,
    ScanFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// A no-op by default; callers attach a callback to observe progress.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
