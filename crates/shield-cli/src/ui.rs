use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use synchshield::engine::progress::{Progress, ProgressCallback};

/// Renders engine progress events as terminal progress bars.
///
/// Trials finish on rayon worker threads, so the bar state sits behind a
/// mutex and the handler hands out a `Sync` callback for the reporter.
pub struct UiManager {
    mp: MultiProgress,
    state: Mutex<BarState>,
}

#[derive(Default)]
struct BarState {
    scan_bar: Option<ProgressBar>,
    study_bar: Option<ProgressBar>,
}

impl UiManager {
    pub fn new() -> Self {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        Self {
            mp,
            state: Mutex::new(BarState::default()),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'_> {
        Box::new(move |progress| self.handle_progress(progress))
    }

    fn handle_progress(&self, progress: Progress) {
        let mut state = self.state.lock().expect("progress bar state poisoned");
        match progress {
            Progress::ScanStart { studies } => {
                let pb = self.mp.add(ProgressBar::new(studies));
                pb.set_style(Self::scan_style());
                pb.set_message("thickness scan");
                state.scan_bar = Some(pb);
            }
            Progress::StudyStart { thickness, runs } => {
                let pb = self.mp.add(ProgressBar::new(runs));
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_style(Self::study_style());
                pb.set_message(format!("t = {thickness} m"));
                state.study_bar = Some(pb);
            }
            Progress::TrialFinish { .. } => {
                if let Some(bar) = state.study_bar.as_ref() {
                    bar.inc(1);
                }
            }
            Progress::StudyFinish => {
                if let Some(bar) = state.study_bar.take() {
                    bar.finish_and_clear();
                }
                if let Some(bar) = state.scan_bar.as_ref() {
                    bar.inc(1);
                }
            }
            Progress::ScanFinish => {
                if let Some(bar) = state.scan_bar.take() {
                    bar.finish_and_clear();
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn scan_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.green/white}] {pos}/{len}")
            .expect("Invalid template")
            .progress_chars("━╸ ")
    }

    fn study_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Invalid template")
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    write!(w, "{:.1}s", state.eta().as_secs_f64()).unwrap();
                },
            )
            .progress_chars("━╸ ")
    }
}

impl Default for UiManager {
    fn default() -> Self {
        Self::new()
    }
}
