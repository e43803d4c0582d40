use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use nuevgen::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Terminal view of a generator run: a spinner for each setup stage and a counter bar for
/// the neutrino draws. Only one indicator is alive at a time.
#[derive(Clone)]
pub struct CliProgressHandler {
    active: Arc<Mutex<Option<ProgressBar>>>,
    target: fn() -> ProgressDrawTarget,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self {
            active: Arc::new(Mutex::new(None)),
            target: ProgressDrawTarget::stderr,
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let active = Arc::clone(&self.active);
        let target = self.target;

        Box::new(move |progress: Progress| {
            let Ok(mut slot) = active.lock() else {
                warn!("Progress indicator lock poisoned; dropping update");
                return;
            };

            match progress {
                Progress::StageStart { name } => {
                    if let Some(stale) = slot.take() {
                        stale.abandon();
                    }
                    let spinner = ProgressBar::with_draw_target(None, target())
                        .with_style(stage_style())
                        .with_message(name);
                    spinner.enable_steady_tick(SPINNER_TICK);
                    *slot = Some(spinner);
                }
                Progress::StageFinish => {
                    if let Some(spinner) = slot.take() {
                        let label = spinner.message();
                        spinner.finish_with_message(format!("{label} ✓"));
                    }
                }
                Progress::DrawStart { total } => {
                    if let Some(stale) = slot.take() {
                        stale.finish_and_clear();
                    }
                    *slot = Some(
                        ProgressBar::with_draw_target(Some(total), target())
                            .with_style(draw_style())
                            .with_message("neutrinos"),
                    );
                }
                Progress::DrawIncrement => {
                    if let Some(bar) = slot.as_ref() {
                        bar.inc(1);
                    }
                }
                Progress::DrawFinish => {
                    if let Some(bar) = slot.take() {
                        bar.finish_and_clear();
                    }
                }
                Progress::Message(msg) => match slot.as_ref() {
                    Some(indicator) => indicator.println(msg),
                    None => info!("{msg}"),
                },
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn draw_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg} {wide_bar:.green/white} {human_pos}/{human_len} {per_sec}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden_handler() -> CliProgressHandler {
        CliProgressHandler {
            active: Arc::new(Mutex::new(None)),
            target: ProgressDrawTarget::hidden,
        }
    }

    fn current(handler: &CliProgressHandler) -> Option<ProgressBar> {
        handler.active.lock().unwrap().clone()
    }

    mod stages {
        use super::*;

        #[test]
        fn spinner_lives_until_the_stage_finishes() {
            let handler = hidden_handler();
            assert!(current(&handler).is_none());
            let callback = handler.get_callback();

            callback(Progress::StageStart { name: "Flux" });
            let spinner = current(&handler).unwrap();
            assert_eq!(spinner.message(), "Flux");
            assert!(!spinner.is_finished());

            callback(Progress::StageFinish);
            assert!(current(&handler).is_none());
            assert!(spinner.is_finished());
            assert_eq!(spinner.message(), "Flux ✓");
        }

        #[test]
        fn a_new_stage_abandons_an_unfinished_one() {
            let handler = hidden_handler();
            let callback = handler.get_callback();

            callback(Progress::StageStart { name: "Geometry" });
            let first = current(&handler).unwrap();
            callback(Progress::StageStart { name: "Geometry scan" });

            assert!(first.is_finished());
            assert_eq!(first.message(), "Geometry");
            assert_eq!(current(&handler).unwrap().message(), "Geometry scan");
        }

        #[test]
        fn stray_finish_and_messages_are_harmless() {
            let handler = hidden_handler();
            let callback = handler.get_callback();
            callback(Progress::StageFinish);
            callback(Progress::DrawIncrement);
            callback(Progress::Message("flux files resolved".to_string()));
            assert!(current(&handler).is_none());
        }
    }

    mod draws {
        use super::*;

        #[test]
        fn bar_counts_draws_and_clears_on_finish() {
            let handler = hidden_handler();
            let callback = handler.get_callback();

            callback(Progress::DrawStart { total: 3 });
            let bar = current(&handler).unwrap();
            assert_eq!(bar.length(), Some(3));

            callback(Progress::DrawIncrement);
            callback(Progress::DrawIncrement);
            assert_eq!(bar.position(), 2);

            callback(Progress::DrawFinish);
            assert!(bar.is_finished());
            assert!(current(&handler).is_none());
        }

        #[test]
        fn updates_from_another_thread_reach_the_shared_indicator() {
            let handler = hidden_handler();
            let callback = handler.get_callback();

            thread::spawn(move || {
                callback(Progress::DrawStart { total: 10 });
                for _ in 0..4 {
                    callback(Progress::DrawIncrement);
                }
            })
            .join()
            .unwrap();

            assert_eq!(current(&handler).unwrap().position(), 4);
        }
    }
}
