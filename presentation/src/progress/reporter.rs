//! Progress reporting for consultations

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use panel_application::ports::progress::ConsultationProgressNotifier;
use panel_domain::{DelegateState, DelegateStatus, SessionStatus};
use std::sync::Mutex;
use std::time::Duration;

/// Reports consultation progress with a spinner per stage and a bar for
/// the specialists
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
    panel_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
            panel_bar: Mutex::new(None),
        }
    }

    fn panel_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, prefix: &str, message: impl Into<String>) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix.to_string());
        pb.set_message(message.into());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.replace_stage(Some(pb));
    }

    fn replace_stage(&self, next: Option<ProgressBar>) {
        if let Ok(mut slot) = self.stage_bar.lock() {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
            *slot = next;
        }
    }

    fn finish_panel(&self, message: String) {
        if let Ok(mut slot) = self.panel_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsultationProgressNotifier for ProgressReporter {
    fn on_stage_change(&self, status: SessionStatus) {
        match status {
            SessionStatus::Proposing => {
                self.start_spinner("Proposal", "Asking which specialists to consult...")
            }
            SessionStatus::AwaitingApproval => self.replace_stage(None),
            SessionStatus::Spawning => self.start_spinner("Panel", "Creating specialist nodes..."),
            SessionStatus::Consulting => self.replace_stage(None),
            SessionStatus::Synthesizing => {
                self.finish_panel(format!("{}", "answers collected".green()));
            }
            SessionStatus::Completed => {
                self.replace_stage(None);
                self.finish_panel(format!("{}", "done".green()));
            }
            SessionStatus::Cancelled => {
                self.replace_stage(None);
                self.finish_panel(format!("{}", "cancelled".yellow()));
            }
            SessionStatus::Failed => {
                self.replace_stage(None);
                self.finish_panel(format!("{}", "failed".red()));
            }
        }
    }

    fn on_consultation_start(&self, delegates: &[DelegateStatus]) {
        let pb = self.multi.add(ProgressBar::new(delegates.len() as u64));
        pb.set_style(Self::panel_style());
        pb.set_prefix("Consulting");
        pb.set_position(delegates.iter().filter(|d| d.state.is_settled()).count() as u64);
        pb.set_message("Waiting for specialists...");
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.panel_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_delegate_update(&self, _index: usize, delegate: &DelegateStatus, _total: usize) {
        let Ok(slot) = self.panel_bar.lock() else {
            return;
        };
        let Some(pb) = slot.as_ref() else {
            return;
        };
        match &delegate.state {
            DelegateState::Waiting => {}
            DelegateState::Thinking => {
                pb.set_message(format!("{} {}", "..".cyan(), delegate.role_name));
            }
            DelegateState::Responded { .. } => {
                pb.set_message(format!("{} {}", "v".green(), delegate.role_name));
                pb.inc(1);
            }
            DelegateState::Failed { .. } => {
                pb.set_message(format!("{} {}", "x".red(), delegate.role_name));
                pb.inc(1);
            }
        }
    }

    fn on_synthesis_start(&self, contributors: usize) {
        self.start_spinner(
            "Synthesis",
            format!("Combining {} answer(s)...", contributors),
        );
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ConsultationProgressNotifier for SimpleProgress {
    fn on_stage_change(&self, status: SessionStatus) {
        match status {
            SessionStatus::Consulting | SessionStatus::Synthesizing => {}
            other => println!("{} {}", "->".cyan(), other.display_name().bold()),
        }
    }

    fn on_consultation_start(&self, delegates: &[DelegateStatus]) {
        println!(
            "{} {} ({} specialists)",
            "->".cyan(),
            SessionStatus::Consulting.display_name().bold(),
            delegates.len()
        );
        for delegate in delegates {
            if let Some(reason) = delegate.failure_reason() {
                println!("  {} {} ({})", "x".red(), delegate.role_name, reason);
            }
        }
    }

    fn on_delegate_update(&self, _index: usize, delegate: &DelegateStatus, _total: usize) {
        match &delegate.state {
            DelegateState::Responded { .. } => println!("  {} {}", "v".green(), delegate.role_name),
            DelegateState::Failed { reason } => {
                println!("  {} {} ({})", "x".red(), delegate.role_name, reason)
            }
            DelegateState::Waiting | DelegateState::Thinking => {}
        }
    }

    fn on_synthesis_start(&self, contributors: usize) {
        println!(
            "{} {} ({} answers)",
            "->".cyan(),
            SessionStatus::Synthesizing.display_name().bold(),
            contributors
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::RoleId;

    fn status(state: DelegateState) -> DelegateStatus {
        DelegateStatus {
            node_id: None,
            role_id: RoleId::new("software_architect"),
            role_name: "Software Architect".to_string(),
            question: "Risks?".to_string(),
            state,
        }
    }

    #[test]
    fn test_reporter_counts_settled_delegates() {
        let reporter = ProgressReporter::new();
        reporter.on_consultation_start(&[
            status(DelegateState::Waiting),
            status(DelegateState::Failed {
                reason: "node creation failed".into(),
            }),
        ]);
        reporter.on_delegate_update(0, &status(DelegateState::Thinking), 2);
        reporter.on_delegate_update(
            0,
            &status(DelegateState::Responded {
                preview: "ok".into(),
            }),
            2,
        );

        let slot = reporter.panel_bar.lock().unwrap();
        let pb = slot.as_ref().unwrap();
        assert_eq!(pb.position(), 2);
        assert_eq!(pb.length(), Some(2));
    }

    #[test]
    fn test_reporter_clears_bar_on_terminal_stage() {
        let reporter = ProgressReporter::new();
        reporter.on_stage_change(SessionStatus::Proposing);
        reporter.on_consultation_start(&[status(DelegateState::Waiting)]);
        reporter.on_stage_change(SessionStatus::Cancelled);

        assert!(reporter.panel_bar.lock().unwrap().is_none());
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_updates_before_consultation_are_ignored() {
        let reporter = ProgressReporter::new();
        reporter.on_delegate_update(0, &status(DelegateState::Thinking), 1);
        assert!(reporter.panel_bar.lock().unwrap().is_none());
    }
}
