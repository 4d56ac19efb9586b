//! Progress notification port
//!
//! Defines the interface for reporting progress during a consultation.
//! Observers that prefer polling can subscribe to the session handle
//! instead; these callbacks fire after the corresponding mutation.

use panel_domain::{DelegateStatus, SessionStatus};

/// Callback for progress updates during a consultation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, canvas, etc.)
pub trait ConsultationProgressNotifier: Send + Sync {
    /// Called after the session enters a new status
    fn on_stage_change(&self, status: SessionStatus);

    /// Called after a delegate's state changes
    fn on_delegate_update(&self, index: usize, delegate: &DelegateStatus, total: usize);

    /// Called once delegates are spawned and consultation starts
    fn on_consultation_start(&self, _delegates: &[DelegateStatus]) {}

    /// Called when synthesis starts with the number of contributing answers
    fn on_synthesis_start(&self, _contributors: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ConsultationProgressNotifier for NoProgress {
    fn on_stage_change(&self, _status: SessionStatus) {}
    fn on_delegate_update(&self, _index: usize, _delegate: &DelegateStatus, _total: usize) {}
}
