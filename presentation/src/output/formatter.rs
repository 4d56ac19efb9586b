//! Output formatter trait

use panel_domain::OrchestratorSession;

/// Trait for formatting a finished consultation
pub trait OutputFormatter {
    /// Format the whole session: panel, per-specialist status and result
    fn format(&self, session: &OrchestratorSession) -> String;

    /// Format as JSON
    fn format_json(&self, session: &OrchestratorSession) -> String;

    /// Format the combined response only (concise output)
    fn format_synthesis_only(&self, session: &OrchestratorSession) -> String;
}
