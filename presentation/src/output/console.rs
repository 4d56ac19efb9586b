//! Console output formatter for consultation results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use panel_domain::{DelegateState, OrchestratorSession, SessionStatus};

/// Formats consultation sessions for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete session
    pub fn format(session: &OrchestratorSession) -> String {
        let mut output = String::new();

        // Header
        output.push_str(&Self::header("Panel Consultation"));
        output.push('\n');

        // Question
        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            session.original_prompt().content()
        ));

        if let Some(reason) = session.proposal_reason()
            && !reason.is_empty()
        {
            output.push_str(&format!("{} {}\n\n", "Proposal:".cyan().bold(), reason));
        }

        // Panel
        if !session.delegate_statuses().is_empty() {
            output.push_str(&Self::section_header(&format!(
                "Panel: {} of {} specialists responded, {} failed",
                session.responded_count(),
                session.total_delegates(),
                session.failed_count()
            )));
            for delegate in session.delegate_statuses() {
                let title = format!("── {} ──", delegate.role_name);
                match &delegate.state {
                    DelegateState::Responded { preview } => {
                        output.push_str(&format!(
                            "\n{}\n{}\n{}\n",
                            title.yellow().bold(),
                            Self::indent(&delegate.question, "  Q: ").dimmed(),
                            Self::indent(preview, "  ")
                        ));
                    }
                    DelegateState::Failed { reason } => {
                        output.push_str(&format!(
                            "\n{}\n{}\n  Error: {}\n",
                            title.red().bold(),
                            Self::indent(&delegate.question, "  Q: ").dimmed(),
                            reason
                        ));
                    }
                    DelegateState::Waiting | DelegateState::Thinking => {
                        output.push_str(&format!(
                            "\n{}\n  ({})\n",
                            title.dimmed(),
                            delegate.state.as_str()
                        ));
                    }
                }
            }
        } else if !session.proposed_roles().is_empty() {
            output.push_str(&Self::section_header("Proposed Panel"));
            for role in session.proposed_roles() {
                let mark = if role.is_approved { "[x]" } else { "[ ]" };
                output.push_str(&format!("  {} {}\n", mark, role.role_name));
            }
        }

        // Result
        output.push_str(&Self::section_header(&format!(
            "Result: {}",
            session.status().display_name()
        )));
        output.push('\n');
        output.push_str(&Self::result_body(session));
        output.push('\n');

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(session: &OrchestratorSession) -> String {
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the combined response only (concise output)
    pub fn format_synthesis_only(session: &OrchestratorSession) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Panel Answer ===".cyan().bold()
        ));

        output.push_str(&format!(
            "{} {}\n\n",
            "Q:".bold(),
            session.original_prompt().content()
        ));

        let consulted: Vec<&str> = session
            .delegate_statuses()
            .iter()
            .filter(|d| matches!(d.state, DelegateState::Responded { .. }))
            .map(|d| d.role_name.as_str())
            .collect();
        if !consulted.is_empty() {
            output.push_str(&format!(
                "{} {}\n\n",
                "Specialists consulted:".dimmed(),
                consulted.join(", ")
            ));
        }

        output.push_str(&Self::result_body(session));
        output.push('\n');

        output
    }

    fn result_body(session: &OrchestratorSession) -> String {
        match session.status() {
            SessionStatus::Completed => match session.final_response() {
                Some(response) => response.to_string(),
                None => format!(
                    "{} {}",
                    "No panel needed:".green(),
                    session.proposal_reason().unwrap_or_default()
                ),
            },
            SessionStatus::Failed => format!(
                "{} {}",
                "Error:".red().bold(),
                session.error_message().unwrap_or("unknown error")
            ),
            SessionStatus::Cancelled => format!("{}", "Consultation cancelled.".yellow()),
            other => format!("{} {}", "Stopped while".dimmed(), other.display_name()),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, session: &OrchestratorSession) -> String {
        Self::format(session)
    }

    fn format_json(&self, session: &OrchestratorSession) -> String {
        Self::format_json(session)
    }

    fn format_synthesis_only(&self, session: &OrchestratorSession) -> String {
        Self::format_synthesis_only(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::{NodeId, ProjectId, ProposedRole, Question, RoleId, SpawnedDelegate};

    fn session() -> OrchestratorSession {
        OrchestratorSession::new(
            NodeId::new("master"),
            ProjectId::new("default"),
            Question::new("Should we shard the database?").unwrap(),
        )
    }

    fn spawned(role: &str, failure: Option<&str>) -> SpawnedDelegate {
        SpawnedDelegate {
            role_id: RoleId::new(role),
            role_name: role.to_string(),
            question: format!("{role}?"),
            node_id: failure.is_none().then(|| NodeId::new(format!("n-{role}"))),
            master_to_delegate_edge: None,
            delegate_to_master_edge: None,
            failure: failure.map(str::to_string),
        }
    }

    fn completed_session() -> OrchestratorSession {
        let mut s = session();
        s.record_proposal(
            "Scaling touches several areas",
            vec![
                ProposedRole::new(RoleId::new("architect"), "architect", "", "architect?"),
                ProposedRole::new(RoleId::new("dba"), "dba", "", "dba?"),
            ],
        )
        .unwrap();
        s.approve().unwrap();
        s.record_spawn(vec![spawned("architect", None), spawned("dba", Some("node creation failed"))])
            .unwrap();
        s.update_delegate_status(0, DelegateState::Thinking).unwrap();
        s.update_delegate_status(
            0,
            DelegateState::Responded {
                preview: "Shard by tenant".into(),
            },
        )
        .unwrap();
        s.begin_synthesis().unwrap();
        s.complete("Shard by tenant id once writes exceed one primary.").unwrap();
        s
    }

    #[test]
    fn test_full_format_lists_panel_and_answer() {
        colored::control::set_override(false);
        let out = ConsoleFormatter::format(&completed_session());

        assert!(out.contains("Should we shard the database?"));
        assert!(out.contains("Panel: 1 of 2 specialists responded, 1 failed"));
        assert!(out.contains("Shard by tenant"));
        assert!(out.contains("Error: node creation failed"));
        assert!(out.contains("Result: Completed"));
        assert!(out.contains("once writes exceed one primary"));
    }

    #[test]
    fn test_synthesis_only_names_contributors() {
        colored::control::set_override(false);
        let out = ConsoleFormatter::format_synthesis_only(&completed_session());

        assert!(out.contains("Specialists consulted: architect"));
        assert!(!out.contains("dba,"));
        assert!(out.ends_with("one primary.\n"));
    }

    #[test]
    fn test_no_panel_result_shows_reason() {
        colored::control::set_override(false);
        let mut s = session();
        s.complete_without_panel("A single factual lookup").unwrap();

        let out = ConsoleFormatter::format_synthesis_only(&s);
        assert!(out.contains("No panel needed: A single factual lookup"));
    }

    #[test]
    fn test_failed_and_cancelled_results() {
        colored::control::set_override(false);
        let mut failed = session();
        failed.fail("proposal was not valid JSON").unwrap();
        assert!(ConsoleFormatter::format(&failed).contains("Error: proposal was not valid JSON"));

        let mut cancelled = session();
        cancelled.cancel().unwrap();
        assert!(ConsoleFormatter::format(&cancelled).contains("Consultation cancelled."));
    }

    #[test]
    fn test_json_contains_status_and_delegates() {
        let json = ConsoleFormatter::format_json(&completed_session());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "completed");
        assert_eq!(value["delegate_statuses"][0]["status"], "responded");
        assert_eq!(value["delegate_statuses"][1]["reason"], "node creation failed");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
