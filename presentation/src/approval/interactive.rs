//! Interactive panel approval for the terminal.
//!
//! Shows the proposed specialists and lets the user deselect the ones
//! they do not want before the consultation starts.
//!
//! # User Interface
//!
//! ```text
//! ═══════════════════════════════════════════════════════════════
//!   Proposed Panel
//! ═══════════════════════════════════════════════════════════════
//!
//! Question:
//!   Should we move billing to event sourcing?
//!
//! Why a panel:
//!   Architecture, cost and compliance all matter here.
//!
//!   [x] 1. Software Architect
//!          Owns the migration design
//!          Q: What are the main migration risks?
//!   [ ] 2. Legal Advisor
//!          ...
//!
//! Commands: <numbers> toggle, a all, n none, Enter confirm, q cancel
//!
//! panel>
//! ```

use async_trait::async_trait;
use colored::Colorize;
use panel_application::ports::approval::{ApprovalDecision, ApprovalError, ApprovalPort};
use panel_domain::core::string::truncate;
use panel_domain::{ApprovalGate, ProposedRole, RoleId};
use std::io::{self, Write};

/// A parsed line of user input at the approval prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// 1-based positions to flip
    Toggle(Vec<usize>),
    All,
    None,
    Confirm,
    Cancel,
    Help,
    Unknown(String),
}

impl Command {
    fn parse(input: &str, role_count: usize) -> Self {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" | "/confirm" | "confirm" => Command::Confirm,
            "q" | "quit" | "/cancel" | "cancel" => Command::Cancel,
            "a" | "all" => Command::All,
            "n" | "none" => Command::None,
            "?" | "h" | "help" => Command::Help,
            other => {
                let positions: Option<Vec<usize>> = other
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<usize>().ok())
                    .collect();
                match positions {
                    Some(p) if !p.is_empty() && p.iter().all(|n| (1..=role_count).contains(n)) => {
                        Command::Toggle(p)
                    }
                    _ => Command::Unknown(other.to_string()),
                }
            }
        }
    }
}

/// Terminal-based [`ApprovalPort`]
pub struct InteractiveApproval;

impl InteractiveApproval {
    pub fn new() -> Self {
        Self
    }

    fn display_header(&self, prompt: &str, reason: &str) {
        let rule = "═══════════════════════════════════════════════════════════════";
        println!();
        println!("{}", rule.cyan().bold());
        println!("{}", "  Proposed Panel".cyan().bold());
        println!("{}", rule.cyan().bold());
        println!();
        println!("{}", "Question:".cyan().bold());
        println!("  {}", truncate(prompt, 200).dimmed());
        if !reason.is_empty() {
            println!();
            println!("{}", "Why a panel:".cyan().bold());
            println!("  {}", reason);
        }
    }

    fn display_roles(&self, roles: &[ProposedRole]) {
        println!();
        for (i, role) in roles.iter().enumerate() {
            let mark = if role.is_approved {
                "[x]".green().bold()
            } else {
                "[ ]".dimmed()
            };
            println!("  {} {}. {}", mark, i + 1, role.role_name.bold());
            if !role.justification.is_empty() {
                println!("         {}", truncate(&role.justification, 100).dimmed());
            }
            println!("         Q: {}", truncate(&role.tailored_question, 100));
        }
        println!();
    }

    fn display_help(&self) {
        println!("{}", "Commands:".cyan().bold());
        println!("  {}  - Toggle specialists (e.g. `2` or `1 3`)", "<numbers>".yellow());
        println!("  {}          - Select all", "a".yellow());
        println!("  {}          - Select none", "n".yellow());
        println!("  {}      - Consult the selected specialists", "Enter".green());
        println!("  {}          - Cancel the consultation", "q".red());
        println!();
    }

    /// Read user command
    fn read_command(&self) -> Result<String, ApprovalError> {
        print!("{} ", "panel>".magenta().bold());
        io::stdout()
            .flush()
            .map_err(|e| ApprovalError::IoError(format!("Failed to flush stdout: {}", e)))?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .map_err(|e| ApprovalError::IoError(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            // EOF: treat a closed stdin as a cancel rather than spinning
            return Ok("q".to_string());
        }

        Ok(input)
    }
}

impl Default for InteractiveApproval {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApprovalPort for InteractiveApproval {
    async fn review(
        &self,
        prompt: &str,
        reason: &str,
        roles: &[ProposedRole],
    ) -> Result<ApprovalDecision, ApprovalError> {
        let mut selection = roles.to_vec();
        self.display_header(prompt, reason);
        self.display_roles(&selection);
        self.display_help();

        loop {
            let input = self.read_command()?;

            match Command::parse(&input, selection.len()) {
                Command::Toggle(positions) => {
                    let ids: Vec<RoleId> = positions
                        .iter()
                        .map(|p| selection[p - 1].role_id.clone())
                        .collect();
                    let mut gate = ApprovalGate::new(&mut selection);
                    for role_id in &ids {
                        gate.toggle(role_id);
                    }
                    self.display_roles(&selection);
                }
                Command::All => {
                    ApprovalGate::new(&mut selection).set_all(true);
                    self.display_roles(&selection);
                }
                Command::None => {
                    ApprovalGate::new(&mut selection).set_all(false);
                    self.display_roles(&selection);
                }
                Command::Confirm => {
                    let approved = ApprovalGate::approved_subset(&selection);
                    if approved.is_empty() {
                        println!(
                            "{} Select at least one specialist, or `q` to cancel.",
                            "!".yellow().bold()
                        );
                        continue;
                    }
                    println!(
                        "{} Consulting {} specialist(s)...",
                        "->".green(),
                        approved.len()
                    );
                    return Ok(ApprovalDecision::Confirm {
                        approved: approved.into_iter().map(|r| r.role_id).collect(),
                    });
                }
                Command::Cancel => {
                    println!("{} Consultation cancelled.", "x".red());
                    return Ok(ApprovalDecision::Cancel);
                }
                Command::Help => self.display_help(),
                Command::Unknown(text) => {
                    println!("{} Unknown command: {}", "?".yellow(), text);
                }
            }
        }
    }
}
