//! Role proposal parsing from model responses.
//!
//! The proposing model is asked for a JSON object; in practice it may wrap
//! it in a fenced block or surround it with prose, so extraction tries:
//! 1. ` ```json` (or bare ` ``` `) fenced blocks
//! 2. The entire response as JSON
//! 3. The outermost `{ ... }` span

use crate::core::error::DomainError;
use crate::role::RoleId;
use serde_json::Value;

/// One role suggested by the model, before catalog validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCandidate {
    pub role_id: RoleId,
    pub justification: String,
    pub question: String,
}

/// The model's structured panel decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProposal {
    pub needs_panel: bool,
    pub reason: String,
    /// Ranked, best fit first
    pub candidates: Vec<RoleCandidate>,
}

/// Parse a proposal from raw model text.
///
/// Candidates missing `roleId` or `question` are skipped; duplicate role ids
/// keep their first (highest ranked) occurrence.
pub fn parse_role_proposal(response: &str) -> Result<RoleProposal, DomainError> {
    let json = extract_json(response).ok_or_else(|| {
        DomainError::ProposalParse("no JSON object found in response".to_string())
    })?;
    parse_role_proposal_json(&json)
}

fn extract_json(response: &str) -> Option<Value> {
    let mut in_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```json" || trimmed == "```") {
            in_block = true;
            current_block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str::<Value>(&current_block)
                && parsed.is_object()
            {
                return Some(parsed);
            }
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    if let Ok(parsed) = serde_json::from_str::<Value>(response.trim())
        && parsed.is_object()
    {
        return Some(parsed);
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&response[start..=end])
        .ok()
        .filter(Value::is_object)
}

fn field<'a>(json: &'a Value, camel: &str, snake: &str) -> Option<&'a Value> {
    json.get(camel).or_else(|| json.get(snake))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a proposal from an already-decoded JSON value.
///
/// Expected schema:
/// ```json
/// {
///   "needsPanel": true,
///   "reason": "string",
///   "roles": [
///     { "roleId": "string", "justification": "string", "question": "string" }
///   ]
/// }
/// ```
pub fn parse_role_proposal_json(json: &Value) -> Result<RoleProposal, DomainError> {
    let needs_panel = field(json, "needsPanel", "needs_panel")
        .and_then(Value::as_bool)
        .ok_or_else(|| DomainError::ProposalParse("missing boolean `needsPanel`".to_string()))?;

    let reason = non_empty_str(json.get("reason")).unwrap_or_default();

    let mut candidates: Vec<RoleCandidate> = Vec::new();
    if let Some(roles) = json.get("roles").and_then(Value::as_array) {
        for entry in roles {
            let Some(role_id) = non_empty_str(field(entry, "roleId", "role_id")) else {
                continue;
            };
            let Some(question) = non_empty_str(entry.get("question")) else {
                continue;
            };
            let role_id = RoleId::new(role_id);
            if candidates.iter().any(|c| c.role_id == role_id) {
                continue;
            }
            candidates.push(RoleCandidate {
                role_id,
                justification: non_empty_str(entry.get("justification")).unwrap_or_default(),
                question,
            });
        }
    }

    Ok(RoleProposal {
        needs_panel,
        reason,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_json() {
        let response = r#"{
            "needsPanel": true,
            "reason": "Cross-cutting decision",
            "roles": [
                {"roleId": "software_architect", "justification": "design", "question": "Which architecture?"},
                {"roleId": "security_engineer", "justification": "risk", "question": "What are the threats?"}
            ]
        }"#;
        let proposal = parse_role_proposal(response).unwrap();
        assert!(proposal.needs_panel);
        assert_eq!(proposal.reason, "Cross-cutting decision");
        assert_eq!(proposal.candidates.len(), 2);
        assert_eq!(proposal.candidates[0].role_id.as_str(), "software_architect");
        assert_eq!(proposal.candidates[1].question, "What are the threats?");
    }

    #[test]
    fn test_parse_fenced_block_with_prose() {
        let response = "Here is my analysis.\n\n```json\n{\"needsPanel\": false, \"reason\": \"Simple factual question\", \"roles\": []}\n```\nHope that helps.";
        let proposal = parse_role_proposal(response).unwrap();
        assert!(!proposal.needs_panel);
        assert!(proposal.candidates.is_empty());
    }

    #[test]
    fn test_parse_embedded_object() {
        let response = r#"Sure: {"needs_panel": true, "reason": "r", "roles": [{"role_id": "ux_designer", "question": "How do users feel?"}]} done"#;
        let proposal = parse_role_proposal(response).unwrap();
        assert_eq!(proposal.candidates[0].role_id.as_str(), "ux_designer");
        assert_eq!(proposal.candidates[0].justification, "");
    }

    #[test]
    fn test_incomplete_and_duplicate_entries_skipped() {
        let response = r#"{"needsPanel": true, "reason": "r", "roles": [
            {"roleId": "a", "question": "first"},
            {"roleId": "", "question": "no id"},
            {"roleId": "b"},
            {"roleId": "a", "question": "duplicate"},
            {"roleId": "c", "question": "third"}
        ]}"#;
        let proposal = parse_role_proposal(response).unwrap();
        let ids: Vec<_> = proposal
            .candidates
            .iter()
            .map(|c| c.role_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(proposal.candidates[0].question, "first");
    }

    #[test]
    fn test_missing_decision_is_error() {
        assert!(parse_role_proposal(r#"{"reason": "?"}"#).is_err());
        assert!(parse_role_proposal("I think you need a lawyer.").is_err());
    }
}
