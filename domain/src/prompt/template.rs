//! Prompt templates for the consultation flow

use crate::role::RoleDefinition;

/// Templates for the proposal and synthesis calls.
///
/// Delegates are prompted with their tailored question as-is and the
/// role's level-specific system prompt, so they need no template here.
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the role proposal call
    pub fn proposal_system() -> &'static str {
        r#"You are a staffing coordinator deciding whether a question benefits from a panel of specialists.
You only ever answer with a single JSON object and no other text.
Prefer a small, focused panel. Never invent role ids that are not in the catalog."#
    }

    /// User prompt asking the model to propose a ranked panel
    pub fn proposal_prompt(question: &str, catalog: &[RoleDefinition], max_roles: usize) -> String {
        let mut prompt = format!(
            r#"Analyze the following question and decide whether it should be answered by a panel of specialists.

Question:
{}

Available roles (id: name - description):
"#,
            question
        );

        for role in catalog {
            prompt.push_str(&format!(
                "- {}: {} - {}\n",
                role.id, role.name, role.description
            ));
        }

        prompt.push_str(&format!(
            r#"
Respond with JSON in exactly this shape:
{{
  "needsPanel": true,
  "reason": "why a panel is or is not needed",
  "roles": [
    {{"roleId": "<id from the list>", "justification": "why this specialist", "question": "the sub-question tailored to this specialist"}}
  ]
}}

Rules:
1. Rank roles best fit first; propose at most {} roles.
2. Each question must be self-contained and specific to that specialist's expertise.
3. If a single direct answer suffices, set "needsPanel" to false and leave "roles" empty."#,
            max_roles
        ));

        prompt
    }

    /// System prompt for the synthesis call
    pub fn synthesis_system() -> &'static str {
        r#"You are a lead advisor combining the answers of several specialists into one response.
Be balanced and objective. Give weight to well-reasoned arguments regardless of source.
Write for the person who asked the original question."#
    }

    /// User prompt for synthesis.
    ///
    /// `responses` are `(role name, full response)` pairs in delegate order;
    /// `failed_count` specialists did not answer and are omitted.
    pub fn synthesis_prompt(
        question: &str,
        responses: &[(String, String)],
        failed_count: usize,
    ) -> String {
        let mut prompt = format!(
            r#"Original question:
{}

The following specialists were consulted. Their answers are below.
"#,
            question
        );

        for (role_name, content) in responses {
            prompt.push_str(&format!("\n### {}\n{}\n", role_name, content.trim_end()));
        }

        if failed_count > 0 {
            prompt.push_str(&format!(
                "\nNote: {} other specialist(s) did not respond; do not speculate about their views.\n",
                failed_count
            ));
        }

        prompt.push_str(
            r#"
Write a single combined answer that:
1. Integrates the specialists' perspectives into one coherent response
2. Surfaces the points where the specialists agree
3. Resolves conflicting advice with a clear recommendation and its rationale
4. Ends with concrete, actionable next steps

Format your response with clear markdown headers."#,
        );

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_prompt_lists_catalog() {
        let catalog = vec![
            RoleDefinition::new("software_architect", "Software Architect", "System design", "..."),
            RoleDefinition::new("legal_advisor", "Legal Advisor", "Regulation", "..."),
        ];
        let prompt = PromptTemplate::proposal_prompt("Should we store EU data in the US?", &catalog, 4);
        assert!(prompt.contains("Should we store EU data in the US?"));
        assert!(prompt.contains("- software_architect: Software Architect - System design"));
        assert!(prompt.contains("- legal_advisor: Legal Advisor"));
        assert!(prompt.contains("at most 4 roles"));
        assert!(prompt.contains("\"needsPanel\""));
    }

    #[test]
    fn test_synthesis_prompt_sections_in_order() {
        let responses = vec![
            ("Security Engineer".to_string(), "Encrypt at rest.".to_string()),
            ("Legal Advisor".to_string(), "GDPR applies.".to_string()),
        ];
        let prompt = PromptTemplate::synthesis_prompt("Where to host?", &responses, 0);
        let security = prompt.find("### Security Engineer").unwrap();
        let legal = prompt.find("### Legal Advisor").unwrap();
        assert!(security < legal);
        assert!(prompt.contains("actionable next steps"));
        assert!(!prompt.contains("did not respond"));
    }

    #[test]
    fn test_synthesis_prompt_is_deterministic() {
        let responses = vec![("A".to_string(), "one".to_string())];
        assert_eq!(
            PromptTemplate::synthesis_prompt("q", &responses, 1),
            PromptTemplate::synthesis_prompt("q", &responses, 1)
        );
        assert!(PromptTemplate::synthesis_prompt("q", &responses, 1).contains("1 other specialist(s)"));
    }
}
