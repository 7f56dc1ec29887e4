//! Context assembly (spec §4.8 step 1): system prompt, then optional
//! memory-system injections, then the session's stored turns — all under
//! one character budget.

use sindri_domain::config::ContextConfig;
use sindri_domain::model::{Turn, TurnRole};
use sindri_domain::tool::{Message, MessageContent, Role};

use crate::injection::format_section;
use crate::report::{ContextReport, SectionReport};
use crate::truncation::{self, Section};

/// Pre-rendered excerpts from whichever memory systems are attached. Every
/// field is optional — when all are `None` the context is simply the
/// system prompt plus stored turns (spec §4.8 step 1, last sentence).
#[derive(Debug, Clone, Default)]
pub struct OptionalSections {
    pub project_structure: Option<String>,
    pub pattern_suggestions: Option<String>,
    pub semantic_memory: Option<String>,
    pub episodic_memory: Option<String>,
}

/// Assembles one iteration's message list from an agent's system prompt,
/// optional memory injections, and the session's turn history, respecting
/// `ContextConfig`'s per-section caps and working-memory floor.
pub struct ContextBuilder<'a> {
    config: &'a ContextConfig,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(config: &'a ContextConfig) -> Self {
        Self { config }
    }

    /// Build the message list the Model Client should send this iteration,
    /// along with a report of what was included/truncated/dropped.
    pub fn build(
        &self,
        system_prompt: &str,
        task_description: &str,
        sections: &OptionalSections,
        turns: &[Turn],
    ) -> (Vec<Message>, ContextReport) {
        let mut raw_sections = vec![
            ("PROJECT_STRUCTURE", &sections.project_structure, self.config.project_structure_max_chars),
            ("PATTERN_SUGGESTIONS", &sections.pattern_suggestions, self.config.pattern_suggestions_max_chars),
            ("SEMANTIC_MEMORY", &sections.semantic_memory, self.config.semantic_memory_max_chars),
            ("EPISODIC_MEMORY", &sections.episodic_memory, self.config.episodic_memory_max_chars),
        ];

        let mut built: Vec<Section> = Vec::new();
        for (name, content, max_chars) in raw_sections.drain(..) {
            let Some(content) = content else { continue };
            let raw_chars = content.len();
            let (truncated, was_truncated) = truncation::truncate_per_file(content, max_chars);
            built.push(Section {
                filename: name.to_string(),
                content: truncated,
                raw_chars,
                truncated_per_file: was_truncated,
                truncated_total_cap: false,
                included: true,
                missing: false,
            });
        }

        let sections_budget = self
            .config
            .total_budget_chars
            .saturating_sub(self.config.working_memory_floor());
        truncation::apply_total_cap(&mut built, sections_budget);

        let mut messages = Vec::new();
        messages.push(Message::system(parameterize(system_prompt, task_description)));

        let mut section_reports = Vec::new();
        let mut sections_chars = 0;
        for section in &built {
            section_reports.push(SectionReport {
                name: section.filename.clone(),
                raw_chars: section.raw_chars,
                injected_chars: if section.included { section.content.len() } else { 0 },
                truncated_per_section: section.truncated_per_file,
                truncated_total_cap: section.truncated_total_cap,
                included: section.included,
            });
            if section.included && !section.content.is_empty() {
                let formatted = format_section(&section.filename, &section.content);
                sections_chars += formatted.len();
                messages.push(Message::system(formatted));
            }
        }

        let working_memory_budget = self
            .config
            .total_budget_chars
            .saturating_sub(sections_chars);
        let (kept_turns, dropped) = select_turns(turns, working_memory_budget);
        for turn in &kept_turns {
            messages.push(turn_to_message(turn));
        }

        let total_injected_chars: usize = messages
            .iter()
            .map(|m| m.content.extract_all_text().len())
            .sum();

        let report = ContextReport {
            sections: section_reports,
            turns_included: kept_turns.len(),
            turns_dropped: dropped,
            total_injected_chars,
        };

        (messages, report)
    }
}

/// Substitute `{task}` in the system prompt if present, otherwise append a
/// `Task:` block — either way the task description ends up in the first
/// message (spec §4.8 step 1: "parameterized by the task description").
fn parameterize(system_prompt: &str, task_description: &str) -> String {
    if system_prompt.contains("{task}") {
        system_prompt.replace("{task}", task_description)
    } else {
        format!("{system_prompt}\n\nTask:\n{task_description}")
    }
}

/// Keep the most recent turns that fit in `budget_chars`, preserving
/// chronological order. Returns the kept turns and how many oldest turns
/// were dropped.
fn select_turns(turns: &[Turn], budget_chars: usize) -> (Vec<Turn>, usize) {
    let mut kept_rev = Vec::new();
    let mut used = 0;
    for turn in turns.iter().rev() {
        let cost = turn.content.len();
        if used + cost > budget_chars && !kept_rev.is_empty() {
            break;
        }
        used += cost;
        kept_rev.push(turn.clone());
    }
    let dropped = turns.len() - kept_rev.len();
    kept_rev.reverse();
    (kept_rev, dropped)
}

fn turn_to_message(turn: &Turn) -> Message {
    let role = match turn.role {
        TurnRole::User => Role::User,
        TurnRole::Assistant => Role::Assistant,
        TurnRole::Tool => Role::Tool,
        TurnRole::System => Role::System,
    };
    Message {
        role,
        content: MessageContent::Text(turn.content.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ContextConfig {
        ContextConfig {
            total_budget_chars: 1000,
            working_memory_min_share: 0.5,
            project_structure_max_chars: 200,
            pattern_suggestions_max_chars: 200,
            semantic_memory_max_chars: 200,
            episodic_memory_max_chars: 200,
        }
    }

    #[test]
    fn no_memory_system_is_just_prompt_plus_turns() {
        let cfg = config();
        let builder = ContextBuilder::new(&cfg);
        let turns = vec![Turn::new(TurnRole::User, "hello")];
        let (messages, report) = builder.build("You are X.", "do the thing", &OptionalSections::default(), &turns);
        assert_eq!(messages.len(), 2);
        assert_eq!(report.sections.len(), 0);
        assert_eq!(report.turns_included, 1);
    }

    #[test]
    fn parameterize_appends_task_when_no_placeholder() {
        let rendered = parameterize("You are X.", "write a file");
        assert!(rendered.contains("write a file"));
    }

    #[test]
    fn parameterize_substitutes_placeholder() {
        let rendered = parameterize("You are X. Task: {task}", "write a file");
        assert_eq!(rendered, "You are X. Task: write a file");
    }

    #[test]
    fn sections_are_injected_in_order() {
        let cfg = config();
        let builder = ContextBuilder::new(&cfg);
        let sections = OptionalSections {
            project_structure: Some("proj".into()),
            pattern_suggestions: Some("patterns".into()),
            semantic_memory: None,
            episodic_memory: Some("episodes".into()),
        };
        let (messages, report) = builder.build("sys", "task", &sections, &[]);
        // system prompt + 3 present sections
        assert_eq!(messages.len(), 4);
        assert_eq!(report.sections.len(), 3);
        assert_eq!(report.sections[0].name, "PROJECT_STRUCTURE");
        assert_eq!(report.sections[1].name, "PATTERN_SUGGESTIONS");
        assert_eq!(report.sections[2].name, "EPISODIC_MEMORY");
    }

    #[test]
    fn turns_truncate_oldest_first_when_over_budget() {
        let cfg = ContextConfig {
            total_budget_chars: 50,
            working_memory_min_share: 1.0,
            project_structure_max_chars: 0,
            pattern_suggestions_max_chars: 0,
            semantic_memory_max_chars: 0,
            episodic_memory_max_chars: 0,
        };
        let builder = ContextBuilder::new(&cfg);
        let turns: Vec<Turn> = (0..10)
            .map(|i| Turn::new(TurnRole::User, format!("turn number {i}")))
            .collect();
        let (messages, report) = builder.build("sys", "task", &OptionalSections::default(), &turns);
        assert!(report.turns_dropped > 0);
        assert!(messages.len() < 1 + turns.len());
        // the last turn (most recent) must be present
        let last_text = messages.last().unwrap().content.extract_all_text();
        assert_eq!(last_text, "turn number 9");
    }
}
