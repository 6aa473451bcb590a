//! Deterministic prompt assembly.
//!
//! One [`ContextDocument`] per turn, rendered into a single prompt body
//! with a fixed section order:
//!
//! 1. `# Coach Persona`                      (always)
//! 2. `# User Context`                      (omitted when empty)
//! 3. `# Memory Summary`                    (omitted when absent)
//! 4. `# Session Context`                   (always)
//! 5. `# Recent Conversation (windowed)`    (omitted when empty)
//! 6. `# Current Turn`                      (always, never empty)
//!
//! Rendering is a pure function of the document: identical inputs produce
//! byte-identical output. Anything time-dependent (mood age, summary
//! dates) is resolved by the block renderers before the document is built.

use wp_domain::model::Sender;

/// Maximum number of prior messages rendered into the recent-conversation
/// section.
pub const RECENT_WINDOW: usize = 10;

/// One prior transcript line, already reduced to speaker + content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub sender: Sender,
    pub content: String,
}

impl TranscriptLine {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
        }
    }

    fn render(&self) -> String {
        format!("{}: {}", self.sender.speaker_label(), self.content)
    }
}

/// Everything the assembler needs for one turn.
#[derive(Debug, Clone)]
pub struct ContextDocument {
    /// Rendered persona prompt (system catalog or authored).
    pub persona_prompt: String,
    /// Profile facts, goals, commitments, patterns, memories, mood and
    /// summaries. Empty string omits the section.
    pub user_context: String,
    /// Latest rolling conversation-memory summary, if one exists.
    pub memory_summary: Option<String>,
    /// Coach/mode/session-type header plus behavioral and sentiment or
    /// crisis guidance.
    pub session_context: String,
    /// Prior persisted messages, oldest first. Only the trailing
    /// [`RECENT_WINDOW`] entries are rendered.
    pub recent_messages: Vec<TranscriptLine>,
    /// The incoming user message. Validated non-empty upstream; an
    /// all-whitespace message must never reach the assembler.
    pub user_message: String,
}

impl ContextDocument {
    /// Render the ordered prompt body. Sections are joined by one blank
    /// line; optional sections are skipped entirely when empty.
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::with_capacity(6);

        sections.push(format!("# Coach Persona\n{}", self.persona_prompt));

        let user_context = self.user_context.trim();
        if !user_context.is_empty() {
            sections.push(format!("# User Context\n{user_context}"));
        }

        if let Some(memory) = self.memory_summary.as_deref() {
            let memory = memory.trim();
            if !memory.is_empty() {
                sections.push(format!("# Memory Summary\n{memory}"));
            }
        }

        let session_context = self.session_context.trim();
        if !session_context.is_empty() {
            sections.push(format!("# Session Context\n{session_context}"));
        }

        if !self.recent_messages.is_empty() {
            let start = self.recent_messages.len().saturating_sub(RECENT_WINDOW);
            let history = self.recent_messages[start..]
                .iter()
                .map(TranscriptLine::render)
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("# Recent Conversation (windowed)\n{history}"));
        }

        sections.push(format!("# Current Turn\nUser: {}", self.user_message));

        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> ContextDocument {
        ContextDocument {
            persona_prompt: "You are the Clarity Coach.".into(),
            user_context: "USER CONTEXT:\n- User id: u1".into(),
            memory_summary: Some("COACHING MEMORY SUMMARY:\n- Summary: early days".into()),
            session_context: "CURRENT SESSION:\n- Coach: Clarity Coach".into(),
            recent_messages: vec![
                TranscriptLine::new(Sender::User, "I feel stuck"),
                TranscriptLine::new(Sender::Coach, "Say more about that?"),
            ],
            user_message: "It's mostly about work".into(),
        }
    }

    #[test]
    fn renders_all_sections_in_fixed_order() {
        let out = doc().render();
        let order = [
            "# Coach Persona",
            "# User Context",
            "# Memory Summary",
            "# Session Context",
            "# Recent Conversation (windowed)",
            "# Current Turn",
        ];
        let mut last = 0;
        for header in order {
            let idx = out.find(header).unwrap_or_else(|| panic!("missing {header}"));
            assert!(idx >= last, "{header} out of order");
            last = idx;
        }
        assert!(out.ends_with("# Current Turn\nUser: It's mostly about work"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let d = doc();
        assert_eq!(d.render(), d.render());
        assert_eq!(d.render(), d.clone().render());
    }

    #[test]
    fn empty_optional_sections_are_omitted() {
        let mut d = doc();
        d.user_context = "   ".into();
        d.memory_summary = None;
        d.recent_messages.clear();
        let out = d.render();
        assert!(!out.contains("# User Context"));
        assert!(!out.contains("# Memory Summary"));
        assert!(!out.contains("# Recent Conversation"));
        assert!(out.contains("# Coach Persona"));
        assert!(out.contains("# Session Context"));
        assert!(out.contains("# Current Turn"));
    }

    #[test]
    fn blank_memory_summary_is_omitted() {
        let mut d = doc();
        d.memory_summary = Some("  \n ".into());
        assert!(!d.render().contains("# Memory Summary"));
    }

    #[test]
    fn recent_window_caps_at_ten_oldest_dropped() {
        let mut d = doc();
        d.recent_messages = (0..25)
            .map(|i| TranscriptLine::new(Sender::User, format!("msg-{i}")))
            .collect();
        let out = d.render();
        let recent = out
            .split("# Recent Conversation (windowed)\n")
            .nth(1)
            .unwrap()
            .split("\n\n")
            .next()
            .unwrap();
        let lines: Vec<_> = recent.lines().collect();
        assert_eq!(lines.len(), RECENT_WINDOW);
        assert_eq!(lines[0], "User: msg-15");
        assert_eq!(lines[9], "User: msg-24");
    }

    #[test]
    fn sections_are_separated_by_one_blank_line() {
        let out = doc().render();
        assert!(out.contains("# Coach Persona\nYou are the Clarity Coach.\n\n# User Context"));
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn speaker_labels_match_senders() {
        let line = TranscriptLine::new(Sender::Coach, "hello");
        assert_eq!(line.render(), "Coach: hello");
        let line = TranscriptLine::new(Sender::User, "hi");
        assert_eq!(line.render(), "User: hi");
    }
}
