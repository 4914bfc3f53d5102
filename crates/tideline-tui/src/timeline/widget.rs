//! Content rendering seam
//!
//! The timeline only cares that an item can report its height at a width and
//! produce that many lines; what the lines look like is someone else's
//! problem. [`TextItemWidget`] is the stock plain-text implementation.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use tideline_core::{EventPayload, RawEvent, RenderItem, Role};

/// Renderable timeline item
pub trait ItemRenderable: Send + Sync {
    /// Rendered height at `width`, in rows
    fn line_count(&self, width: u16) -> usize;

    /// The rendered rows at `width`; length must equal `line_count(width)`
    fn lines(&self, width: u16) -> Vec<Line<'static>>;
}

/// Plain-text rendering of a render item
pub struct TextItemWidget {
    item: RenderItem,
}

impl TextItemWidget {
    pub fn new(item: RenderItem) -> Self {
        Self { item }
    }

    fn event_lines(event: &RawEvent, width: u16, indent: &str) -> Vec<Line<'static>> {
        let (prefix, style) = match &event.payload {
            EventPayload::Message { role: Role::User, .. } => ("you: ", Style::default().add_modifier(Modifier::BOLD)),
            EventPayload::Message { role: Role::Agent, .. } => ("agent: ", Style::default()),
            EventPayload::Message { role: Role::System, .. } => ("sys: ", Style::default().add_modifier(Modifier::DIM)),
            EventPayload::ToolCall { .. } => ("tool: ", Style::default().add_modifier(Modifier::ITALIC)),
            EventPayload::Status { .. } => ("* ", Style::default().add_modifier(Modifier::DIM)),
        };

        let body = match &event.payload {
            EventPayload::Message { text, .. } | EventPayload::Status { text } => text.clone(),
            EventPayload::ToolCall { name, output, .. } => match output {
                Some(output) => format!("{name}\n{output}"),
                None => format!("{name} ..."),
            },
        };

        let wrap_width = usize::from(width.max(1)).saturating_sub(indent.len() + prefix.len()).max(1);
        let mut lines = Vec::new();
        for (i, raw_line) in body.lines().enumerate() {
            if raw_line.is_empty() {
                lines.push(Line::from(String::new()));
                continue;
            }
            for wrapped in textwrap::wrap(raw_line, wrap_width) {
                let head = if i == 0 && lines.is_empty() {
                    format!("{indent}{prefix}")
                } else {
                    " ".repeat(indent.len() + prefix.len())
                };
                lines.push(Line::from(vec![
                    Span::styled(head, style),
                    Span::raw(wrapped.into_owned()),
                ]));
            }
        }
        if lines.is_empty() {
            lines.push(Line::from(format!("{indent}{prefix}")));
        }
        lines
    }
}

impl ItemRenderable for TextItemWidget {
    fn line_count(&self, width: u16) -> usize {
        self.lines(width).len()
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        match &self.item {
            RenderItem::Single { event } => Self::event_lines(event, width, ""),
            RenderItem::TurnGroup { events, .. } => {
                let mut lines = vec![Line::from(Span::styled(
                    format!("▸ agent turn · {} steps", events.len()),
                    Style::default().add_modifier(Modifier::BOLD),
                ))];
                for event in events {
                    lines.extend(Self::event_lines(event, width, "  "));
                }
                lines
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tideline_core::RawEvent;

    #[test]
    fn test_single_message_is_one_line_when_short() {
        let widget = TextItemWidget::new(RenderItem::Single {
            event: RawEvent::message("a", 0, Role::User, "hello"),
        });
        assert_eq!(widget.line_count(80), 1);
    }

    #[test]
    fn test_long_text_wraps_to_width() {
        let text = "word ".repeat(50);
        let widget = TextItemWidget::new(RenderItem::Single {
            event: RawEvent::message("a", 0, Role::Agent, text),
        });
        let narrow = widget.line_count(20);
        let wide = widget.line_count(200);
        assert!(narrow > wide);
        assert_eq!(widget.lines(20).len(), narrow, "line_count must match lines");
    }

    #[test]
    fn test_turn_group_has_header_plus_members() {
        let events = vec![
            RawEvent::message("a", 0, Role::Agent, "step one").with_turn("t"),
            RawEvent::message("b", 1, Role::Agent, "step two").with_turn("t"),
        ];
        let widget = TextItemWidget::new(RenderItem::TurnGroup {
            id: "turn-a".to_string(),
            events,
        });
        assert_eq!(widget.line_count(80), 3);
    }

    #[test]
    fn test_tool_call_output_adds_lines() {
        let pending = TextItemWidget::new(RenderItem::Single {
            event: RawEvent {
                id: "t1".into(),
                sequence: 0,
                turn_id: None,
                payload: EventPayload::ToolCall {
                    name: "bash".to_string(),
                    arguments: serde_json::json!({}),
                    output: None,
                },
            },
        });
        let done = TextItemWidget::new(RenderItem::Single {
            event: RawEvent {
                id: "t1".into(),
                sequence: 0,
                turn_id: None,
                payload: EventPayload::ToolCall {
                    name: "bash".to_string(),
                    arguments: serde_json::json!({}),
                    output: Some("line1\nline2".to_string()),
                },
            },
        });
        assert!(done.line_count(80) > pending.line_count(80));
    }
}
