//! Render reports as Bot API HTML messages and inline keyboards.

use crate::domain::{Accent, Button, Report};
use serde_json::{Value, json};

/// Bot API limit for message text.
pub const MESSAGE_LIMIT: usize = 4096;
/// Bot API limit for photo and document captions.
pub const CAPTION_LIMIT: usize = 1024;

const ELLIPSIS: char = '…';

/// Length as the Bot API measures it: UTF-16 code units. Counted on the
/// marked-up text, so tags and entities are overcounted.
pub fn api_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Bold,
    Italic,
}

struct Piece {
    text: String,
    style: Style,
}

impl Piece {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn tags(&self) -> (&'static str, &'static str) {
        match self.style {
            Style::Plain => ("", ""),
            Style::Bold => ("<b>", "</b>"),
            Style::Italic => ("<i>", "</i>"),
        }
    }

    fn render(&self, out: &mut String) {
        let (open, close) = self.tags();
        out.push_str(open);
        out.push_str(&escape(&self.text));
        out.push_str(close);
    }

    /// Render as much as fits in `budget` units, ending in an ellipsis.
    fn render_within(&self, out: &mut String, budget: usize) {
        let (open, close) = self.tags();
        let overhead = open.len() + close.len() + 1;
        if budget <= overhead {
            return;
        }
        let mut room = budget - overhead;
        out.push_str(open);
        for c in self.text.chars() {
            let esc = escape_char(c);
            let width = api_len(&esc);
            if width > room {
                break;
            }
            room -= width;
            out.push_str(&esc);
        }
        out.push(ELLIPSIS);
        out.push_str(close);
    }
}

fn escape_char(c: char) -> String {
    match c {
        '&' => "&amp;".to_string(),
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        other => other.to_string(),
    }
}

pub fn escape(text: &str) -> String {
    text.chars().map(escape_char).collect()
}

fn accent_marker(accent: Accent) -> &'static str {
    match accent {
        Accent::Green => "🟢",
        Accent::Orange => "🟠",
        Accent::Red => "🔴",
        Accent::Grey => "⚫",
        Accent::Silver => "⚪",
    }
}

/// Split `**bold**` markup into pieces.
fn markdown_pieces(text: &str, pieces: &mut Vec<Piece>) {
    let parts: Vec<&str> = text.split("**").collect();
    let balanced = parts.len() % 2 == 1;
    for (i, part) in parts.iter().enumerate() {
        let unclosed_tail = !balanced && i == parts.len() - 1;
        if unclosed_tail {
            pieces.push(Piece::new(format!("**{}", part), Style::Plain));
        } else if i % 2 == 1 {
            pieces.push(Piece::new(*part, Style::Bold));
        } else if !part.is_empty() {
            pieces.push(Piece::new(*part, Style::Plain));
        }
    }
}

fn body_pieces(report: &Report) -> Vec<Piece> {
    let mut pieces = vec![
        Piece::new(format!("{} ", accent_marker(report.accent)), Style::Plain),
        Piece::new(report.title.as_str(), Style::Bold),
    ];
    if let Some(desc) = &report.description {
        pieces.push(Piece::new("\n\n", Style::Plain));
        markdown_pieces(desc, &mut pieces);
    }
    if !report.fields.is_empty() {
        pieces.push(Piece::new("\n", Style::Plain));
    }
    for field in &report.fields {
        pieces.push(Piece::new("\n", Style::Plain));
        pieces.push(Piece::new(format!("{}:", field.name), Style::Bold));
        let sep = if field.inline || !field.value.contains('\n') {
            " "
        } else {
            "\n"
        };
        pieces.push(Piece::new(format!("{}{}", sep, field.value), Style::Plain));
    }
    pieces
}

/// Render `report` as HTML within `limit` Bot API units. The footer is always kept.
pub fn render_html(report: &Report, limit: usize) -> String {
    let mut footer = String::from("\n\n");
    Piece::new(report.footer.as_str(), Style::Italic).render(&mut footer);
    let budget = limit.saturating_sub(api_len(&footer));

    let mut out = String::new();
    let mut used = 0;
    for piece in body_pieces(report) {
        let mut rendered = String::new();
        piece.render(&mut rendered);
        let width = api_len(&rendered);
        if used + width > budget {
            piece.render_within(&mut out, budget - used);
            break;
        }
        used += width;
        out.push_str(&rendered);
    }
    out.push_str(&footer);
    out
}

/// Inline keyboard markup, one row. An empty slice clears existing buttons.
pub fn inline_keyboard(buttons: &[Button]) -> Value {
    let row: Vec<Value> = buttons
        .iter()
        .map(|b| json!({ "text": b.label, "callback_data": b.data }))
        .collect();
    let rows: Vec<Vec<Value>> = if row.is_empty() { vec![] } else { vec![row] };
    json!({ "inline_keyboard": rows })
}
