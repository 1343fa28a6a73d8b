//! Platform-neutral reply model. Front-ends render these; the engine never sees them.

use crate::domain::risk::RiskLevel;

/// Footer stamped on every report.
pub const REPORT_FOOTER: &str = "Information extracted from ISB database.";

/// Accent colour of a report, as RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Green,
    Orange,
    Red,
    Grey,
    Silver,
}

impl Accent {
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Accent::Green,
            RiskLevel::Medium => Accent::Orange,
            RiskLevel::High => Accent::Red,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Accent::Green => (0x00, 0xFF, 0x00),
            Accent::Orange => (0xFF, 0xA5, 0x00),
            Accent::Red => (0xFF, 0x00, 0x00),
            Accent::Grey => (0x80, 0x80, 0x80),
            Accent::Silver => (0xC0, 0xC0, 0xC0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// File sent along with a report (e.g. the badge chart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub description: Option<String>,
    pub accent: Accent,
    pub fields: Vec<ReportField>,
    pub footer: String,
    pub attachment: Option<Attachment>,
}

impl Report {
    pub fn new(title: impl Into<String>, accent: Accent) -> Self {
        Self {
            title: title.into(),
            description: None,
            accent,
            fields: Vec::new(),
            footer: REPORT_FOOTER.to_string(),
            attachment: None,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(ReportField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = text.into();
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// What a command produces: one report, or pages browsed with Previous/Next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Single(Report),
    Paged(Vec<Report>),
}
