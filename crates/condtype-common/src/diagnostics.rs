//! Diagnostic codes, message templates and the rendered form handed to hosts.
//!
//! Templates use positional `{N}` placeholders filled by [`format_message`].

pub mod data;

pub use data::{diagnostic_codes, diagnostic_messages};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

/// One row of the message table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

impl DiagnosticMessage {
    pub fn lookup(code: u32) -> Option<&'static DiagnosticMessage> {
        data::DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn new(category: DiagnosticCategory, code: u32, message_text: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message_text: message_text.into(),
        }
    }

    pub fn error(message: impl Into<String>, code: u32) -> Self {
        Self::new(DiagnosticCategory::Error, code, message)
    }

    pub fn warning(message: impl Into<String>, code: u32) -> Self {
        Self::new(DiagnosticCategory::Warning, code, message)
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    DiagnosticMessage::lookup(code).map(|m| m.message)
}

pub fn get_category(code: u32) -> Option<DiagnosticCategory> {
    DiagnosticMessage::lookup(code).map(|m| m.category)
}

/// Placeholders without a matching argument are left in place.
pub fn format_message(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_owned(), |text, (index, arg)| {
            text.replace(&format!("{{{index}}}"), arg)
        })
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
