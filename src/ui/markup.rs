//! Escaping and reusable markup pieces.

use std::fmt::Write;

use crate::view::RiskLevel;

/// Escape text for use in element content and quoted attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Badge visual variant, one per risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    /// Success/positive badge.
    Success,
    /// Warning badge.
    Warning,
    /// Error/destructive badge.
    Error,
}

impl BadgeVariant {
    /// Get CSS classes for this variant.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Success => "bg-success text-white",
            Self::Warning => "bg-warning text-black",
            Self::Error => "bg-danger text-white",
        }
    }
}

impl From<RiskLevel> for BadgeVariant {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Self::Success,
            RiskLevel::Medium => Self::Warning,
            RiskLevel::High => Self::Error,
        }
    }
}

/// Rounded status badge.
#[must_use]
pub fn badge(variant: BadgeVariant, label: &str) -> String {
    format!(
        r#"<span class="badge inline-flex items-center rounded-full px-2.5 py-0.5 text-xs font-semibold {}">{}</span>"#,
        variant.classes(),
        escape(label)
    )
}

/// Button visual variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    /// Primary action button.
    Primary,
    /// Secondary action button.
    Secondary,
}

impl ButtonVariant {
    /// Get CSS classes for this variant.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Primary => "bg-primary text-white hover:bg-primaryMuted",
            Self::Secondary => "bg-panel text-textPrimary border border-panelBorder hover:bg-panelBorder",
        }
    }
}

/// Button that posts the surrounding form to `action`.
#[must_use]
pub fn post_button(id: &str, variant: ButtonVariant, action: &str, label: &str) -> String {
    format!(
        r#"<button type="button" id="{id}" class="h-10 px-4 rounded-xl text-sm font-medium transition-all {}" hx-post="{action}">{}</button>"#,
        variant.classes(),
        escape(label)
    )
}

/// A row of inline tags with the given class.
#[must_use]
pub fn tags<'a>(class: &str, labels: impl IntoIterator<Item = &'a str>) -> String {
    labels.into_iter().fold(String::new(), |mut out, label| {
        let _ = write!(out, r#"<span class="{class}">{}</span>"#, escape(label));
        out
    })
}

/// `<li>` items for a bulleted list.
#[must_use]
pub fn list_items<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items.into_iter().fold(String::new(), |mut out, item| {
        let _ = write!(out, "<li>{}</li>", escape(item));
        out
    })
}
