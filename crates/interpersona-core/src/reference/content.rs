use serde::{Deserialize, Serialize};

use crate::types::{Gender, SectionId, StyleCode, StyleId, TextKind, ThemeId};

/// Authored content fragment for one (section, theme, style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRow {
    pub section: SectionId,
    pub theme: ThemeId,
    pub style: StyleId,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub illustration: bool,
    #[serde(default)]
    pub emotional_impact: i32,
    #[serde(default)]
    pub title: String,
}

impl ContentRow {
    pub fn code(&self) -> StyleCode {
        StyleCode::new(self.theme, self.style)
    }
}

/// Prioritised one-line summary attached to a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryText {
    pub code: StyleCode,
    pub value: f64,
    pub sequence: u32,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKindName {
    Section,
    Overview,
    Interpersonal,
}

fn default_language() -> u16 {
    1
}

/// Authored text. `gender` and `self_user` left out match any request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntry {
    pub kind: TextKindName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionId>,
    pub code: StyleCode,
    #[serde(default = "default_language")]
    pub language: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_user: Option<bool>,
    pub text: String,
}

impl TextEntry {
    pub fn kind(&self) -> Option<TextKind> {
        match (self.kind, self.section) {
            (TextKindName::Section, Some(s)) => Some(TextKind::Section(s)),
            (TextKindName::Overview, Some(s)) => Some(TextKind::Overview(s)),
            (TextKindName::Interpersonal, _) => Some(TextKind::Interpersonal),
            _ => None,
        }
    }

    pub fn matches(&self, q: &TextQuery) -> bool {
        self.kind() == Some(q.kind)
            && self.code == q.code
            && self.language == q.language
            && self.gender.map_or(true, |g| g == q.gender)
            && self.self_user.map_or(true, |s| s == q.self_user)
    }
}

/// Call to action offered for sharing one section.
///
/// A wildcard `code` is the section's fallback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareModule {
    pub section: SectionId,
    pub code: StyleCode,
    #[serde(default = "default_language")]
    pub language: u16,
    pub text: String,
}

/// Key of a content-text lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextQuery {
    pub kind: TextKind,
    pub code: StyleCode,
    pub language: u16,
    pub gender: Gender,
    pub self_user: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: serde_json::Value) -> TextEntry {
        serde_json::from_value(json).unwrap()
    }

    fn query(kind: TextKind, code: i32) -> TextQuery {
        TextQuery {
            kind,
            code: StyleCode::from_raw(code),
            language: 1,
            gender: Gender::Female,
            self_user: true,
        }
    }

    #[test]
    fn unconstrained_entry_matches_any_viewer() {
        let e = entry(serde_json::json!({
            "kind": "section", "section": 2, "code": 305, "text": "hi"
        }));
        assert!(e.matches(&query(TextKind::Section(2), 305)));
        assert!(!e.matches(&query(TextKind::Section(1), 305)));
        assert!(!e.matches(&query(TextKind::Overview(2), 305)));
    }

    #[test]
    fn constrained_entry_checks_gender_and_viewer() {
        let e = entry(serde_json::json!({
            "kind": "interpersonal", "code": 101, "gender": "male", "self_user": false, "text": "x"
        }));
        let mut q = query(TextKind::Interpersonal, 101);
        assert!(!e.matches(&q));
        q.gender = Gender::Male;
        assert!(!e.matches(&q));
        q.self_user = false;
        assert!(e.matches(&q));
    }

    #[test]
    fn section_kind_without_section_is_unusable() {
        let e = entry(serde_json::json!({"kind": "overview", "code": 1401, "text": "x"}));
        assert_eq!(e.kind(), None);
    }
}
