use std::collections::BTreeSet;

use interpersona_core::reference::content::ShareModule;
use interpersona_core::reference::ReferenceData;
use interpersona_core::types::{SectionId, StyleCode};
use tracing::debug;

use super::pair::BLANK;
use crate::select::Placed;

/// The call to action picked for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareChoice<'a> {
    pub section: SectionId,
    pub code: StyleCode,
    pub text: &'a str,
}

/// Pick at most one share module per section of the current report.
///
/// Themes are tried in ascending order and the first module authored for
/// one of the user's styles in that section wins; otherwise the section's
/// wildcard entry is used. Without any module in `language`, every text
/// reads [`BLANK`].
pub fn share_modules<'a>(
    reference: &'a ReferenceData,
    current: &[Placed<'_>],
    language: u16,
) -> Vec<ShareChoice<'a>> {
    let localized = reference.share_modules.iter().any(|m| m.language == language);
    if !localized {
        debug!(language, "no share modules in language");
    }
    let pool = || {
        reference
            .share_modules
            .iter()
            .filter(move |m| !localized || m.language == language)
    };

    let mut out = Vec::new();
    for section in reference.section_ids() {
        let codes: BTreeSet<StyleCode> = current
            .iter()
            .filter(|p| p.row.section == section)
            .map(|p| p.row.code())
            .collect();
        if codes.is_empty() {
            continue;
        }
        let in_section = |m: &&ShareModule| m.section == section;
        let matched = reference.themes.keys().find_map(|&theme| {
            pool()
                .filter(in_section)
                .find(|m| m.code.theme() == Some(theme) && codes.contains(&m.code))
        });
        let chosen = matched.or_else(|| pool().filter(in_section).find(|m| m.code.is_wildcard()));
        if let Some(m) = chosen {
            out.push(ShareChoice {
                section,
                code: m.code,
                text: if localized { m.text.as_str() } else { BLANK },
            });
        }
    }
    out
}
