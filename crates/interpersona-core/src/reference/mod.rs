pub mod clusters;
pub mod content;
pub mod graph;
pub mod pair;
pub mod styles;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use self::clusters::ThemeModel;
use self::content::{ContentRow, ShareModule, SummaryText, TextEntry, TextQuery};
use self::graph::SectionGraph;
use self::pair::PairTables;
use crate::errors::{CheckIssue, LookupError, ReportError};
use crate::traits::ContentLookup;
use crate::types::{SectionId, StyleCode, ThemeId};

pub const REFERENCE_VERSION: &str = "1.0";

fn default_version() -> String {
    REFERENCE_VERSION.to_string()
}

/// Reference bundle as authored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDocument {
    #[serde(default = "default_version")]
    pub version: String,
    pub themes: Vec<ThemeModel>,
    #[serde(default)]
    pub sections: Vec<SectionGraph>,
    #[serde(default)]
    pub content: Vec<ContentRow>,
    #[serde(default)]
    pub summaries: Vec<SummaryText>,
    #[serde(default)]
    pub texts: Vec<TextEntry>,
    #[serde(default)]
    pub share_modules: Vec<ShareModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair: Option<PairTables>,
}

/// Validated, immutable reference data keyed by theme and section.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub themes: BTreeMap<ThemeId, ThemeModel>,
    pub sections: BTreeMap<SectionId, SectionGraph>,
    pub content: Vec<ContentRow>,
    pub summaries: Vec<SummaryText>,
    pub texts: Vec<TextEntry>,
    pub share_modules: Vec<ShareModule>,
    pub pair: PairTables,
    fingerprint: String,
}

impl ReferenceData {
    /// Validate a document and key its tables.
    ///
    /// Every section that has content rows gets a graph, empty if none was
    /// authored.
    pub fn from_document(doc: ReferenceDocument, fingerprint: String) -> Result<Self, ReportError> {
        if let Some(issue) = semantic_errors(&doc).into_iter().next() {
            return Err(ReportError::config(format!(
                "{}: {}{}",
                issue.code,
                issue.message,
                issue.path.map(|p| format!(" at {p}")).unwrap_or_default()
            )));
        }

        let themes = doc.themes.into_iter().map(|t| (t.theme_id, t)).collect();
        let mut sections: BTreeMap<SectionId, SectionGraph> = doc
            .sections
            .into_iter()
            .map(|s| (s.section_id, s))
            .collect();
        for row in &doc.content {
            sections
                .entry(row.section)
                .or_insert_with(|| SectionGraph::new(row.section, Vec::new()));
        }

        Ok(Self {
            themes,
            sections,
            content: doc.content,
            summaries: doc.summaries,
            texts: doc.texts,
            share_modules: doc.share_modules,
            pair: doc.pair.unwrap_or_default(),
            fingerprint,
        })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ReportError> {
        let doc: ReferenceDocument = serde_json::from_slice(bytes)
            .map_err(|e| ReportError::config(format!("invalid reference data: {e}")))?;
        Self::from_document(doc, fingerprint_of(bytes))
    }

    pub fn load(path: &str) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("cannot read reference {path}"))?;
        let data = Self::from_json(&bytes).with_context(|| format!("{path}: bad reference data"))?;
        tracing::debug!(
            path,
            themes = data.themes.len(),
            sections = data.sections.len(),
            "reference data loaded"
        );
        Ok(data)
    }

    /// `sha256:<hex>` digest of the bytes the data was loaded from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn theme(&self, theme: ThemeId) -> Result<&ThemeModel, ReportError> {
        self.themes
            .get(&theme)
            .ok_or_else(|| ReportError::config(format!("theme {theme} not in reference data")))
    }

    pub fn section_ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections.keys().copied()
    }

    /// Content rows authored for a style, across sections, in authoring order.
    pub fn rows_for(&self, code: StyleCode) -> impl Iterator<Item = &ContentRow> + '_ {
        self.content.iter().filter(move |r| r.code() == code)
    }
}

impl ContentLookup for ReferenceData {
    fn text(&self, query: &TextQuery) -> Result<String, LookupError> {
        self.texts
            .iter()
            .find(|t| t.matches(query))
            .map(|t| t.text.clone())
            .ok_or_else(|| {
                LookupError::NotFound(format!(
                    "{:?} text for style {} (language {})",
                    query.kind, query.code, query.language
                ))
            })
    }
}

pub fn fingerprint_of(bytes: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(bytes))
}

/// Consistency errors a typed document can still carry after parsing.
///
/// Codes: E011 bad cluster distribution, E012 style/cluster width mismatch,
/// E013 cyclic section graph, E014 duplicate identifier.
pub fn semantic_errors(doc: &ReferenceDocument) -> Vec<CheckIssue> {
    let mut issues = Vec::new();

    let mut seen_themes = BTreeSet::new();
    for (ti, theme) in doc.themes.iter().enumerate() {
        let at = |rest: &str| Some(format!("$.themes[{ti}]{rest}"));
        if !seen_themes.insert(theme.theme_id) {
            issues.push(CheckIssue::new(
                "E014",
                "identity",
                format!("duplicate theme {}", theme.theme_id),
                at(".theme_id"),
            ));
        }
        if theme.clusters.is_empty() || theme.styles.is_empty() {
            issues.push(CheckIssue::new(
                "E012",
                "model",
                format!("theme {} needs at least one cluster and one style", theme.theme_id),
                at(""),
            ));
        }
        for (ci, cluster) in theme.clusters.iter().enumerate() {
            if !(cluster.stdev.is_finite() && cluster.stdev > 0.0) || !cluster.mean.is_finite() {
                issues.push(CheckIssue::new(
                    "E011",
                    "model",
                    format!(
                        "cluster {} of theme {} has mean {} and stdev {}",
                        cluster.cluster_id, theme.theme_id, cluster.mean, cluster.stdev
                    ),
                    at(&format!(".clusters[{ci}]")),
                ));
            }
        }
        let mut seen_styles = BTreeSet::new();
        for (si, style) in theme.styles.iter().enumerate() {
            if !seen_styles.insert(style.style_id) || style.style_id >= 100 {
                issues.push(CheckIssue::new(
                    "E014",
                    "identity",
                    format!("bad or duplicate style {} in theme {}", style.style_id, theme.theme_id),
                    at(&format!(".styles[{si}].style_id")),
                ));
            }
            if style.percentiles.len() != theme.clusters.len() {
                issues.push(CheckIssue::new(
                    "E012",
                    "model",
                    format!(
                        "style {} has {} percentiles for {} clusters",
                        style.style_id,
                        style.percentiles.len(),
                        theme.clusters.len()
                    ),
                    at(&format!(".styles[{si}].percentiles")),
                ));
            }
        }
    }

    let mut seen_sections = BTreeSet::new();
    for (i, section) in doc.sections.iter().enumerate() {
        if !seen_sections.insert(section.section_id) {
            issues.push(CheckIssue::new(
                "E014",
                "identity",
                format!("duplicate section {}", section.section_id),
                Some(format!("$.sections[{i}].section_id")),
            ));
        }
        if let Some(node) = section.find_cycle() {
            issues.push(CheckIssue::new(
                "E013",
                "graph",
                format!("section {} graph has a cycle through {node}", section.section_id),
                Some(format!("$.sections[{i}].edges")),
            ));
        }
    }

    issues
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// Two themes, two sections, enough rows for lookups.
    pub fn small_bundle() -> Value {
        json!({
            "version": "1.0",
            "themes": [
                {
                    "theme_id": 1,
                    "name": "Energy",
                    "clusters": [
                        {"cluster_id": 1, "mean": 0.0, "stdev": 1.0, "coefficients": vec![0.1; 30]},
                        {"cluster_id": 2, "mean": 0.5, "stdev": 2.0, "intercept": 0.2,
                         "coefficients": vec![-0.1; 32]}
                    ],
                    "styles": [
                        {"style_id": 1, "percentiles": [0.9, 0.1]},
                        {"style_id": 2, "percentiles": [0.1, 0.9]}
                    ]
                },
                {
                    "theme_id": 2,
                    "clusters": [
                        {"cluster_id": 1, "mean": 0.0, "stdev": 1.0, "coefficients": vec![0.2; 30]}
                    ],
                    "styles": [
                        {"style_id": 1, "percentiles": [0.8]},
                        {"style_id": 2, "percentiles": [0.2]}
                    ]
                }
            ],
            "sections": [
                {"section_id": 1, "edges": [{"parent": 101, "child": 201}]}
            ],
            "content": [
                {"section": 1, "theme": 1, "style": 1, "word_count": 100, "emotional_impact": 2},
                {"section": 2, "theme": 2, "style": 1, "word_count": 80, "emotional_impact": 1}
            ],
            "texts": [
                {"kind": "section", "section": 1, "code": 101, "text": "Hello {name}"}
            ]
        })
    }
}
