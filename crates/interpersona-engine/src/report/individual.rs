use std::collections::BTreeSet;

use interpersona_core::config::ReportConfig;
use interpersona_core::errors::ReportError;
use interpersona_core::payload::{ReportItem, ReportPayload};
use interpersona_core::profile::TraitVector;
use interpersona_core::reference::content::TextQuery;
use interpersona_core::reference::ReferenceData;
use interpersona_core::state::{PersistedReport, ReportKey, ReportStage};
use interpersona_core::traits::{ReportStore, SaveOutcome, TraitSource};
use interpersona_core::types::{ReportVariant, SectionId, StyleCode, TextKind};
use tracing::{debug, info, warn};

use super::share::share_modules;
use super::text::{lookup_text, personalize, resolve_text};
use super::Progress;
use crate::assign::{assign_styles, StyleAssignment};
use crate::select::balancer::apply_budget;
use crate::select::ordering::arrange;
use crate::select::summary::summary_subset;
use crate::select::{user_rows, Placed};

/// Section id that selects the summary on its own.
pub const SUMMARY_SECTION: SectionId = 0;

/// What a caller asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub user_id: String,
    pub variant: ReportVariant,
    /// The user viewing their own report.
    pub self_user: bool,
    /// `None` for every section, `Some(0)` for the summary only.
    pub section: Option<SectionId>,
    pub language: u16,
}

impl ReportRequest {
    pub fn new(user_id: impl Into<String>, variant: ReportVariant) -> Self {
        Self {
            user_id: user_id.into(),
            variant,
            self_user: true,
            section: None,
            language: 1,
        }
    }

    pub fn key(&self) -> ReportKey {
        ReportKey {
            user_id: self.user_id.clone(),
            variant: self.variant,
            self_user: self.self_user,
            section: self.section,
            language: self.language,
        }
    }

    fn wants_section(&self, section: SectionId) -> bool {
        match self.section {
            None => true,
            Some(SUMMARY_SECTION) => false,
            Some(s) => s == section,
        }
    }
}

/// Builds individual reports against one reference bundle and config.
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    reference: &'a ReferenceData,
    config: &'a ReportConfig,
}

impl<'a> Reporter<'a> {
    pub fn new(reference: &'a ReferenceData, config: &'a ReportConfig) -> Self {
        Self { reference, config }
    }

    /// Serve a stored report, or compute, persist and return a new one.
    ///
    /// A report another writer got to first is not an error: the computed
    /// copy is returned and the stored one is left alone.
    pub fn report(
        &self,
        request: &ReportRequest,
        traits: &dyn TraitSource,
        store: &dyn ReportStore,
    ) -> Result<PersistedReport, ReportError> {
        let key = request.key();
        if let Some(stored) = store.load(&key)? {
            if stored.reference_fingerprint != self.reference.fingerprint() {
                warn!(
                    key = %key.cache_id(),
                    stored = %stored.reference_fingerprint,
                    "serving report built from other reference data"
                );
            }
            debug!(key = %key.cache_id(), "report cache hit");
            return Ok(stored);
        }

        let (payload, mut progress) = self.build(request, traits)?;
        let report = PersistedReport::new(key, self.reference.fingerprint().to_string(), payload);
        match store.save(&report)? {
            SaveOutcome::Written => info!(key = %report.key.cache_id(), "report persisted"),
            outcome => info!(key = %report.key.cache_id(), ?outcome, "report already stored, skipping"),
        }
        progress.advance(ReportStage::Persisted)?;
        Ok(report)
    }

    /// Run the pipeline without touching any store.
    pub fn build(
        &self,
        request: &ReportRequest,
        traits: &dyn TraitSource,
    ) -> Result<(ReportPayload, Progress), ReportError> {
        let mut progress = Progress::new(request.variant);
        let subject = TraitVector::from_record(&traits.user(&request.user_id)?)?;
        let assignments = assign_styles(&subject, self.reference, self.config, 1)?;
        progress.advance(ReportStage::Computed)?;

        let rows = user_rows(self.reference, &assignments);
        let reduced = arrange(&rows, self.reference)?;
        progress.advance(ReportStage::Reduced)?;

        let view = View {
            reporter: self,
            subject: &subject,
            request,
            overview: self.overview_code(&assignments),
        };

        let mut payload = ReportPayload::default();
        match request.variant {
            ReportVariant::Individual => {
                payload.current_report_content = view.content_items(&reduced, &mut BTreeSet::new());
            }
            ReportVariant::IndividualFiltered => {
                self.config.validate_for(self.reference)?;
                let split = apply_budget(rows.clone(), self.config)?;
                let current = arrange(&split.current, self.reference)?;
                let extended = arrange(&split.extended, self.reference)?;
                progress.advance(ReportStage::Filtered)?;

                // an overview goes with the first list its section appears in
                let mut introduced = BTreeSet::new();
                payload.current_report_content = view.content_items(&current, &mut introduced);
                if request.self_user {
                    payload.extended_report_content = view.content_items(&extended, &mut introduced);
                    payload.share_module_report_content = view.share_items(&current);
                }
                if !request.self_user || request.section == Some(SUMMARY_SECTION) {
                    let codes: BTreeSet<StyleCode> = rows.iter().map(|c| c.code()).collect();
                    payload.summary_report_content = view.summary_items(&codes);
                }
            }
        }

        debug!(
            user = %request.user_id,
            current = payload.current_report_content.len(),
            extended = payload.extended_report_content.len(),
            summary = payload.summary_report_content.len(),
            "report built"
        );
        Ok((payload, progress))
    }

    fn overview_code(&self, assignments: &[StyleAssignment]) -> Option<StyleCode> {
        let theme = self.config.overview_theme?;
        assignments
            .iter()
            .find(|a| a.theme == theme)
            .map(StyleAssignment::code)
    }
}

/// One subject's rendering context.
struct View<'r, 'a> {
    reporter: &'r Reporter<'a>,
    subject: &'r TraitVector,
    request: &'r ReportRequest,
    overview: Option<StyleCode>,
}

impl View<'_, '_> {
    fn query(&self, kind: TextKind, code: StyleCode) -> TextQuery {
        TextQuery {
            kind,
            code,
            language: self.request.language,
            gender: self.subject.gender,
            self_user: self.request.self_user,
        }
    }

    /// Render placed rows. `rows` numbers the whole list, before the section
    /// filter; sections in `introduced` already had their overview.
    fn content_items(
        &self,
        placed: &[Placed<'_>],
        introduced: &mut BTreeSet<SectionId>,
    ) -> Vec<ReportItem> {
        let config = self.reporter.config;
        let lookup = self.reporter.reference;
        let name = self.subject.first_name.as_str();
        let mut items = Vec::with_capacity(placed.len());

        for (index, p) in placed.iter().enumerate() {
            let section = p.row.section;
            if !self.request.wants_section(section) {
                continue;
            }
            if introduced.insert(section) {
                let overview = self.overview.and_then(|code| {
                    lookup_text(lookup, &self.query(TextKind::Overview(section), code), config, name)
                        .map(|text| (code, text))
                });
                if let Some((code, content)) = overview {
                    items.push(ReportItem {
                        rows: None,
                        number: code,
                        section,
                        word_count: None,
                        illustration: None,
                        title: None,
                        story: 0,
                        content,
                    });
                }
            }

            let code = p.row.code();
            items.push(ReportItem {
                rows: Some(index + 1),
                number: code,
                section,
                word_count: Some(p.row.word_count),
                illustration: Some(p.row.illustration),
                title: Some(personalize(&p.row.title, &config.name_placeholder, name)),
                story: p.story,
                content: resolve_text(lookup, &self.query(TextKind::Section(section), code), config, name),
            });
        }
        items
    }

    fn share_items(&self, current: &[Placed<'_>]) -> Vec<ReportItem> {
        share_modules(self.reporter.reference, current, self.request.language)
            .into_iter()
            .map(|c| ReportItem {
                rows: None,
                number: c.code,
                section: c.section,
                word_count: None,
                illustration: None,
                title: None,
                story: 0,
                content: c.text.to_string(),
            })
            .collect()
    }

    fn summary_items(&self, codes: &BTreeSet<StyleCode>) -> Vec<ReportItem> {
        let config = self.reporter.config;
        summary_subset(&self.reporter.reference.summaries, codes, &config.summary)
            .into_iter()
            .map(|s| ReportItem {
                rows: None,
                number: s.code,
                section: SUMMARY_SECTION,
                word_count: None,
                illustration: None,
                title: None,
                story: 0,
                content: personalize(&s.content, &config.name_placeholder, &self.subject.first_name),
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;

    use interpersona_core::config::ReportConfig;
    use interpersona_core::reference::content::{SummaryText, TextEntry, TextKindName};
    use interpersona_core::reference::graph::{GraphEdge, SectionGraph};
    use interpersona_core::reference::ReferenceData;
    use interpersona_core::types::StyleCode;

    use crate::select::fixtures::row;

    fn text(kind: TextKindName, section: Option<u16>, code: i32, body: &str) -> TextEntry {
        TextEntry {
            kind,
            section,
            code: StyleCode::from_raw(code),
            language: 1,
            gender: None,
            self_user: None,
            text: body.to_string(),
        }
    }

    /// High anxiety assigns 101 and 201. Section 1 runs 201 -> 101 and is
    /// over its 600-word target until 101 moves out.
    pub fn reference() -> ReferenceData {
        let mut data = crate::assign::fixtures::reference();
        data.sections = BTreeMap::from([
            (1, SectionGraph::new(1, vec![GraphEdge::new(201, 101)])),
            (2, SectionGraph::new(2, Vec::new())),
        ]);
        data.content = vec![
            row(1, 1, 1, 300, false, 2),
            row(1, 2, 1, 400, false, 5),
            row(2, 1, 1, 100, false, 1),
            row(1, 1, 2, 50, false, 0),
        ];
        data.texts = vec![
            text(TextKindName::Section, Some(1), 101, "Body 101 for {name}"),
            text(TextKindName::Overview, Some(1), 201, "Overview of section 1"),
        ];
        data.summaries = vec![
            SummaryText {
                code: StyleCode::from_raw(101),
                value: 5.0,
                sequence: 2,
                content: "{name} leads".to_string(),
            },
            SummaryText {
                code: StyleCode::from_raw(201),
                value: 1.0,
                sequence: 1,
                content: "calm".to_string(),
            },
            SummaryText {
                code: StyleCode::from_raw(102),
                value: 9.0,
                sequence: 0,
                content: "not assigned".to_string(),
            },
        ];
        data
    }

    pub fn config() -> ReportConfig {
        ReportConfig {
            section_targets: BTreeMap::from([(1, 600), (2, 900)]),
            section_order: vec![1, 2],
            protected: None,
            overview_theme: Some(2),
            ..ReportConfig::default()
        }
    }
}
