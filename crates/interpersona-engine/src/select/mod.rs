//! Turning assigned styles into ordered, budgeted report rows.

pub mod balancer;
pub mod ordering;
pub mod summary;

use std::collections::BTreeMap;

use interpersona_core::reference::content::ContentRow;
use interpersona_core::reference::ReferenceData;
use interpersona_core::types::{SectionId, StyleCode};

use crate::assign::StyleAssignment;

/// A content row the user qualifies for, with the angle of the style that
/// selected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub row: &'a ContentRow,
    pub angle: f64,
}

impl Candidate<'_> {
    pub fn code(&self) -> StyleCode {
        self.row.code()
    }

    pub fn section(&self) -> SectionId {
        self.row.section
    }
}

/// A row in final report position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placed<'a> {
    pub row: &'a ContentRow,
    /// 1-based position of the row's story within its section.
    pub story: usize,
}

/// Content rows of the assigned styles, in [`budget_order`].
///
/// Only the first authored row of a style within a section is kept. Every
/// report variant reduces and emits from this one ordering.
pub fn user_rows<'a>(
    reference: &'a ReferenceData,
    assignments: &[StyleAssignment],
) -> Vec<Candidate<'a>> {
    let angles: BTreeMap<StyleCode, f64> =
        assignments.iter().map(|a| (a.code(), a.angle)).collect();
    let mut out: Vec<Candidate<'a>> = Vec::new();
    for row in &reference.content {
        let Some(&angle) = angles.get(&row.code()) else {
            continue;
        };
        if out
            .iter()
            .any(|c| c.section() == row.section && c.code() == row.code())
        {
            continue;
        }
        out.push(Candidate { row, angle });
    }
    budget_order(&mut out);
    out
}

/// Order the budget filter walks: section, then closeness of fit.
pub fn budget_order(rows: &mut [Candidate<'_>]) {
    rows.sort_by(|a, b| {
        a.section()
            .cmp(&b.section())
            .then(a.angle.total_cmp(&b.angle))
    });
}
