use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::errors::ReportError;
use crate::traits::TraitSource;
use crate::types::Gender;

pub const TRAIT_COUNT: usize = 30;

/// Positional contract shared by trait input and model coefficients.
///
/// Five trait groups of six facets each, in this exact order. Coefficient
/// vectors are aligned against this list, optionally followed by
/// [`DEMOGRAPHIC_FIELDS`].
pub const TRAIT_SCHEMA: [&str; TRAIT_COUNT] = [
    // neuroticism
    "anxiety",
    "anger",
    "depression",
    "self_consciousness",
    "immoderation",
    "vulnerability",
    // extraversion
    "friendliness",
    "gregariousness",
    "assertiveness",
    "activity_level",
    "excitement_seeking",
    "cheerfulness",
    // openness
    "imagination",
    "artistic_interests",
    "emotionality",
    "adventurousness",
    "intellect",
    "liberalism",
    // agreeableness
    "trust",
    "morality",
    "altruism",
    "cooperation",
    "modesty",
    "sympathy",
    // conscientiousness
    "self_efficacy",
    "orderliness",
    "dutifulness",
    "achievement_striving",
    "self_discipline",
    "cautiousness",
];

/// Model inputs appended after the trait facets when a theme uses them.
pub const DEMOGRAPHIC_FIELDS: [&str; 2] = ["age", "gender"];

/// Width of a coefficient vector that includes age and gender.
pub const MODEL_INPUT_COUNT: usize = TRAIT_COUNT + DEMOGRAPHIC_FIELDS.len();

/// A user record as supplied by the trait source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    #[serde(default)]
    pub first_name: String,
    pub age: f64,
    pub gender: String,
    pub traits: BTreeMap<String, f64>,
}

/// Trait scores aligned to [`TRAIT_SCHEMA`], with raw demographics.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitVector {
    pub user_id: String,
    pub first_name: String,
    pub scores: [f64; TRAIT_COUNT],
    pub age: f64,
    pub gender: Gender,
}

impl TraitVector {
    /// Align a named record against the trait schema.
    ///
    /// Fails on a missing or unknown facet, a non-finite score or age, and
    /// an unrecognized gender.
    pub fn from_record(record: &UserRecord) -> Result<Self, ReportError> {
        let uid = record.user_id.as_str();
        if let Some(unknown) = record
            .traits
            .keys()
            .find(|k| !TRAIT_SCHEMA.contains(&k.as_str()))
        {
            return Err(ReportError::invalid(uid, format!("unknown trait '{unknown}'")));
        }

        let mut scores = [0.0; TRAIT_COUNT];
        for (slot, name) in scores.iter_mut().zip(TRAIT_SCHEMA) {
            let value = record
                .traits
                .get(name)
                .copied()
                .ok_or_else(|| ReportError::invalid(uid, format!("missing trait '{name}'")))?;
            if !value.is_finite() {
                return Err(ReportError::invalid(uid, format!("trait '{name}' is not finite")));
            }
            *slot = value;
        }

        if !record.age.is_finite() {
            return Err(ReportError::invalid(uid, "age is not finite"));
        }
        let gender = Gender::parse(&record.gender).ok_or_else(|| {
            ReportError::invalid(uid, format!("unrecognized gender '{}'", record.gender))
        })?;

        Ok(Self {
            user_id: record.user_id.clone(),
            first_name: record.first_name.clone(),
            scores,
            age: record.age,
            gender,
        })
    }
}

/// Model-ready inputs: trait scores plus interpolated demographics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedProfile {
    pub scores: [f64; TRAIT_COUNT],
    pub age: f64,
    pub gender: f64,
}

impl NormalizedProfile {
    /// Iterate the inputs in model order; `with_demographics` appends age then gender.
    pub fn inputs(&self, with_demographics: bool) -> impl Iterator<Item = f64> + '_ {
        let demo = with_demographics.then_some([self.age, self.gender]);
        self.scores.iter().copied().chain(demo.into_iter().flatten())
    }
}

/// In-memory trait source, loaded from a JSON array of user records.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read users {path}"))?;
        let users: Vec<UserRecord> =
            serde_json::from_str(&content).with_context(|| format!("{path}: invalid users JSON"))?;
        Ok(Self::new(users))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.users.iter().map(|u| u.user_id.as_str())
    }
}

impl TraitSource for UserDirectory {
    fn user(&self, user_id: &str) -> Result<UserRecord, ReportError> {
        self.users
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned()
            .ok_or_else(|| ReportError::UserNotFound(user_id.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(user_id: &str, fill: f64) -> UserRecord {
        UserRecord {
            user_id: user_id.to_string(),
            first_name: "Ada".to_string(),
            age: 40.0,
            gender: "female".to_string(),
            traits: TRAIT_SCHEMA.iter().map(|n| (n.to_string(), fill)).collect(),
        }
    }
}
