use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use jsonschema::Validator;
use serde_json::Value;

use crate::config::ReportConfig;
use crate::errors::{CheckIssue, CheckReport};
use crate::profile::{MODEL_INPUT_COUNT, TRAIT_COUNT};
use crate::reference::content::TextKindName;
use crate::reference::{semantic_errors, ReferenceDocument, REFERENCE_VERSION};
use crate::types::StyleCode;

const SCHEMA_V10: &str = include_str!("../schema/reference-v1.0.schema.json");

/// Create a validator for the reference bundle schema.
pub fn validator() -> Result<Validator> {
    let schema: Value =
        serde_json::from_str(SCHEMA_V10).context("embedded schema is invalid JSON")?;
    Validator::new(&schema).map_err(|e| anyhow::anyhow!("schema compilation failed: {e}"))
}

/// Validate a reference bundle against the schema only.
pub fn validate(data: &Value) -> Result<()> {
    let v = validator()?;
    if v.is_valid(data) {
        return Ok(());
    }
    let mut msgs: Vec<String> = Vec::new();
    for error in v.iter_errors(data) {
        let path = error.instance_path.to_string();
        let loc = if path.is_empty() {
            "(root)".into()
        } else {
            path
        };
        msgs.push(format!("  {loc}: {error}"));
    }
    bail!("validation failed:\n{}", msgs.join("\n"));
}

/// Full check producing structured report (for `ipr check --json`).
///
/// Schema errors come first, then model widths, then the typed consistency
/// checks. Lint warnings need a parsed document; word-target warnings also
/// need the active config.
pub fn check(data: &Value, file: &str, strict: bool, config: Option<&ReportConfig>) -> CheckReport {
    let version = data
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(REFERENCE_VERSION)
        .to_string();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Schema validation
    if let Ok(v) = validator() {
        for error in v.iter_errors(data) {
            let path = error.instance_path.to_string();
            errors.push(CheckIssue::new(
                "E001",
                "schema",
                error.to_string(),
                Some(if path.is_empty() {
                    "$(root)".to_string()
                } else {
                    format!("${path}")
                }),
            ));
        }
    }

    check_coefficient_widths(data, &mut errors);

    if errors.is_empty() {
        match serde_json::from_value::<ReferenceDocument>(data.clone()) {
            Ok(doc) => {
                errors.extend(semantic_errors(&doc));
                lint_checks(&doc, config, &mut warnings);
            }
            Err(e) => errors.push(CheckIssue::new("E001", "schema", e.to_string(), None)),
        }
    }

    let pass = errors.is_empty() && (!strict || warnings.is_empty());
    CheckReport {
        file: file.to_string(),
        version,
        pass,
        errors,
        warnings,
    }
}

fn check_coefficient_widths(data: &Value, errors: &mut Vec<CheckIssue>) {
    let Some(themes) = data.get("themes").and_then(Value::as_array) else {
        return;
    };
    for (ti, theme) in themes.iter().enumerate() {
        let Some(clusters) = theme.get("clusters").and_then(Value::as_array) else {
            continue;
        };
        for (ci, cluster) in clusters.iter().enumerate() {
            let Some(coefs) = cluster.get("coefficients").and_then(Value::as_array) else {
                continue;
            };
            if coefs.len() != TRAIT_COUNT && coefs.len() != MODEL_INPUT_COUNT {
                errors.push(CheckIssue::new(
                    "E010",
                    "model",
                    format!(
                        "expected {TRAIT_COUNT} or {MODEL_INPUT_COUNT} coefficients, got {}",
                        coefs.len()
                    ),
                    Some(format!("$.themes[{ti}].clusters[{ci}].coefficients")),
                ));
            }
        }
    }
}

fn lint_checks(doc: &ReferenceDocument, config: Option<&ReportConfig>, warnings: &mut Vec<CheckIssue>) {
    // W001: style that no content row covers
    let covered: BTreeSet<StyleCode> = doc.content.iter().map(|r| r.code()).collect();
    for (ti, theme) in doc.themes.iter().enumerate() {
        for (si, style) in theme.styles.iter().enumerate() {
            let code = style.code(theme.theme_id);
            if !covered.contains(&code) {
                warnings.push(CheckIssue::new(
                    "W001",
                    "lint",
                    format!("style {code} has no content rows"),
                    Some(format!("$.themes[{ti}].styles[{si}]")),
                ));
            }
        }
    }

    // W002: section the budget filter cannot size
    if let Some(config) = config {
        let sections: BTreeSet<u16> = doc
            .sections
            .iter()
            .map(|s| s.section_id)
            .chain(doc.content.iter().map(|r| r.section))
            .collect();
        for section in sections {
            if !config.section_targets.contains_key(&section) {
                warnings.push(CheckIssue::new(
                    "W002",
                    "lint",
                    format!("section {section} has no word target in config"),
                    None,
                ));
            }
        }
    }

    // W003: section-scoped text without a section
    for (i, text) in doc.texts.iter().enumerate() {
        if text.kind != TextKindName::Interpersonal && text.section.is_none() {
            warnings.push(CheckIssue::new(
                "W003",
                "lint",
                format!("{:?} text for {} has no section", text.kind, text.code),
                Some(format!("$.texts[{i}]")),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::fixtures::small_bundle;

    #[test]
    fn embedded_schema_compiles() {
        assert!(validator().is_ok());
    }

    #[test]
    fn small_bundle_passes() {
        let report = check(&small_bundle(), "bundle.json", false, None);
        assert!(report.pass, "{:?}", report.errors);
        assert!(validate(&small_bundle()).is_ok());
    }

    #[test]
    fn uncovered_styles_warn_and_fail_strict() {
        let report = check(&small_bundle(), "bundle.json", true, None);
        assert!(report.errors.is_empty());
        assert!(report.warnings.iter().any(|w| w.code == "W001"));
        assert!(!report.pass);
    }

    #[test]
    fn schema_error_reported_with_path() {
        let mut v = small_bundle();
        v["themes"][0]["styles"][0]["percentiles"] = serde_json::json!([1.5, 0.1]);
        let report = check(&v, "bad.json", false, None);
        assert!(!report.pass);
        let e = &report.errors[0];
        assert_eq!(e.code, "E001");
        assert!(e.path.as_deref().unwrap_or("").contains("/themes/0/styles/0"));
    }

    #[test]
    fn coefficient_width_is_e010() {
        let mut v = small_bundle();
        v["themes"][0]["clusters"][1]["coefficients"] = serde_json::json!(vec![0.0; 31]);
        let report = check(&v, "bad.json", false, None);
        assert!(report.errors.iter().any(|e| e.code == "E010"));
    }

    #[test]
    fn duplicate_theme_is_e014() {
        let mut v = small_bundle();
        v["themes"][1]["theme_id"] = serde_json::json!(1);
        let report = check(&v, "dup.json", false, None);
        assert!(report.errors.iter().any(|e| e.code == "E014"));
    }

    #[test]
    fn missing_word_target_warns_with_config() {
        let mut v = small_bundle();
        v["content"][1]["section"] = serde_json::json!(8);
        let config = ReportConfig::default();
        let report = check(&v, "b.json", false, Some(&config));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.code == "W002" && w.message.contains("section 8")));
    }
}
