//! Conversion between review records and their JSON file forms.
//!
//! Two shapes exist on disk. Drafts written by the review form key each check by
//! name (`{"checks": {"Secrets scanning": {"score": 2, "notes": ""}}}`) and keep the
//! metadata fields at the top level; report input lists checks as
//! `[{"name", "score", "notes"}]` under a `metadata` object. Both load into the same
//! [`ReviewRecord`].

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde_json::{json, Map, Value};
use time::macros::format_description;
use time::Date;

use super::checklist::ArtifactCategory;
use super::model::{Artifact, CheckMap, CheckResult, MetadataField, ReviewRecord, Score};

/// Legacy review-date key written by older drafts.
const LEGACY_REVIEW_DATE_KEY: &str = "crr_date";
const MISSING_CHECK_NAME: &str = "—";

pub fn parse_review_record(json: &str) -> CoreResult<ReviewRecord> {
    let value: Value = serde_json::from_str(json)?;
    review_record_from_value(value)
}

pub fn review_record_from_value(value: Value) -> CoreResult<ReviewRecord> {
    let Value::Object(mut root) = value else {
        return Err(CoreError::MalformedRecord(
            "top-level value must be an object".to_string(),
        ));
    };

    let mut record = ReviewRecord::default();

    let nested = match root.remove("metadata") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(m)) => m,
        Some(_) => {
            return Err(CoreError::MalformedRecord(
                "metadata must be an object".to_string(),
            ))
        }
    };
    apply_metadata(&mut record, &mut root, nested);

    for category in ArtifactCategory::ALL {
        let artifacts = match root.remove(category.key()) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| artifact_from_value(category, idx, item))
                .collect::<CoreResult<Vec<_>>>()?,
            Some(_) => {
                return Err(CoreError::MalformedRecord(format!(
                    "{} must be an array",
                    category.key()
                )))
            }
        };
        *record.artifacts_mut(category) = artifacts;
    }

    record.observations = root.remove("observations").map(text).unwrap_or_default();
    record.recommendation = root
        .remove("recommendation")
        .map(text)
        .unwrap_or_default();

    if !root.is_empty() {
        tracing::debug!(keys = ?root.keys().collect::<Vec<_>>(), "ignoring unrecognised top-level keys");
    }
    Ok(record)
}

/// Flat top-level metadata keys are read first; a `metadata` object overrides them.
fn apply_metadata(record: &mut ReviewRecord, root: &mut Map<String, Value>, nested: Map<String, Value>) {
    let meta = &mut record.metadata;
    for field in MetadataField::ALL {
        if let Some(v) = root.remove(field.key()).and_then(optional_text) {
            meta.set(field, v);
        }
    }
    let legacy_root_date = root.remove(LEGACY_REVIEW_DATE_KEY).and_then(optional_text);

    let mut legacy_nested_date = None;
    for (key, value) in nested {
        if key == LEGACY_REVIEW_DATE_KEY {
            legacy_nested_date = optional_text(value);
            continue;
        }
        match MetadataField::from_key(&key) {
            Some(field) => {
                if let Some(v) = optional_text(value) {
                    meta.set(field, v);
                }
            }
            None => {
                meta.extra.insert(key, value);
            }
        }
    }

    if meta.aimcr_date.is_none() {
        meta.aimcr_date = legacy_nested_date.or(legacy_root_date);
    }
    meta.aimcr_date = meta.aimcr_date.take().map(|d| normalize_date(&d));
    meta.proposal_date = meta.proposal_date.take().map(|d| normalize_date(&d));
}

fn artifact_from_value(category: ArtifactCategory, idx: usize, value: Value) -> CoreResult<Artifact> {
    let Value::Object(mut obj) = value else {
        return Err(CoreError::MalformedRecord(format!(
            "{}[{}] must be an object",
            category.key(),
            idx
        )));
    };
    let name = obj.remove("name").map(text).unwrap_or_default();

    let mut checks = CheckMap::default();
    match obj.remove("checks") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                let Value::Object(mut entry) = item else {
                    return Err(CoreError::MalformedRecord(format!(
                        "{}[{}].checks entries must be objects",
                        category.key(),
                        idx
                    )));
                };
                let check_name = entry
                    .remove("name")
                    .and_then(optional_text)
                    .unwrap_or_else(|| MISSING_CHECK_NAME.to_string());
                checks.push(check_name, check_result_from_fields(&mut entry));
            }
        }
        Some(Value::Object(keyed)) => {
            for (check_name, entry) in keyed {
                let Value::Object(mut entry) = entry else {
                    return Err(CoreError::MalformedRecord(format!(
                        "{}[{}].checks[{:?}] must be an object",
                        category.key(),
                        idx,
                        check_name
                    )));
                };
                checks.insert(check_name, check_result_from_fields(&mut entry));
            }
        }
        Some(_) => {
            return Err(CoreError::MalformedRecord(format!(
                "{}[{}].checks must be an array or an object",
                category.key(),
                idx
            )))
        }
    }
    checks.sort_for_category(category);

    Ok(Artifact { name, checks })
}

fn check_result_from_fields(entry: &mut Map<String, Value>) -> CheckResult {
    let score = match entry.remove("score") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let score = Score::from_json(&raw);
            if score.risk_score().is_none() {
                tracing::warn!(score = %raw, "score outside 1..=5 will not count toward risk");
            }
            Some(score)
        }
    };
    CheckResult {
        score,
        notes: entry.remove("notes").map(text).unwrap_or_default(),
    }
}

fn text(value: Value) -> String {
    optional_text(value).unwrap_or_default()
}

fn optional_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Rewrites `DD-MM-YYYY` to `YYYY-MM-DD`; anything else is kept as typed.
pub fn normalize_date(raw: &str) -> String {
    let day_first = format_description!("[day]-[month]-[year]");
    let iso = format_description!("[year]-[month]-[day]");
    match Date::parse(raw.trim(), &day_first) {
        Ok(date) => date.format(&iso).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

/// Draft file form: four-space indentation, non-ASCII written literally.
pub fn to_draft_json(record: &ReviewRecord) -> CoreResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| CoreError::InvalidInput(e.to_string()))
}

/// Report-input form: checks listed as `{name, score, notes}` objects.
pub fn to_report_input(record: &ReviewRecord) -> CoreResult<Value> {
    let mut root = Map::new();
    root.insert("metadata".to_string(), serde_json::to_value(&record.metadata)?);
    for category in ArtifactCategory::ALL {
        let artifacts: Vec<Value> = record
            .artifacts(category)
            .iter()
            .map(|artifact| -> CoreResult<Value> {
                let checks: Vec<Value> = artifact
                    .checks
                    .iter()
                    .map(|(name, result)| -> CoreResult<Value> {
                        let mut entry = json!({ "name": name, "notes": result.notes });
                        if let Some(score) = &result.score {
                            entry["score"] = serde_json::to_value(score)?;
                        }
                        Ok(entry)
                    })
                    .collect::<CoreResult<_>>()?;
                Ok(json!({ "name": artifact.name, "checks": checks }))
            })
            .collect::<CoreResult<_>>()?;
        root.insert(category.key().to_string(), Value::Array(artifacts));
    }
    root.insert("observations".to_string(), json!(record.observations));
    root.insert("recommendation".to_string(), json!(record.recommendation));
    Ok(Value::Object(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::checklist::RiskScore;
    use pretty_assertions::assert_eq;

    #[test]
    fn keyed_and_listed_checks_load_to_the_same_record() {
        let keyed = r#"{
            "metadata": {"project_id": "P1"},
            "models": [{"name": "llama", "checks": {
                "Export-controlled model": {"score": 2, "notes": "b"},
                "Model weights integrity (hash verification)": {"score": 5, "notes": "a"}
            }}]
        }"#;
        let listed = r#"{
            "metadata": {"project_id": "P1"},
            "models": [{"name": "llama", "checks": [
                {"name": "Model weights integrity (hash verification)", "score": 5, "notes": "a"},
                {"name": "Export-controlled model", "score": 2, "notes": "b"}
            ]}]
        }"#;
        let a = parse_review_record(keyed).unwrap();
        let b = parse_review_record(listed).unwrap();
        assert_eq!(a, b);
        let first = a.models[0].checks.iter().next().unwrap().0;
        assert_eq!(first, "Model weights integrity (hash verification)");
    }

    #[test]
    fn flat_editing_draft_lifts_metadata_and_legacy_date() {
        let flat = r#"{
            "project_id": "PROJ001",
            "proposal_title": "Vision",
            "proposal_date": "03-02-2025",
            "crr_date": "14-12-2025",
            "third_party_software": [],
            "source_code": [],
            "datasets_user_files": [],
            "models": []
        }"#;
        let record = parse_review_record(flat).unwrap();
        assert_eq!(record.metadata.project_id.as_deref(), Some("PROJ001"));
        assert_eq!(record.metadata.aimcr_date.as_deref(), Some("2025-12-14"));
        assert_eq!(record.metadata.proposal_date.as_deref(), Some("2025-02-03"));
        assert!(record.metadata.extra.is_empty());
    }

    #[test]
    fn canonical_date_wins_over_legacy_key() {
        let record = parse_review_record(
            r#"{"metadata": {"aimcr_date": "2025-01-01", "crr_date": "02-02-2025"}}"#,
        )
        .unwrap();
        assert_eq!(record.metadata.aimcr_date.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn unparseable_dates_are_kept_verbatim() {
        assert_eq!(normalize_date("next Tuesday"), "next Tuesday");
        assert_eq!(normalize_date("2025-06-30"), "2025-06-30");
    }

    #[test]
    fn missing_optional_fields_do_not_fail() {
        let record =
            parse_review_record(r#"{"source_code": [{"checks": [{"name": "Secrets scanning"}]}]}"#)
                .unwrap();
        let artifact = &record.source_code[0];
        assert_eq!(artifact.name, "");
        let result = artifact.checks.get("Secrets scanning").unwrap();
        assert!(result.score.is_none());
        assert!(result.notes.is_empty());
    }

    #[test]
    fn structural_errors_are_hard_failures() {
        assert!(parse_review_record("{not json").is_err());
        assert!(parse_review_record("[]").is_err());
        assert!(parse_review_record(r#"{"models": {}}"#).is_err());
        assert!(parse_review_record(r#"{"models": ["x"]}"#).is_err());
        assert!(parse_review_record(r#"{"models": [{"checks": 3}]}"#).is_err());
    }

    #[test]
    fn draft_json_uses_four_space_indent_and_literal_unicode() {
        let mut record = ReviewRecord::default();
        record.observations = "Überprüfung — ok".to_string();
        let text = to_draft_json(&record).unwrap();
        assert!(text.contains("\n    \"metadata\""));
        assert!(text.contains("Überprüfung — ok"));
    }

    #[test]
    fn report_input_shape_loads_back_identically() {
        let mut record = ReviewRecord::default();
        let mut artifact = Artifact::new_default(ArtifactCategory::DatasetsUserFiles, 1);
        artifact
            .checks
            .get_mut("Dataset provenance")
            .unwrap()
            .score = Some(RiskScore::High.into());
        record.datasets_user_files.push(artifact);
        record.recommendation = "Approve".to_string();

        let value = to_report_input(&record).unwrap();
        assert!(value["datasets_user_files"][0]["checks"].is_array());
        assert_eq!(review_record_from_value(value).unwrap(), record);
    }

    #[test]
    fn nameless_listed_checks_each_keep_a_row() {
        let record = parse_review_record(
            r#"{"models": [{"name": "m", "checks": [
                {"score": 3, "notes": "a"},
                {"score": 4, "notes": "b"}
            ]}]}"#,
        )
        .unwrap();
        let checks = &record.models[0].checks;
        assert_eq!(checks.len(), 2);
        assert_eq!(crate::review::risk::total_risk(checks.results()), 7);
        let notes: Vec<&str> = checks.iter().map(|(_, r)| r.notes.as_str()).collect();
        assert_eq!(notes, vec!["a", "b"]);

        let draft = to_draft_json(&record).unwrap();
        assert_eq!(parse_review_record(&draft).unwrap(), record);
    }
}
