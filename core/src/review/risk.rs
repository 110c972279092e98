use serde::Serialize;
use std::fmt;

use super::checklist::{ArtifactCategory, RiskScore};
use super::model::{Artifact, CheckResult, ReviewRecord};

const CRITICAL_TOTAL: u32 = 21;
const HIGH_TOTAL: u32 = 15;
const MEDIUM_TOTAL: u32 = 10;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Colour hint for live displays.
    pub fn display_colour(self) -> &'static str {
        match self {
            Severity::Critical => "red",
            Severity::High => "orange",
            Severity::Medium | Severity::Low => "green",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worst score seen for one check across a category's artifacts.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckMaximum {
    pub check: &'static str,
    /// `None` when no artifact carries a usable score for the check.
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryRisk {
    pub category: ArtifactCategory,
    pub total: u32,
    pub severity: Severity,
    pub has_critical_check: bool,
    pub per_check_max: Vec<CheckMaximum>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReviewRisk {
    pub total: u32,
    pub is_critical: bool,
    /// Only categories holding at least one artifact.
    pub categories: Vec<CategoryRisk>,
}

impl ReviewRisk {
    pub fn verdict(&self) -> &'static str {
        if self.is_critical {
            "CRITICAL — Senior review required"
        } else {
            "Acceptable"
        }
    }
}

/// Sum of usable scores. Missing and out-of-set scores contribute nothing.
pub fn total_risk<'a>(results: impl IntoIterator<Item = &'a CheckResult>) -> u32 {
    results
        .into_iter()
        .filter_map(|r| r.score.as_ref().and_then(|s| s.value()))
        .sum()
}

pub fn classify_severity(total: u32, has_critical_check: bool) -> Severity {
    if has_critical_check || total >= CRITICAL_TOTAL {
        Severity::Critical
    } else if total >= HIGH_TOTAL {
        Severity::High
    } else if total >= MEDIUM_TOTAL {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Category risk is driven by the worst artifact per check, not by how many
/// artifacts there are. Returns `None` for a category without artifacts.
pub fn category_risk(category: ArtifactCategory, artifacts: &[Artifact]) -> Option<CategoryRisk> {
    if artifacts.is_empty() {
        return None;
    }

    let per_check_max: Vec<CheckMaximum> = category
        .check_names()
        .iter()
        .map(|check| CheckMaximum {
            check: *check,
            max: artifacts
                .iter()
                .filter_map(|a| a.checks.get(check))
                .filter_map(|r| r.score.as_ref().and_then(|s| s.value()))
                .max(),
        })
        .collect();

    let total = per_check_max.iter().filter_map(|m| m.max).sum();
    let has_critical_check = per_check_max
        .iter()
        .any(|m| m.max == Some(RiskScore::Critical.value()));
    let severity = classify_severity(total, has_critical_check);

    tracing::debug!(
        category = category.key(),
        artifacts = artifacts.len(),
        total,
        severity = severity.as_str(),
        "category risk computed"
    );

    Some(CategoryRisk {
        category,
        total,
        severity,
        has_critical_check,
        per_check_max,
    })
}

pub fn review_risk(record: &ReviewRecord) -> ReviewRisk {
    let categories: Vec<CategoryRisk> = ArtifactCategory::ALL
        .iter()
        .filter_map(|c| category_risk(*c, record.artifacts(*c)))
        .collect();
    let total = categories.iter().map(|c| c.total).sum();
    let is_critical = total >= CRITICAL_TOTAL || categories.iter().any(|c| c.has_critical_check);
    ReviewRisk {
        total,
        is_critical,
        categories,
    }
}
