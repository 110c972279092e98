use serde::{Deserialize, Serialize};
use std::fmt;

/// The four artifact categories a review screens, in report order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    ThirdPartySoftware,
    SourceCode,
    DatasetsUserFiles,
    Models,
}

const THIRD_PARTY_SOFTWARE_CHECKS: [&str; 6] = [
    "Open-source license compliance",
    "Known vulnerabilities (CVE)",
    "Supply chain risks (typosquatting, protestware)",
    "Binary/source origin verification",
    "Malicious code insertion risk",
    "Dependency pinning & reproducibility",
];

const SOURCE_CODE_CHECKS: [&str; 6] = [
    "Static code analysis (bandit, semgrep)",
    "Secrets scanning",
    "Malicious code patterns",
    "Code provenance & signing",
    "Backdoors/trojans",
    "Obfuscated code",
];

const DATASETS_USER_FILES_CHECKS: [&str; 6] = [
    "Data poisoning risk",
    "PII / sensitive data leakage",
    "Copyright / licensing issues",
    "Adversarial examples",
    "Dataset provenance",
    "Jailbreak prompts in dataset",
];

const MODELS_CHECKS: [&str; 6] = [
    "Model weights integrity (hash verification)",
    "Known unsafe/refusal-bypassed models",
    "Backdoor/trojan in weights",
    "Model card completeness",
    "Unsafe fine-tuning detected",
    "Export-controlled model",
];

impl ArtifactCategory {
    pub const ALL: [ArtifactCategory; 4] = [
        ArtifactCategory::ThirdPartySoftware,
        ArtifactCategory::SourceCode,
        ArtifactCategory::DatasetsUserFiles,
        ArtifactCategory::Models,
    ];

    /// Record key used in drafts and report input.
    pub fn key(self) -> &'static str {
        match self {
            ArtifactCategory::ThirdPartySoftware => "third_party_software",
            ArtifactCategory::SourceCode => "source_code",
            ArtifactCategory::DatasetsUserFiles => "datasets_user_files",
            ArtifactCategory::Models => "models",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn report_title(self) -> &'static str {
        match self {
            ArtifactCategory::ThirdPartySoftware => "Third-Party Software",
            ArtifactCategory::SourceCode => "Source Code",
            ArtifactCategory::DatasetsUserFiles => "Datasets / User Files",
            ArtifactCategory::Models => "AI Models",
        }
    }

    /// Heading shown above the category on the review form.
    pub fn form_title(self) -> &'static str {
        match self {
            ArtifactCategory::ThirdPartySoftware => {
                "Third-Party Software (Packages, Libraries, Containers & Binaries) Screening Procedure"
            }
            ArtifactCategory::SourceCode => "Source Code Screening Procedure",
            ArtifactCategory::DatasetsUserFiles => "Datasets & User Files Screening Procedure",
            ArtifactCategory::Models => "Models Screening Procedure",
        }
    }

    pub fn check_names(self) -> &'static [&'static str; 6] {
        match self {
            ArtifactCategory::ThirdPartySoftware => &THIRD_PARTY_SOFTWARE_CHECKS,
            ArtifactCategory::SourceCode => &SOURCE_CODE_CHECKS,
            ArtifactCategory::DatasetsUserFiles => &DATASETS_USER_FILES_CHECKS,
            ArtifactCategory::Models => &MODELS_CHECKS,
        }
    }

    /// Position of `check` in this category's fixed order.
    pub fn check_position(self, check: &str) -> Option<usize> {
        self.check_names().iter().position(|name| *name == check)
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Closed set of reviewer-selectable risk levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskScore {
    #[default]
    NoRisk = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    Critical = 5,
}

impl RiskScore {
    pub const ALL: [RiskScore; 5] = [
        RiskScore::NoRisk,
        RiskScore::Low,
        RiskScore::Medium,
        RiskScore::High,
        RiskScore::Critical,
    ];

    pub fn value(self) -> u32 {
        self as u32
    }

    pub fn from_value(value: u64) -> Option<Self> {
        match value {
            1 => Some(RiskScore::NoRisk),
            2 => Some(RiskScore::Low),
            3 => Some(RiskScore::Medium),
            4 => Some(RiskScore::High),
            5 => Some(RiskScore::Critical),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskScore::NoRisk => "No Risk",
            RiskScore::Low => "Low Risk",
            RiskScore::Medium => "Medium Risk",
            RiskScore::High => "High Risk",
            RiskScore::Critical => "Critical Risk",
        }
    }

    /// Compact label used by the score selector.
    pub fn selector_label(self) -> &'static str {
        match self {
            RiskScore::NoRisk => "1-No",
            RiskScore::Low => "2-Low",
            RiskScore::Medium => "3-Med",
            RiskScore::High => "4-High",
            RiskScore::Critical => "5-Critical",
        }
    }
}

pub fn risk_score_legend() -> String {
    RiskScore::ALL
        .iter()
        .map(|s| format!("{} = {}", s.value(), s.label()))
        .collect::<Vec<_>>()
        .join(" • ")
}
