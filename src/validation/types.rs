//! Validation result data: severities, issue taxonomy and aggregate results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::report;
use crate::params::WaveLayer;

/// How serious a finding is. Ordered: None < Info < Warning < Error < Critical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    None,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Score deducted per issue of this severity (Critical zeroes the score)
    fn penalty(self) -> f32 {
        match self {
            Severity::None => 0.0,
            Severity::Info => 0.05,
            Severity::Warning => 0.2,
            Severity::Error => 0.5,
            Severity::Critical => 1.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::None => "None",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    /// NaN/Infinity or values that break the maths outright
    SafetyViolation,
    /// Degenerate or visually unstable but computable
    StabilityRisk,
    /// Too expensive for the frame budget
    PerformanceImpact,
    /// Two settings contradict each other
    ParameterConflict,
    /// Outside the recommended range only
    Advisory,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The setting a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Amplitude(WaveLayer),
    Frequency(WaveLayer),
    Speed(WaveLayer),
    CellSize,
    GridSize,
    BubbleCount,
    MemoryUsage,
    TimeScale,
    AiDistanceScale,
    InterferenceAmplitude,
    InterferenceFrequency,
    StabilitySimulation,
}

impl Parameter {
    /// Report name, e.g. `WaveAmplitude` or `SecondaryWaveFrequency`
    pub fn name(&self) -> String {
        match self {
            Parameter::Amplitude(layer) => format!("{}WaveAmplitude", layer.name_prefix()),
            Parameter::Frequency(layer) => format!("{}WaveFrequency", layer.name_prefix()),
            Parameter::Speed(layer) => format!("{}WaveSpeed", layer.name_prefix()),
            Parameter::CellSize => "CellSize".to_string(),
            Parameter::GridSize => "GridSize".to_string(),
            Parameter::BubbleCount => "BubbleCount".to_string(),
            Parameter::MemoryUsage => "MemoryUsage".to_string(),
            Parameter::TimeScale => "TimeScale".to_string(),
            Parameter::AiDistanceScale => "AiDistanceScale".to_string(),
            Parameter::InterferenceAmplitude => "InterferenceAmplitude".to_string(),
            Parameter::InterferenceFrequency => "InterferenceFrequency".to_string(),
            Parameter::StabilitySimulation => "StabilitySimulation".to_string(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub issue_type: IssueType,
    pub parameter: Parameter,
    pub current_value: f32,
    pub recommended_value: f32,
    pub description: String,
    pub severity: Severity,
    /// Concrete fix, surfaced in `ValidationResult::recommended_actions`
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        issue_type: IssueType,
        parameter: Parameter,
        severity: Severity,
        current_value: f32,
        recommended_value: f32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            issue_type,
            parameter,
            current_value,
            recommended_value,
            description: description.into(),
            severity,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn parameter_name(&self) -> String {
        self.parameter.name()
    }
}

/// Outcome of one check or of a merged validation run.
///
/// Built fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no issue is at Error or above
    pub is_valid: bool,
    /// Highest issue severity
    pub severity: Severity,
    pub issues: Vec<ValidationIssue>,
    /// Quality score in [0, 1]
    pub score: f32,
    /// Multi-line human readable summary
    pub report: String,
    pub recommended_actions: Vec<String>,
}

impl ValidationResult {
    /// Result scored by per-issue penalties
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let score = issues
            .iter()
            .fold(1.0_f32, |score, issue| score - issue.severity.penalty());
        Self::from_issues_with_score(issues, score)
    }

    /// Result with a score computed by the caller.
    ///
    /// The score is clamped to [0, 1] and forced to 0 on any Critical issue.
    pub fn from_issues_with_score(issues: Vec<ValidationIssue>, score: f32) -> Self {
        let severity = max_severity(&issues);
        let score = if severity == Severity::Critical || !score.is_finite() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self::assemble(issues, severity, score)
    }

    /// Combine sub-results: mean score, max severity, issues concatenated
    pub fn merge(parts: Vec<ValidationResult>) -> Self {
        if parts.is_empty() {
            return Self::from_issues(Vec::new());
        }
        let mean = parts.iter().map(|p| p.score).sum::<f32>() / parts.len() as f32;
        let issues: Vec<ValidationIssue> = parts.into_iter().flat_map(|p| p.issues).collect();
        Self::from_issues_with_score(issues, mean)
    }

    fn assemble(issues: Vec<ValidationIssue>, severity: Severity, score: f32) -> Self {
        let is_valid = severity < Severity::Error;
        let recommended_actions = report::recommended_actions(&issues);
        let report = report::render(is_valid, severity, score, &issues, &recommended_actions);
        Self {
            is_valid,
            severity,
            issues,
            score,
            report,
            recommended_actions,
        }
    }

    /// Issues reported against `name` (e.g. `"WaveAmplitude"`)
    pub fn issues_for(&self, name: &str) -> impl Iterator<Item = &ValidationIssue> + '_ {
        let name = name.to_string();
        self.issues
            .iter()
            .filter(move |issue| issue.parameter_name() == name)
    }

    pub fn has_issue(&self, name: &str, issue_type: IssueType) -> bool {
        self.issues_for(name).any(|issue| issue.issue_type == issue_type)
    }
}

fn max_severity(issues: &[ValidationIssue]) -> Severity {
    issues
        .iter()
        .map(|issue| issue.severity)
        .max()
        .unwrap_or(Severity::None)
}
