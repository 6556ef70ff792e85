//! Story and acceptance-test quality checks.
//!
//! Structural checks (INVEST prefixes for stories, Given/When/Then for
//! acceptance tests) produce errors; vocabulary checks (ambiguous terms,
//! numbers without units) produce warnings. A [`Policy`] decides whether
//! errors block a write. Everything here is a pure function of the text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::storage::{AcceptanceTest, Story};

/// Locale-tagged vocabulary that makes a requirement vague.
pub const AMBIGUOUS_TERMS: &[(&str, &[&str])] = &[
    (
        "en",
        &["optimize", "quickly", "soon", "some", "about", "approximately"],
    ),
    ("ko", &["빠르게", "적절히", "대략", "어느정도", "최대한"]),
];

static ROLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^As a .+").expect("role pattern compiles"));
static GOAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^I want .+").expect("goal pattern compiles"));
static BENEFIT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^So that .+").expect("benefit pattern compiles"));
static GWT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^Given .+ When .+ Then .+").expect("gwt pattern compiles")
});
// Longer unit spellings come first: alternation is leftmost-first.
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)(\s?(?:seconds|minutes|percent|sec|ms|px|kb|mb|s|%))?")
        .expect("number pattern compiles")
});

/// Enforcement policy for validation errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Issues are reported, writes always proceed.
    #[default]
    Warn,
    /// Errors (never warnings) prevent the write.
    Block,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Warn => write!(f, "warn"),
            Policy::Block => write!(f, "block"),
        }
    }
}

impl std::str::FromStr for Policy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(Policy::Warn),
            "block" => Ok(Policy::Block),
            _ => Err(AppError::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl Policy {
    /// Pick the policy for a request: the header wins over the parameter,
    /// and the configured default applies when neither is given.
    pub fn resolve(
        parameter: Option<&str>,
        header: Option<&str>,
        default: Policy,
    ) -> Result<Policy, AppError> {
        match header.or(parameter) {
            Some(value) => value.parse(),
            None => Ok(default),
        }
    }
}

/// Category of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Story role/goal/benefit prefix check.
    Invest,
    /// Acceptance test Given/When/Then check.
    Gwt,
    /// Vague vocabulary.
    Ambiguity,
    /// Number without a unit.
    Unit,
}

/// A single finding, optionally tied to a field (or a test id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    /// Message category.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Human-readable text.
    pub message: String,
    /// Field name or test id the message refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationMessage {
    /// Create a new message.
    pub fn new(kind: MessageKind, message: impl Into<String>, field: Option<&str>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: field.map(str::to_string),
        }
    }
}

/// Ordered warnings and errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Non-blocking findings.
    #[serde(default)]
    pub warnings: Vec<ValidationMessage>,
    /// Findings that block under [`Policy::Block`].
    #[serde(default)]
    pub errors: Vec<ValidationMessage>,
}

impl ValidationResult {
    /// Append another result, keeping order.
    pub fn extend(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// True when there is nothing to report.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

/// Validation outcome under a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyResult {
    /// Collected findings.
    pub validation: ValidationResult,
    /// Whether the write must be refused.
    pub blocked: bool,
}

impl PolicyResult {
    fn evaluate(validation: ValidationResult, policy: Policy) -> Self {
        let blocked = policy == Policy::Block && !validation.errors.is_empty();
        Self {
            validation,
            blocked,
        }
    }

    /// Turn a blocked outcome into an error carrying the offending messages.
    pub fn into_blocking_error(self, subject: &str) -> Result<ValidationResult, AppError> {
        if self.blocked {
            Err(AppError::Validation {
                message: subject.to_string(),
                details: self.validation.errors,
            })
        } else {
            Ok(self.validation)
        }
    }
}

fn collect_ambiguity(text: &str, field: &str, out: &mut Vec<ValidationMessage>) {
    let lowered = text.to_lowercase();
    for (_locale, terms) in AMBIGUOUS_TERMS {
        for term in terms.iter() {
            if lowered.contains(&term.to_lowercase()) {
                out.push(ValidationMessage::new(
                    MessageKind::Ambiguity,
                    format!("Ambiguous term '{}' detected", term),
                    Some(field),
                ));
            }
        }
    }
}

fn check_numeric_units(text: &str, field: &str, out: &mut Vec<ValidationMessage>) {
    for caps in NUMBER_PATTERN.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let has_unit = match caps.get(2) {
            Some(unit) if unit.as_str().ends_with('%') => true,
            Some(_) => !text[whole.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_'),
            None => false,
        };
        if !has_unit {
            out.push(ValidationMessage::new(
                MessageKind::Unit,
                format!(
                    "Numeric value '{}' should include an explicit unit",
                    number.as_str()
                ),
                Some(field),
            ));
        }
    }
}

fn collect_warnings(text: &str, field: &str, out: &mut Vec<ValidationMessage>) {
    collect_ambiguity(text, field, out);
    check_numeric_units(text, field, out);
}

/// Check a story's INVEST prefixes and vocabulary.
pub fn validate_story(story: &Story, policy: Policy) -> PolicyResult {
    let mut result = ValidationResult::default();

    let prefix_checks: [(&Regex, &str, &str, &str); 3] = [
        (&ROLE_PATTERN, &story.role, "role", "Role must start with 'As a'"),
        (&GOAL_PATTERN, &story.goal, "goal", "Goal must start with 'I want'"),
        (&BENEFIT_PATTERN, &story.benefit, "benefit", "Benefit must start with 'So that'"),
    ];
    for (pattern, text, field, message) in prefix_checks {
        if !pattern.is_match(text.trim()) {
            result
                .errors
                .push(ValidationMessage::new(MessageKind::Invest, message, Some(field)));
        }
    }

    for (field, text) in [
        ("title", &story.title),
        ("role", &story.role),
        ("goal", &story.goal),
        ("benefit", &story.benefit),
    ] {
        collect_warnings(text, field, &mut result.warnings);
    }

    PolicyResult::evaluate(result, policy)
}

/// Check acceptance tests for Given/When/Then shape and vocabulary.
pub fn validate_acceptance_tests<'a, I>(tests: I, policy: Policy) -> PolicyResult
where
    I: IntoIterator<Item = &'a AcceptanceTest>,
{
    let mut result = ValidationResult::default();

    for test in tests {
        let combined = format!("Given {} When {} Then {}", test.given, test.when, test.then)
            .replace('\n', " ");
        if !GWT_PATTERN.is_match(&combined) {
            result.errors.push(ValidationMessage::new(
                MessageKind::Gwt,
                "Acceptance tests must follow Given/When/Then format",
                Some(&test.id),
            ));
        }
        for (field, text) in [
            ("given", &test.given),
            ("when", &test.when),
            ("then", &test.then),
        ] {
            collect_warnings(text, field, &mut result.warnings);
        }
    }

    PolicyResult::evaluate(result, policy)
}
