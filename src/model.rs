//! Read-only views of the worksheet records handed to the exporters.
//!
//! Records arrive already validated and authorized; the engine only reads
//! them. Every optional member defaults so that sparse JSON records load.

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmotionEntry {
    pub label: String,
    /// 0..=10; zero means "not felt" and is dropped before display.
    pub intensity: u8,
}

impl EmotionEntry {
    pub fn new(label: impl Into<String>, intensity: u8) -> Self {
        Self {
            label: label.into(),
            intensity,
        }
    }
}

/// The parent stuck point a worksheet belongs to.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StuckPointSummary {
    pub category: Option<String>,
    pub statement: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AbcWorksheet {
    pub created_on: Option<NaiveDate>,
    pub activating_event: Option<String>,
    pub belief: Option<String>,
    /// Shown in the consequence column in place of free text.
    pub emotions: Vec<EmotionEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AlternativeThought {
    pub created_on: Option<NaiveDate>,
    pub situation: Option<String>,
    pub stuck_point: Option<String>,
    pub stuck_point_belief_before: Option<u8>,
    pub emotions_before: Vec<EmotionEntry>,

    // Exploring questions
    pub evidence_for: Option<String>,
    pub evidence_against: Option<String>,
    pub habit_or_fact: Option<String>,
    pub interpretations_not_accurate: Option<String>,
    pub all_or_none: Option<String>,
    pub extreme_or_exaggerated: Option<String>,
    pub out_of_context: Option<String>,
    pub source_reliable: Option<String>,
    pub low_vs_high_probability: Option<String>,
    pub based_on_feelings: Option<String>,

    // Patterns of problematic thinking
    pub jumping_to_conclusions: Option<String>,
    pub exaggerating_or_minimizing: Option<String>,
    pub disregarding_important_aspects: Option<String>,
    pub oversimplifying: Option<String>,
    pub overgeneralizing: Option<String>,
    pub mind_reading: Option<String>,
    pub emotional_reasoning: Option<String>,

    pub alternative_thought: Option<String>,
    pub alternative_thought_belief: Option<u8>,
    pub stuck_point_belief_after: Option<u8>,
    pub emotions_after: Vec<EmotionEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceType {
    DirectlyExperienced,
    Witnessed,
    LearnedAbout,
    RepeatedExposure,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    AccidentOrViolence,
    NaturalCauses,
    NotApplicable,
}

/// The traumatic event the baseline questionnaire is anchored to.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct IndexEvent {
    pub title: Option<String>,
    pub elapsed: Option<String>,
    /// Actual or threatened death, serious injury, or sexual violence.
    pub involved_threat: Option<bool>,
    pub experience: Option<ExperienceType>,
    pub death_cause: Option<DeathCause>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Baseline {
    pub completed_on: Option<NaiveDate>,
    /// One slot per PCL-5 item, 0..=4. Missing or `None` items score 0.
    pub pcl_answers: Vec<Option<u8>>,
    pub impact_statement: Option<String>,
}

/// Single ABC worksheet with its parent stuck point.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorksheetView {
    pub stuck_point: StuckPointSummary,
    pub worksheet: AbcWorksheet,
}

/// Single alternative-thoughts worksheet with its parent stuck point.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NarrativeView {
    pub stuck_point: StuckPointSummary,
    pub thought: AlternativeThought,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuestionnaireView {
    pub index_event: IndexEvent,
    pub baseline: Baseline,
}

/// A stuck point with every worksheet filed under it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AggregateView {
    pub stuck_point: StuckPointSummary,
    pub abc_worksheets: Vec<AbcWorksheet>,
    pub alternative_thoughts: Vec<AlternativeThought>,
}

/// Blank strings and absent values are treated identically.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// The uniform empty-state fallback for free text.
pub(crate) fn or_fallback<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    non_blank(value).unwrap_or(fallback)
}
