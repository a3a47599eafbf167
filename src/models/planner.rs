// src/models/planner.rs
// DOCUMENTATION: AI planner wizard parameters and generated plan
// PURPOSE: Query-string state carried between wizard steps and the parsed AI reply

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TripPlanResponse;

/// Wizard steps in the order the user walks through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Schedule,
    Destination,
    Companions,
    Style,
    PaceTransport,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Schedule,
        WizardStep::Destination,
        WizardStep::Companions,
        WizardStep::Style,
        WizardStep::PaceTransport,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            WizardStep::Schedule => "schedule",
            WizardStep::Destination => "destination",
            WizardStep::Companions => "companions",
            WizardStep::Style => "style",
            WizardStep::PaceTransport => "pace-transport",
        }
    }

    pub fn from_slug(slug: &str) -> Option<WizardStep> {
        Self::ALL.iter().copied().find(|s| s.slug() == slug)
    }

    /// 1-based position
    pub fn number(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }

    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.number()).copied()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.number().checked_sub(2).map(|i| Self::ALL[i])
    }
}

pub const COMPANION_OPTIONS: &[&str] = &["solo", "couple", "friends", "family", "parents", "kids"];
pub const STYLE_OPTIONS: &[&str] = &[
    "nature",
    "culture",
    "food",
    "shopping",
    "activity",
    "relaxation",
    "photo",
];
pub const PACE_OPTIONS: &[&str] = &["relaxed", "moderate", "packed"];
pub const TRANSPORT_OPTIONS: &[&str] = &["public", "car", "walking", "taxi"];

/// Wizard state as carried in the URL query string.
/// Every field is optional; each step fills in its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companions: Option<String>,
    /// Comma-separated list of styles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
}

impl WizardParams {
    pub fn styles(&self) -> Vec<String> {
        self.style
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Fully validated wizard input, ready for prompt building
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub destination: String,
    pub region_id: Option<i64>,
    pub companions: String,
    pub styles: Vec<String>,
    pub pace: String,
    pub transport: String,
}

impl PlannerRequest {
    pub fn day_count(&self) -> i32 {
        super::trip_day_count(self.start_date, self.end_date)
    }
}

/// Options the frontend renders for a step
#[derive(Debug, Clone, Serialize)]
pub struct StepOptions {
    pub field: &'static str,
    pub choices: Vec<&'static str>,
    pub multiple: bool,
}

/// GET /planner/steps/{step}
#[derive(Debug, Clone, Serialize)]
pub struct StepStateResponse {
    pub step: WizardStep,
    pub step_number: usize,
    pub total_steps: usize,
    pub options: Vec<StepOptions>,
    pub params: WizardParams,
    /// Query string to carry to the next page
    pub query: String,
    pub previous: Option<String>,
    /// Path of the next page (step or generation) with the query appended
    pub next: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateQuery {
    #[serde(default)]
    pub save: bool,
}

/// Plan as returned by the generative-language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPlan {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub days: Vec<AiPlanDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPlanDay {
    pub day: i32,
    #[serde(default)]
    pub items: Vec<AiPlanItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPlanItem {
    #[serde(default)]
    pub time: Option<String>,
    pub place_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /planner/generate
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub plan: AiPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_trip: Option<TripPlanResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_navigation() {
        assert_eq!(WizardStep::Schedule.number(), 1);
        assert_eq!(WizardStep::PaceTransport.number(), 5);
        assert_eq!(WizardStep::Schedule.next(), Some(WizardStep::Destination));
        assert_eq!(WizardStep::PaceTransport.next(), None);
        assert_eq!(WizardStep::Schedule.previous(), None);
        assert_eq!(WizardStep::Style.previous(), Some(WizardStep::Companions));
        assert_eq!(
            WizardStep::from_slug("pace-transport"),
            Some(WizardStep::PaceTransport)
        );
        assert_eq!(WizardStep::from_slug("budget"), None);
    }

    #[test]
    fn test_styles_split() {
        let params = WizardParams {
            style: Some(" Food, nature,,culture ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.styles(), vec!["food", "nature", "culture"]);
        assert!(WizardParams::default().styles().is_empty());
    }
}
