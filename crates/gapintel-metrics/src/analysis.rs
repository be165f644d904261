//! Typed schema for the worker's `report_data` payload.
//!
//! Every field is optional on the wire. [`AnalysisResult::from_value`] fills
//! defaults once so calculators never branch on missing data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub pipeline_stats: PipelineStats,
    pub verified_gaps: Vec<VerifiedGap>,
    pub videos_analyzed: Vec<VideoSummary>,
    /// Per-format video counts, present only when the worker classified formats.
    pub format_breakdown: Option<FormatBreakdown>,
    /// Extended analysis included for paid tiers.
    pub premium: Option<PremiumPayload>,
}

/// Raw counts reported by the worker's comment pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineStats {
    #[serde(deserialize_with = "lenient::count")]
    pub raw_comments: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub filtered_comments: u64,
    /// Direct question count. Older worker builds omit it.
    #[serde(deserialize_with = "lenient::opt_count")]
    pub questions_found: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub pain_points: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub true_gaps: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub saturated: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub under_explained: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapStatus {
    TrueGap,
    UnderExplained,
    Saturated,
    #[default]
    Unknown,
}

impl GapStatus {
    /// Parse worker labels such as `"TRUE_GAP"`, `"true gap"`, or `"under-explained"`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        match normalized.as_str() {
            "true_gap" | "gap" => GapStatus::TrueGap,
            "under_explained" | "underexplained" => GapStatus::UnderExplained,
            "saturated" | "already_covered" => GapStatus::Saturated,
            _ => GapStatus::Unknown,
        }
    }

    /// Sort key: true gaps first, unknown last.
    pub(crate) fn priority(self) -> u8 {
        match self {
            GapStatus::TrueGap => 0,
            GapStatus::UnderExplained => 1,
            GapStatus::Saturated => 2,
            GapStatus::Unknown => 3,
        }
    }
}

impl<'de> Deserialize<'de> for GapStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map_or(GapStatus::Unknown, GapStatus::from_label))
    }
}

/// A ranked topic the worker verified against the channel's catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifiedGap {
    #[serde(deserialize_with = "lenient::text")]
    pub topic: String,
    pub status: GapStatus,
    #[serde(deserialize_with = "lenient::string_list")]
    pub evidence: Vec<String>,
    #[serde(deserialize_with = "lenient::float")]
    pub demand_score: f64,
    #[serde(deserialize_with = "lenient::opt_rank")]
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSummary {
    #[serde(deserialize_with = "lenient::opt_text")]
    pub video_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::count")]
    pub comment_count: u64,
    #[serde(deserialize_with = "lenient::opt_count")]
    pub view_count: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatBreakdown {
    #[serde(deserialize_with = "lenient::count")]
    pub long_form: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub shorts: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub live: u64,
}

impl FormatBreakdown {
    /// Number of formats with at least one video.
    #[must_use]
    pub fn active_formats(&self) -> usize {
        [self.long_form, self.shorts, self.live]
            .iter()
            .filter(|n| **n > 0)
            .count()
    }
}

/// Extended analysis for paid tiers.
///
/// Only the fields the calculators read are typed; the rest are passed
/// through to the dashboard untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumPayload {
    pub ctr_predictions: Vec<CtrPrediction>,
    pub growth_patterns: GrowthPatterns,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub satisfaction_score: Option<f64>,
    pub thumbnail_analysis: Option<Value>,
    pub forecasts: Option<Value>,
    pub competitor_intel: Option<Value>,
    pub content_clusters: Option<Value>,
    pub publish_time_recommendations: Option<Value>,
    pub hook_insights: Option<Value>,
    pub color_insights: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtrPrediction {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::float")]
    pub predicted_ctr: f64,
    #[serde(alias = "optimized_title", deserialize_with = "lenient::opt_text")]
    pub optimized_concept: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthPatterns {
    #[serde(deserialize_with = "lenient::flag")]
    pub series_detected: bool,
    #[serde(deserialize_with = "lenient::opt_float")]
    pub consistency_score: Option<f64>,
}

impl AnalysisResult {
    /// Normalise an arbitrary `report_data` value.
    ///
    /// Sections are parsed independently: a malformed section (or a malformed
    /// element of a list section) is replaced by its default and logged, and
    /// the rest of the payload is kept.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!(
                    kind = value_kind(value),
                    "report_data is not an object; using empty analysis"
                );
            }
            return Self::default();
        };

        Self {
            pipeline_stats: section(map, "pipeline_stats"),
            verified_gaps: list_section(map, "verified_gaps"),
            videos_analyzed: list_section(map, "videos_analyzed"),
            format_breakdown: section(map, "format_breakdown"),
            premium: section(map, "premium"),
        }
    }

    /// Count of `true_gap` topics, preferring the pipeline's own tally.
    #[must_use]
    pub fn true_gap_count(&self) -> u64 {
        if self.pipeline_stats.true_gaps > 0 {
            return self.pipeline_stats.true_gaps;
        }
        self.count_gaps(GapStatus::TrueGap)
    }

    /// Count of saturated topics, preferring the pipeline's own tally.
    #[must_use]
    pub fn saturated_count(&self) -> u64 {
        if self.pipeline_stats.saturated > 0 {
            return self.pipeline_stats.saturated;
        }
        self.count_gaps(GapStatus::Saturated)
    }

    fn count_gaps(&self, status: GapStatus) -> u64 {
        self.verified_gaps
            .iter()
            .filter(|g| g.status == status)
            .count()
            .try_into()
            .unwrap_or(u64::MAX)
    }
}

fn section<T>(map: &Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match map.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            tracing::warn!(section = key, error = %e, "malformed report_data section; using default");
            T::default()
        }),
    }
}

fn list_section<T>(map: &Map<String, Value>, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    match map.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                serde_json::from_value(item.clone())
                    .map_err(|e| {
                        tracing::warn!(section = key, index, error = %e, "skipping malformed entry");
                    })
                    .ok()
            })
            .collect(),
        Some(other) => {
            tracing::warn!(
                section = key,
                kind = value_kind(other),
                "expected an array; using empty list"
            );
            Vec::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
