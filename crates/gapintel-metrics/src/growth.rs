//! Growth driver checklist.
//!
//! The impact labels are fixed marketing copy shown next to each driver, not
//! computed effects.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::analysis::{AnalysisResult, PremiumPayload};
use crate::numeric::{len_f64, round_to};

const CONSISTENCY_MIN_VIDEOS: usize = 8;
const COMMUNITY_MIN_COMMENTS: u64 = 200;
const SERIES_MIN_TITLES: usize = 2;

static SERIES_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:part|pt\.?|ep\.?|episode|chapter|day)\s*#?\d+\b|(?:^|\s)#\d+")
        .expect("valid series regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthDriverKind {
    Consistency,
    Series,
    Community,
    MultiFormat,
}

impl GrowthDriverKind {
    pub const ALL: [GrowthDriverKind; 4] = [
        GrowthDriverKind::Consistency,
        GrowthDriverKind::Series,
        GrowthDriverKind::Community,
        GrowthDriverKind::MultiFormat,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GrowthDriverKind::Consistency => "Consistent uploads",
            GrowthDriverKind::Series => "Content series",
            GrowthDriverKind::Community => "Community engagement",
            GrowthDriverKind::MultiFormat => "Multi-format publishing",
        }
    }

    #[must_use]
    pub fn impact(self) -> &'static str {
        match self {
            GrowthDriverKind::Consistency => "+156% growth",
            GrowthDriverKind::Series => "+89% watch time",
            GrowthDriverKind::Community => "+67% retention",
            GrowthDriverKind::MultiFormat => "+43% reach",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrowthDriver {
    pub kind: GrowthDriverKind,
    pub label: &'static str,
    pub implemented: bool,
    pub impact: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthDrivers {
    pub drivers: Vec<GrowthDriver>,
    pub implemented_count: usize,
    /// Share of drivers implemented, 0–100.
    pub score: f64,
}

impl GrowthDrivers {
    #[must_use]
    pub fn fallback() -> Self {
        calculate_growth_drivers(&AnalysisResult::default(), None)
    }
}

/// Evaluate the four growth drivers.
///
/// `premium` is passed separately so callers can withhold paid-tier signals
/// (the series flag) for free reports even when the worker produced them.
#[must_use]
pub fn calculate_growth_drivers(
    result: &AnalysisResult,
    premium: Option<&PremiumPayload>,
) -> GrowthDrivers {
    let drivers: Vec<GrowthDriver> = GrowthDriverKind::ALL
        .iter()
        .map(|&kind| GrowthDriver {
            kind,
            label: kind.label(),
            implemented: is_implemented(kind, result, premium),
            impact: kind.impact(),
        })
        .collect();

    let implemented_count = drivers.iter().filter(|d| d.implemented).count();
    let score = len_f64(implemented_count) / len_f64(drivers.len()) * 100.0;

    GrowthDrivers {
        drivers,
        implemented_count,
        score: round_to(score, 1),
    }
}

fn is_implemented(
    kind: GrowthDriverKind,
    result: &AnalysisResult,
    premium: Option<&PremiumPayload>,
) -> bool {
    match kind {
        GrowthDriverKind::Consistency => result.videos_analyzed.len() > CONSISTENCY_MIN_VIDEOS,
        GrowthDriverKind::Series => {
            premium.is_some_and(|p| p.growth_patterns.series_detected)
                || series_title_count(result) >= SERIES_MIN_TITLES
        }
        GrowthDriverKind::Community => {
            result.pipeline_stats.raw_comments > COMMUNITY_MIN_COMMENTS
        }
        GrowthDriverKind::MultiFormat => result
            .format_breakdown
            .is_some_and(|b| b.active_formats() >= 2),
    }
}

fn series_title_count(result: &AnalysisResult) -> usize {
    result
        .videos_analyzed
        .iter()
        .filter(|v| SERIES_MARKER.is_match(&v.title.to_lowercase()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FormatBreakdown, GrowthPatterns, PipelineStats, VideoSummary};

    fn videos(titles: &[&str]) -> Vec<VideoSummary> {
        titles
            .iter()
            .map(|t| VideoSummary {
                title: (*t).to_string(),
                ..VideoSummary::default()
            })
            .collect()
    }

    fn implemented(drivers: &GrowthDrivers, kind: GrowthDriverKind) -> bool {
        drivers
            .drivers
            .iter()
            .find(|d| d.kind == kind)
            .is_some_and(|d| d.implemented)
    }

    #[test]
    fn empty_result_implements_nothing() {
        let drivers = GrowthDrivers::fallback();
        assert_eq!(drivers.drivers.len(), 4);
        assert_eq!(drivers.implemented_count, 0);
        assert_eq!(drivers.score, 0.0);
    }

    #[test]
    fn consistency_needs_more_than_eight_videos() {
        let mut result = AnalysisResult {
            videos_analyzed: videos(&["v"; 8]),
            ..AnalysisResult::default()
        };
        assert!(!implemented(
            &calculate_growth_drivers(&result, None),
            GrowthDriverKind::Consistency
        ));
        result.videos_analyzed.push(VideoSummary::default());
        assert!(implemented(
            &calculate_growth_drivers(&result, None),
            GrowthDriverKind::Consistency
        ));
    }

    #[test]
    fn series_from_titles_or_premium_flag() {
        let result = AnalysisResult {
            videos_analyzed: videos(&["Bread school part 1", "Bread school Part 2", "Other"]),
            ..AnalysisResult::default()
        };
        assert!(implemented(
            &calculate_growth_drivers(&result, None),
            GrowthDriverKind::Series
        ));

        let single = AnalysisResult {
            videos_analyzed: videos(&["Episode 4: crumb", "Partial proofing"]),
            ..AnalysisResult::default()
        };
        assert!(!implemented(
            &calculate_growth_drivers(&single, None),
            GrowthDriverKind::Series
        ));

        let premium = PremiumPayload {
            growth_patterns: GrowthPatterns {
                series_detected: true,
                consistency_score: None,
            },
            ..PremiumPayload::default()
        };
        assert!(implemented(
            &calculate_growth_drivers(&single, Some(&premium)),
            GrowthDriverKind::Series
        ));
    }

    #[test]
    fn community_and_multi_format() {
        let result = AnalysisResult {
            pipeline_stats: PipelineStats {
                raw_comments: 201,
                ..PipelineStats::default()
            },
            format_breakdown: Some(FormatBreakdown {
                long_form: 4,
                shorts: 2,
                live: 0,
            }),
            ..AnalysisResult::default()
        };
        let drivers = calculate_growth_drivers(&result, None);
        assert!(implemented(&drivers, GrowthDriverKind::Community));
        assert!(implemented(&drivers, GrowthDriverKind::MultiFormat));
        assert_eq!(drivers.implemented_count, 2);
        assert_eq!(drivers.score, 50.0);
    }

    #[test]
    fn impact_labels_are_fixed() {
        let drivers = GrowthDrivers::fallback();
        let impacts: Vec<_> = drivers.drivers.iter().map(|d| d.impact).collect();
        assert_eq!(
            impacts,
            vec!["+156% growth", "+89% watch time", "+67% retention", "+43% reach"]
        );
    }
}
