//! Bundles every calculator into the payload the report dashboard renders.

use serde::Serialize;
use serde_json::Value;

use crate::analysis::{AnalysisResult, GapStatus, PremiumPayload, VideoSummary};
use crate::category::ContentCategory;
use crate::engagement::{calculate_engagement_metrics, EngagementMetrics, DEFAULT_TOTAL_VIEWS};
use crate::growth::{calculate_growth_drivers, GrowthDrivers};
use crate::health::{calculate_health_score, HealthScore};
use crate::landscape::{calculate_content_landscape, ContentLandscape};
use crate::numeric::round_to;
use crate::seo::{calculate_seo_metrics, SeoMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub videos_analyzed: usize,
    pub raw_comments: u64,
    pub filtered_comments: u64,
    pub true_gaps: u64,
    pub under_explained: u64,
    pub saturated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapCard {
    /// 1-based display position after ordering.
    pub rank: u32,
    pub topic: String,
    pub status: GapStatus,
    pub demand_score: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub category: ContentCategory,
    pub stats: ReportStats,
    pub engagement: EngagementMetrics,
    pub landscape: ContentLandscape,
    pub seo: SeoMetrics,
    pub growth: GrowthDrivers,
    pub health: HealthScore,
    pub gaps: Vec<GapCard>,
    pub videos: Vec<VideoSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<PremiumPayload>,
}

impl DashboardReport {
    /// Dashboard for a report with no usable analysis.
    #[must_use]
    pub fn fallback() -> Self {
        transform_to_dashboard_format(&AnalysisResult::default(), DEFAULT_TOTAL_VIEWS)
    }

    /// Build a dashboard from a stored `report_data` column.
    ///
    /// Total views come from the analysed videos when the worker reported
    /// them. Premium sections are dropped unless `include_premium` is set.
    #[must_use]
    pub fn from_report_data(report_data: Option<&Value>, include_premium: bool) -> Self {
        let Some(value) = report_data.filter(|v| !v.is_null()) else {
            return Self::fallback();
        };
        let mut result = AnalysisResult::from_value(value);
        if !include_premium {
            result.premium = None;
        }
        let views = observed_total_views(&result).unwrap_or(DEFAULT_TOTAL_VIEWS);
        transform_to_dashboard_format(&result, views)
    }
}

/// Sum of per-video view counts, if the worker reported any.
#[must_use]
pub fn observed_total_views(result: &AnalysisResult) -> Option<u64> {
    result
        .videos_analyzed
        .iter()
        .filter_map(|v| v.view_count)
        .reduce(u64::saturating_add)
        .filter(|views| *views > 0)
}

#[must_use]
pub fn transform_to_dashboard_format(result: &AnalysisResult, total_views: u64) -> DashboardReport {
    let engagement = calculate_engagement_metrics(result, total_views);
    let landscape = calculate_content_landscape(result);
    let seo = calculate_seo_metrics(result);
    let growth = calculate_growth_drivers(result, result.premium.as_ref());
    let health = calculate_health_score(&engagement, &seo, &growth);

    let stats = &result.pipeline_stats;
    DashboardReport {
        category: engagement.category,
        stats: ReportStats {
            videos_analyzed: result.videos_analyzed.len(),
            raw_comments: stats.raw_comments,
            filtered_comments: stats.filtered_comments,
            true_gaps: result.true_gap_count(),
            under_explained: stats.under_explained,
            saturated: result.saturated_count(),
        },
        engagement,
        landscape,
        seo,
        growth,
        health,
        gaps: rank_gaps(result),
        videos: result.videos_analyzed.clone(),
        premium: result.premium.clone(),
    }
}

/// Worker rank first, then status priority, then demand (highest first).
fn rank_gaps(result: &AnalysisResult) -> Vec<GapCard> {
    let mut gaps: Vec<_> = result
        .verified_gaps
        .iter()
        .filter(|g| !g.topic.trim().is_empty())
        .collect();
    gaps.sort_by(|a, b| {
        a.rank
            .unwrap_or(u32::MAX)
            .cmp(&b.rank.unwrap_or(u32::MAX))
            .then(a.status.priority().cmp(&b.status.priority()))
            .then(b.demand_score.total_cmp(&a.demand_score))
    });

    gaps.into_iter()
        .zip(1_u32..)
        .map(|(gap, rank)| GapCard {
            rank,
            topic: gap.topic.trim().to_string(),
            status: gap.status,
            demand_score: round_to(gap.demand_score, 1),
            evidence: gap.evidence.clone(),
        })
        .collect()
}
