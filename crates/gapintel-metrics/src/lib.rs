//! Report metric derivation for GAP Intel.
//!
//! Turns the analysis worker's `report_data` JSON into the scores shown on the
//! report dashboard. The worker's payload is normalised once by
//! [`AnalysisResult::from_value`]; every calculation after that point is a
//! pure, total function over the typed schema and never fails.

pub mod analysis;
pub mod category;
pub mod dashboard;
pub mod engagement;
pub mod growth;
pub mod health;
pub mod landscape;
pub mod seo;

mod lenient;
mod numeric;

pub use analysis::{
    AnalysisResult, CtrPrediction, FormatBreakdown, GapStatus, GrowthPatterns, PipelineStats,
    PremiumPayload, VerifiedGap, VideoSummary,
};
pub use category::{detect_content_category, ContentCategory, CvrBenchmark};
pub use dashboard::{
    observed_total_views, transform_to_dashboard_format, DashboardReport, GapCard, ReportStats,
};
pub use engagement::{
    calculate_engagement_metrics, CvrRating, EngagementMetrics, SentimentSplit,
    DEFAULT_TOTAL_VIEWS,
};
pub use growth::{calculate_growth_drivers, GrowthDriver, GrowthDriverKind, GrowthDrivers};
pub use health::{calculate_health_score, HealthArea, HealthBreakdown, HealthScore};
pub use landscape::{
    calculate_content_landscape, ContentLandscape, FormatMix, SaturationStatus, TopicCoverage,
};
pub use seo::{calculate_seo_metrics, HookPattern, SeoIssue, SeoIssueKind, SeoMetrics, TitleSeo};
