//! Audience engagement metrics.

use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::category::{detect_content_category, ContentCategory, CvrBenchmark};
use crate::numeric::{as_f64, clamp_finite, len_f64, ratio, round_to};

/// View count assumed when the caller has no real figure.
pub const DEFAULT_TOTAL_VIEWS: u64 = 100_000;

const MAX_CVR: f64 = 5.0;
const MAX_QUESTION_DENSITY: f64 = 50.0;
/// Each pain point stands in for roughly three viewer questions.
const PAIN_POINT_QUESTION_FACTOR: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CvrRating {
    Below,
    Average,
    Good,
    Excellent,
}

/// Synthesised sentiment percentages. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentimentSplit {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementMetrics {
    pub category: ContentCategory,
    pub benchmark: CvrBenchmark,
    pub total_views: u64,
    pub total_comments: u64,
    /// Comment-to-view ratio in percent, capped at 5.
    pub cvr: f64,
    pub cvr_rating: CvrRating,
    /// Share of comments that are questions, in percent, capped at 50.
    pub question_density: f64,
    /// `true` when density was derived from pain points rather than counted.
    pub question_density_estimated: bool,
    pub depth_score: f64,
    pub repeat_engagement: f64,
    pub sentiments: SentimentSplit,
    /// Composite 0–100 score fed into the health score.
    pub engagement_score: f64,
}

impl EngagementMetrics {
    /// Metrics for a report with no usable data.
    #[must_use]
    pub fn fallback() -> Self {
        calculate_engagement_metrics(&AnalysisResult::default(), DEFAULT_TOTAL_VIEWS)
    }
}

/// Derive engagement metrics from a normalised analysis.
#[must_use]
pub fn calculate_engagement_metrics(result: &AnalysisResult, total_views: u64) -> EngagementMetrics {
    let category = detect_content_category(&result.videos_analyzed);
    let benchmark = category.benchmark();
    let stats = &result.pipeline_stats;
    let comments = as_f64(stats.raw_comments);

    let cvr = if stats.raw_comments == 0 || total_views == 0 {
        0.0
    } else {
        clamp_finite(comments / as_f64(total_views) * 100.0, 0.0, MAX_CVR)
    };

    let (raw_density, question_density_estimated) = match stats.questions_found {
        Some(questions) => (ratio(as_f64(questions), comments) * 100.0, false),
        None => (
            ratio(as_f64(stats.pain_points) * PAIN_POINT_QUESTION_FACTOR, comments) * 100.0,
            true,
        ),
    };
    let question_density = clamp_finite(raw_density, 0.0, MAX_QUESTION_DENSITY);

    let video_count = result.videos_analyzed.len();
    let avg_comments_per_video = ratio(comments, len_f64(video_count.max(1)));
    let depth_score = clamp_finite(
        question_density * 1.5 + 40.0 * avg_comments_per_video.min(200.0) / 200.0,
        0.0,
        100.0,
    );

    let repeat_engagement = if stats.raw_comments == 0 {
        0.0
    } else {
        clamp_finite(10.0 + 2.0 * len_f64(video_count), 10.0, 40.0)
    };

    let sentiments = synthesize_sentiment(result.true_gap_count(), result.saturated_count());

    let engagement_score = clamp_finite(
        50.0 * ratio(cvr, benchmark.top).min(1.0)
            + 25.0 * question_density / MAX_QUESTION_DENSITY
            + 0.25 * depth_score,
        0.0,
        100.0,
    );

    EngagementMetrics {
        category,
        benchmark,
        total_views,
        total_comments: stats.raw_comments,
        cvr: round_to(cvr, 2),
        cvr_rating: rate_cvr(cvr, benchmark),
        question_density: round_to(question_density, 1),
        question_density_estimated,
        depth_score: round_to(depth_score, 1),
        repeat_engagement: round_to(repeat_engagement, 1),
        sentiments,
        engagement_score: round_to(engagement_score, 1),
    }
}

fn rate_cvr(cvr: f64, benchmark: CvrBenchmark) -> CvrRating {
    if cvr < benchmark.low {
        CvrRating::Below
    } else if cvr < benchmark.high {
        CvrRating::Average
    } else if cvr < benchmark.top {
        CvrRating::Good
    } else {
        CvrRating::Excellent
    }
}

/// More unanswered demand means more frustrated comments; positivity is
/// anchored at 85% and loses 3 points per true gap, never below 50%.
fn synthesize_sentiment(true_gaps: u64, saturated: u64) -> SentimentSplit {
    let gap_penalty = u32::try_from(true_gaps.min(100)).unwrap_or(100) * 3;
    let positive = 85_u32.saturating_sub(gap_penalty).max(50);
    let saturated_weight = u32::try_from(saturated.min(100)).unwrap_or(100) * 2;
    let negative = (5 + saturated_weight).min(100 - positive);
    SentimentSplit {
        positive,
        neutral: 100 - positive - negative,
        negative,
    }
}
