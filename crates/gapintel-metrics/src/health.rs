//! Overall channel health score.

use serde::Serialize;

use crate::engagement::EngagementMetrics;
use crate::growth::GrowthDrivers;
use crate::numeric::{clamp_finite, round_to};
use crate::seo::SeoMetrics;

const ENGAGEMENT_WEIGHT: f64 = 0.25;
const SATISFACTION_WEIGHT: f64 = 0.25;
const SEO_WEIGHT: f64 = 0.20;
const GROWTH_WEIGHT: f64 = 0.15;
const TITLE_POTENTIAL_WEIGHT: f64 = 0.15;

const STRONG_THRESHOLD: f64 = 70.0;

const STRONG_INSIGHT: &str =
    "Your channel fundamentals are strong. Double down on the verified content gaps to keep growing.";
const ENGAGEMENT_INSIGHT: &str =
    "Viewers are watching but not talking. Ask direct questions in your videos to lift comment engagement.";
const SEO_INSIGHT: &str =
    "Your titles are holding you back. Front-load keywords and add a clear hook to lift click-through.";
const GROWTH_INSIGHT: &str =
    "Growth levers are underused. A consistent upload schedule and a recurring series compound reach.";

/// The sub-scores that can drive the headline insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthArea {
    Engagement,
    Seo,
    Growth,
}

impl HealthArea {
    fn insight(self) -> &'static str {
        match self {
            HealthArea::Engagement => ENGAGEMENT_INSIGHT,
            HealthArea::Seo => SEO_INSIGHT,
            HealthArea::Growth => GROWTH_INSIGHT,
        }
    }
}

/// Five sub-scores, each expected in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthBreakdown {
    pub engagement: f64,
    pub satisfaction: f64,
    pub seo: f64,
    pub growth: f64,
    pub title_potential: f64,
}

impl HealthBreakdown {
    /// Weighted blend of the sub-scores, clamped to `[0, 100]`.
    #[must_use]
    pub fn overall(&self) -> f64 {
        let blended = ENGAGEMENT_WEIGHT * self.engagement
            + SATISFACTION_WEIGHT * self.satisfaction
            + SEO_WEIGHT * self.seo
            + GROWTH_WEIGHT * self.growth
            + TITLE_POTENTIAL_WEIGHT * self.title_potential;
        round_to(clamp_finite(blended, 0.0, 100.0), 1)
    }

    /// Lowest of engagement, SEO and growth, or `None` when all are strong.
    #[must_use]
    pub fn weakest(&self) -> Option<HealthArea> {
        let areas = [
            (HealthArea::Engagement, self.engagement),
            (HealthArea::Seo, self.seo),
            (HealthArea::Growth, self.growth),
        ];
        if areas.iter().all(|(_, score)| *score >= STRONG_THRESHOLD) {
            return None;
        }
        let mut weakest = areas[0];
        for area in &areas[1..] {
            if area.1 < weakest.1 {
                weakest = *area;
            }
        }
        Some(weakest.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthScore {
    pub overall: f64,
    pub breakdown: HealthBreakdown,
    pub weakest: Option<HealthArea>,
    pub top_insight: &'static str,
}

impl HealthScore {
    #[must_use]
    pub fn from_breakdown(breakdown: HealthBreakdown) -> Self {
        let weakest = breakdown.weakest();
        Self {
            overall: breakdown.overall(),
            breakdown,
            weakest,
            top_insight: weakest.map_or(STRONG_INSIGHT, HealthArea::insight),
        }
    }
}

#[must_use]
pub fn calculate_health_score(
    engagement: &EngagementMetrics,
    seo: &SeoMetrics,
    growth: &GrowthDrivers,
) -> HealthScore {
    HealthScore::from_breakdown(HealthBreakdown {
        engagement: clamp_finite(engagement.engagement_score, 0.0, 100.0),
        satisfaction: f64::from(engagement.sentiments.positive.min(100)),
        seo: clamp_finite(seo.score, 0.0, 100.0),
        growth: clamp_finite(growth.score, 0.0, 100.0),
        title_potential: clamp_finite(seo.title_potential, 0.0, 100.0),
    })
}
