//! Title SEO heuristics.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::analysis::{AnalysisResult, VideoSummary};
use crate::numeric::{len_f64, ratio, round_to};

const IDEAL_MIN_CHARS: usize = 50;
const IDEAL_MAX_CHARS: usize = 60;
const TOO_LONG_CHARS: usize = 70;
const MAX_LENGTH_SCORE: f64 = 40.0;
const MAX_HOOK_SCORE: u32 = 35;

static NUMBER_HOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d+\b|\b\d+\s+(?:ways|tips|things|reasons|mistakes|steps|ideas|tricks|hacks|secrets|rules|lessons)\b",
    )
    .expect("valid number hook regex")
});

static QUESTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:what|why|when|where|who|which|how|can|should|does|is|are)\b")
        .expect("valid question regex")
});

static HOW_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bhow to\b").expect("valid how-to regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPattern {
    Number,
    Question,
    HowTo,
}

impl HookPattern {
    fn points(self) -> u32 {
        match self {
            HookPattern::Number => 15,
            HookPattern::Question | HookPattern::HowTo => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoIssueKind {
    TooLong,
    NoHook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoIssue {
    pub kind: SeoIssueKind,
    pub affected_titles: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSeo {
    pub title: String,
    pub length: usize,
    pub length_score: f64,
    pub hook_score: u32,
    pub keyword_score: u32,
    pub total: f64,
    pub hooks: Vec<HookPattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoMetrics {
    /// Mean title total, 0–100.
    pub score: f64,
    pub average_title_length: f64,
    /// Percent of titles with at least one hook.
    pub hook_rate: f64,
    /// Mean hook strength as a percentage of the maximum hook score.
    pub title_potential: f64,
    pub titles: Vec<TitleSeo>,
    pub issues: Vec<SeoIssue>,
}

impl SeoMetrics {
    #[must_use]
    pub fn fallback() -> Self {
        calculate_seo_metrics(&AnalysisResult::default())
    }
}

#[must_use]
pub fn calculate_seo_metrics(result: &AnalysisResult) -> SeoMetrics {
    let titles: Vec<TitleSeo> = result.videos_analyzed.iter().map(score_title).collect();
    let n = len_f64(titles.len());

    let score = ratio(titles.iter().map(|t| t.total).sum(), n);
    let average_title_length = ratio(titles.iter().map(|t| len_f64(t.length)).sum(), n);
    let hooked = titles.iter().filter(|t| !t.hooks.is_empty()).count();
    let hook_rate = ratio(len_f64(hooked), n) * 100.0;
    let title_potential = ratio(
        titles
            .iter()
            .map(|t| f64::from(t.hook_score) / f64::from(MAX_HOOK_SCORE) * 100.0)
            .sum(),
        n,
    );

    let mut issues = Vec::new();
    let too_long = titles.iter().filter(|t| t.length > TOO_LONG_CHARS).count();
    if too_long > 0 {
        issues.push(SeoIssue {
            kind: SeoIssueKind::TooLong,
            affected_titles: too_long,
            message: format!(
                "{too_long} title(s) run past {TOO_LONG_CHARS} characters and will be truncated in search"
            ),
        });
    }
    let unhooked = titles.len() - hooked;
    if !titles.is_empty() && unhooked * 2 > titles.len() {
        issues.push(SeoIssue {
            kind: SeoIssueKind::NoHook,
            affected_titles: unhooked,
            message: format!("{unhooked} of {} titles have no hook", titles.len()),
        });
    }

    SeoMetrics {
        score: round_to(score, 1),
        average_title_length: round_to(average_title_length, 1),
        hook_rate: round_to(hook_rate, 1),
        title_potential: round_to(title_potential, 1),
        titles,
        issues,
    }
}

fn score_title(video: &VideoSummary) -> TitleSeo {
    let title = video.title.trim();
    let length = title.chars().count();
    let hooks = detect_hooks(title);
    let hook_score = hooks
        .iter()
        .map(|h| h.points())
        .sum::<u32>()
        .min(MAX_HOOK_SCORE);
    let length_score = length_score(length);
    let keyword_score = keyword_score(title);

    TitleSeo {
        title: title.to_string(),
        length,
        length_score: round_to(length_score, 1),
        hook_score,
        keyword_score,
        total: round_to(
            length_score + f64::from(hook_score) + f64::from(keyword_score),
            1,
        ),
        hooks,
    }
}

fn length_score(length: usize) -> f64 {
    if length < IDEAL_MIN_CHARS {
        MAX_LENGTH_SCORE * len_f64(length) / len_f64(IDEAL_MIN_CHARS)
    } else if length <= IDEAL_MAX_CHARS {
        MAX_LENGTH_SCORE
    } else {
        (MAX_LENGTH_SCORE - 2.0 * len_f64(length - IDEAL_MAX_CHARS)).max(0.0)
    }
}

fn detect_hooks(title: &str) -> Vec<HookPattern> {
    let lower = title.to_lowercase();
    let mut hooks = Vec::new();
    if NUMBER_HOOK.is_match(&lower) {
        hooks.push(HookPattern::Number);
    }
    let is_how_to = HOW_TO.is_match(&lower);
    if lower.contains('?') || (QUESTION_START.is_match(&lower) && !lower.starts_with("how to")) {
        hooks.push(HookPattern::Question);
    }
    if is_how_to {
        hooks.push(HookPattern::HowTo);
    }
    hooks
}

/// Rewards titles that lead with a substantive keyword.
fn keyword_score(title: &str) -> u32 {
    let position = title.split_whitespace().position(|word| {
        word.trim_matches(|c: char| !c.is_alphanumeric())
            .chars()
            .count()
            > 4
    });
    match position {
        Some(0..=2) => 25,
        Some(3..=5) => 15,
        Some(_) => 5,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_titles(titles: &[&str]) -> AnalysisResult {
        AnalysisResult {
            videos_analyzed: titles
                .iter()
                .map(|t| VideoSummary {
                    title: (*t).to_string(),
                    ..VideoSummary::default()
                })
                .collect(),
            ..AnalysisResult::default()
        }
    }

    #[test]
    fn ideal_length_without_hook() {
        let title = "Sourdough starter maintenance explained for busy bakers";
        assert_eq!(title.chars().count(), 55);

        let seo = calculate_seo_metrics(&result_with_titles(&[title]));
        let scored = &seo.titles[0];
        assert_eq!(scored.length_score, 40.0);
        assert_eq!(scored.hook_score, 0);
        assert!(scored.hooks.is_empty());
        assert_eq!(scored.keyword_score, 25);
        assert_eq!(scored.total, 65.0);

        let no_signal = calculate_seo_metrics(&result_with_titles(&["a b c"]));
        let all_hooks = calculate_seo_metrics(&result_with_titles(&[
            "7 ways how to fix sourdough starter that smells weird?",
        ]));
        assert!(no_signal.score < seo.score && seo.score < all_hooks.score);
    }

    #[test]
    fn length_score_curve() {
        assert_eq!(length_score(0), 0.0);
        assert_eq!(length_score(25), 20.0);
        assert_eq!(length_score(50), 40.0);
        assert_eq!(length_score(60), 40.0);
        assert_eq!(length_score(65), 30.0);
        assert_eq!(length_score(200), 0.0);
    }

    #[test]
    fn hook_detection() {
        assert_eq!(detect_hooks("10 bread mistakes"), vec![HookPattern::Number]);
        assert_eq!(detect_hooks("My 5 tips for bread"), vec![HookPattern::Number]);
        assert_eq!(detect_hooks("Bread in 2024"), Vec::<HookPattern>::new());
        assert_eq!(detect_hooks("Why is my bread flat"), vec![HookPattern::Question]);
        assert_eq!(detect_hooks("Flat bread?"), vec![HookPattern::Question]);
        assert_eq!(detect_hooks("How to shape a loaf"), vec![HookPattern::HowTo]);
        assert_eq!(detect_hooks("How I shape a loaf"), vec![HookPattern::Question]);
    }

    #[test]
    fn hook_score_is_capped() {
        let seo = calculate_seo_metrics(&result_with_titles(&["5 ways how to bake?"]));
        assert_eq!(seo.titles[0].hooks.len(), 3);
        assert_eq!(seo.titles[0].hook_score, MAX_HOOK_SCORE);
        assert_eq!(seo.title_potential, 100.0);
    }

    #[test]
    fn keyword_position_tiers() {
        assert_eq!(keyword_score("Bread basics"), 25);
        assert_eq!(keyword_score("a b c bread"), 15);
        assert_eq!(keyword_score("a b c d e f bread"), 5);
        assert_eq!(keyword_score("a b c"), 0);
    }

    #[test]
    fn flags_long_titles_and_missing_hooks() {
        let long = "An extremely long title about sourdough bread that keeps going and going on";
        assert!(long.chars().count() > 70);
        let seo = calculate_seo_metrics(&result_with_titles(&[long, "Plain bread", "How to bake"]));
        let kinds: Vec<_> = seo.issues.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![SeoIssueKind::TooLong, SeoIssueKind::NoHook]);
        assert_eq!(seo.issues[1].affected_titles, 2);
    }

    #[test]
    fn exactly_half_unhooked_is_not_flagged() {
        let seo = calculate_seo_metrics(&result_with_titles(&["Plain bread", "How to bake"]));
        assert!(seo.issues.is_empty());
        assert_eq!(seo.hook_rate, 50.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        let seo = SeoMetrics::fallback();
        assert_eq!(seo.score, 0.0);
        assert!(seo.issues.is_empty());
    }
}
