//! Topic saturation and format mix derived from video titles.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::analysis::{AnalysisResult, GapStatus};
use crate::numeric::{as_f64, len_f64, ratio, round_count, round_to};

const MIN_WORD_CHARS: usize = 5;
const TOPICS_PER_TITLE: usize = 3;
const MAX_TOPICS: usize = 10;
const OVER_RATIO: f64 = 1.5;
const UNDER_RATIO: f64 = 0.5;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "their", "there", "these", "those", "which", "while", "where",
    "would", "could", "should", "video", "videos", "every", "other", "being", "really", "never",
    "without",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationStatus {
    Over,
    Balanced,
    Under,
    /// Verified demand with no coverage in the catalogue.
    Gap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicCoverage {
    pub topic: String,
    pub video_count: u64,
    /// Count relative to the mean topic count.
    pub ratio: f64,
    pub status: SaturationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormatMix {
    pub long_form: u64,
    pub shorts: u64,
    pub live: u64,
    /// `true` when the counts are a fixed-share guess rather than worker data.
    pub estimated: bool,
    pub diversity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentLandscape {
    pub topics: Vec<TopicCoverage>,
    pub over_count: usize,
    pub balanced_count: usize,
    pub under_count: usize,
    pub gap_count: usize,
    pub formats: FormatMix,
}

impl ContentLandscape {
    #[must_use]
    pub fn fallback() -> Self {
        calculate_content_landscape(&AnalysisResult::default())
    }
}

#[must_use]
pub fn calculate_content_landscape(result: &AnalysisResult) -> ContentLandscape {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for video in &result.videos_analyzed {
        for word in title_topics(&video.title) {
            *counts.entry(word).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    // BTreeMap order is alphabetical and the sort is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(MAX_TOPICS);

    let total: u64 = ranked.iter().map(|(_, n)| n).sum();
    let mean = ratio(as_f64(total), len_f64(ranked.len()));

    let mut topics: Vec<TopicCoverage> = ranked
        .into_iter()
        .map(|(topic, video_count)| {
            let r = ratio(as_f64(video_count), mean);
            TopicCoverage {
                topic,
                video_count,
                ratio: round_to(r, 2),
                status: classify(r),
            }
        })
        .collect();

    let mut seen: HashSet<String> = topics.iter().map(|t| t.topic.to_lowercase()).collect();
    for gap in result
        .verified_gaps
        .iter()
        .filter(|g| g.status == GapStatus::TrueGap)
    {
        let topic = gap.topic.trim();
        if topic.is_empty() || !seen.insert(topic.to_lowercase()) {
            continue;
        }
        topics.push(TopicCoverage {
            topic: topic.to_string(),
            video_count: 0,
            ratio: 0.0,
            status: SaturationStatus::Gap,
        });
    }

    let count_of = |status| topics.iter().filter(|t| t.status == status).count();
    ContentLandscape {
        over_count: count_of(SaturationStatus::Over),
        balanced_count: count_of(SaturationStatus::Balanced),
        under_count: count_of(SaturationStatus::Under),
        gap_count: count_of(SaturationStatus::Gap),
        formats: format_mix(result),
        topics,
    }
}

/// Boundaries are exclusive: exactly 1.5x or 0.5x the mean is balanced.
fn classify(r: f64) -> SaturationStatus {
    if r > OVER_RATIO {
        SaturationStatus::Over
    } else if r < UNDER_RATIO {
        SaturationStatus::Under
    } else {
        SaturationStatus::Balanced
    }
}

/// Up to three candidate topic words from one title, most frequent first,
/// earlier occurrence winning ties.
fn title_topics(title: &str) -> Vec<String> {
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    let words = title
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS && !STOP_WORDS.contains(&w.as_str()));
    for (position, word) in words.enumerate() {
        freq.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(TOPICS_PER_TITLE)
        .map(|(word, _)| word)
        .collect()
}

fn format_mix(result: &AnalysisResult) -> FormatMix {
    let (long_form, shorts, live, estimated) = match result.format_breakdown {
        Some(b) => (b.long_form, b.shorts, b.live, false),
        None => {
            let n = len_f64(result.videos_analyzed.len());
            (
                round_count(0.7 * n),
                round_count(0.4 * n),
                round_count(0.2 * n),
                true,
            )
        }
    };
    let active = [long_form, shorts, live].iter().filter(|n| **n > 0).count();
    FormatMix {
        long_form,
        shorts,
        live,
        estimated,
        diversity_score: round_to(len_f64(active) / 3.0 * 100.0, 1),
    }
}
