//! Channel category detection from video titles.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::VideoSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Tutorial,
    Gaming,
    Entertainment,
    News,
    Vlog,
    Review,
    Educational,
}

/// Comment-to-view ratio bounds (percent) typical for a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CvrBenchmark {
    pub low: f64,
    pub high: f64,
    pub top: f64,
}

impl ContentCategory {
    #[must_use]
    pub fn benchmark(self) -> CvrBenchmark {
        let (low, high, top) = match self {
            ContentCategory::Tutorial | ContentCategory::Review => (0.5, 1.5, 3.0),
            ContentCategory::Gaming => (0.8, 2.0, 4.0),
            ContentCategory::Entertainment => (0.3, 1.0, 2.5),
            ContentCategory::News | ContentCategory::Educational => (0.4, 1.2, 2.5),
            ContentCategory::Vlog => (0.6, 1.8, 3.5),
        };
        CvrBenchmark { low, high, top }
    }
}

// Declaration order doubles as the tie-break order.
const CATEGORY_PATTERNS: &[(ContentCategory, &str)] = &[
    (
        ContentCategory::Tutorial,
        r"how to|tutorials?|guide|step by step|tips|beginners?|diy|setup",
    ),
    (
        ContentCategory::Gaming,
        r"gameplay|let'?s play|walkthrough|playthrough|minecraft|fortnite|roblox|gaming|speedrun|boss fight",
    ),
    (
        ContentCategory::Entertainment,
        r"funny|prank|challenge|reacts?|reaction|comedy|memes?|try not to laugh",
    ),
    (
        ContentCategory::News,
        r"news|breaking|update|latest|this week in|announced",
    ),
    (
        ContentCategory::Vlog,
        r"vlog|day in the life|my life|routine|travel|storytime",
    ),
    (
        ContentCategory::Review,
        r"review|unboxing|vs|worth it|honest|tested|comparison",
    ),
];

static CATEGORY_REGEXES: LazyLock<Vec<(ContentCategory, Regex)>> = LazyLock::new(|| {
    CATEGORY_PATTERNS
        .iter()
        .map(|(category, alternatives)| {
            let re = Regex::new(&format!(r"\b(?:{alternatives})\b"))
                .expect("valid category regex");
            (*category, re)
        })
        .collect()
});

/// Classify a channel by counting keyword hits across all titles.
///
/// The category with the most hits wins; ties go to the earlier category in
/// declaration order, and no hits at all means [`ContentCategory::Educational`].
#[must_use]
pub fn detect_content_category(videos: &[VideoSummary]) -> ContentCategory {
    // Newline-joined so a phrase cannot straddle two titles.
    let text = videos
        .iter()
        .map(|v| v.title.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    let mut best = (ContentCategory::Educational, 0usize);
    for (category, re) in CATEGORY_REGEXES.iter() {
        let hits = re.find_iter(&text).count();
        if hits > best.1 {
            best = (*category, hits);
        }
    }
    best.0
}
