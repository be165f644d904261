//! Wire types for the `channels` and `search` resources.

use serde::{Deserialize, Serialize};

/// The channel summary returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub title: String,
    pub custom_url: Option<String>,
    /// `None` when the channel hides its subscriber count.
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelItem {
    pub id: String,
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub custom_url: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    pub high: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub default: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available thumbnail.
    pub fn best(&self) -> Option<&str> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .next()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelStatistics {
    #[serde(default)]
    pub subscriber_count: Option<String>,
    #[serde(default)]
    pub video_count: Option<String>,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchId {
    #[serde(default)]
    pub channel_id: Option<String>,
}

impl From<ChannelItem> for ChannelInfo {
    fn from(item: ChannelItem) -> Self {
        let stats = item.statistics.as_ref();
        let subscriber_count = stats
            .filter(|s| !s.hidden_subscriber_count)
            .and_then(|s| s.subscriber_count.as_deref())
            .and_then(|n| n.parse().ok());
        let video_count = stats
            .and_then(|s| s.video_count.as_deref())
            .and_then(|n| n.parse().ok());

        ChannelInfo {
            thumbnail_url: item.snippet.thumbnails.best().map(str::to_string),
            channel_id: item.id,
            title: item.snippet.title,
            custom_url: item.snippet.custom_url,
            subscriber_count,
            video_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_item_maps_to_info() {
        let item: ChannelItem = serde_json::from_value(json!({
            "id": "UC1234567890123456789012",
            "snippet": {
                "title": "Bread Lab",
                "customUrl": "@breadlab",
                "thumbnails": {
                    "default": { "url": "https://yt3.ggpht.com/s88" },
                    "medium": { "url": "https://yt3.ggpht.com/s240" }
                }
            },
            "statistics": { "subscriberCount": "15400", "videoCount": "87" }
        }))
        .expect("parse");

        let info = ChannelInfo::from(item);
        assert_eq!(info.title, "Bread Lab");
        assert_eq!(info.subscriber_count, Some(15_400));
        assert_eq!(info.video_count, Some(87));
        assert_eq!(info.thumbnail_url.as_deref(), Some("https://yt3.ggpht.com/s240"));
    }

    #[test]
    fn hidden_subscriber_count_is_none() {
        let item: ChannelItem = serde_json::from_value(json!({
            "id": "UC1234567890123456789012",
            "snippet": { "title": "Quiet" },
            "statistics": { "subscriberCount": "0", "hiddenSubscriberCount": true }
        }))
        .expect("parse");
        let info = ChannelInfo::from(item);
        assert_eq!(info.subscriber_count, None);
        assert_eq!(info.thumbnail_url, None);
    }
}
