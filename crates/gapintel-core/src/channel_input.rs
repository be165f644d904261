//! Classification of the free-form channel string a creator types in.
//!
//! Accepts bare channel IDs, `@handles`, and the common `youtube.com` URL
//! shapes. Anything else is treated as a search query.

use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelInput {
    /// `UC…` channel ID (24 characters).
    ChannelId(String),
    /// Handle without the leading `@`.
    Handle(String),
    /// Legacy `/user/<name>` username.
    Username(String),
    /// Anything unrecognised, including `/c/<custom>` vanity URLs, which the
    /// Data API can only resolve through search.
    Search(String),
}

impl ChannelInput {
    /// Parse raw user input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyChannelInput`] for blank input.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyChannelInput);
        }

        if let Some(path) = youtube_path(trimmed) {
            let mut segments = path.split('/').filter(|s| !s.is_empty());
            return Ok(match (segments.next(), segments.next()) {
                (Some("channel"), Some(id)) if is_channel_id(id) => {
                    ChannelInput::ChannelId(id.to_string())
                }
                (Some("user"), Some(name)) => ChannelInput::Username(name.to_string()),
                (Some("c"), Some(name)) => ChannelInput::Search(name.to_string()),
                (Some(first), _) if first.starts_with('@') && first.len() > 1 => {
                    ChannelInput::Handle(first[1..].to_string())
                }
                _ => ChannelInput::Search(trimmed.to_string()),
            });
        }

        if let Some(handle) = trimmed.strip_prefix('@') {
            if !handle.is_empty() && !handle.contains(char::is_whitespace) {
                return Ok(ChannelInput::Handle(handle.to_string()));
            }
        }

        if is_channel_id(trimmed) {
            return Ok(ChannelInput::ChannelId(trimmed.to_string()));
        }

        Ok(ChannelInput::Search(trimmed.to_string()))
    }
}

/// Returns the path portion (without query/fragment) when `input` is a
/// `youtube.com` URL, with or without scheme.
fn youtube_path(input: &str) -> Option<&str> {
    let without_scheme = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);

    let (host, rest) = without_scheme
        .split_once('/')
        .unwrap_or((without_scheme, ""));
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let host = host.strip_prefix("m.").unwrap_or(host);
    if host != "youtube.com" {
        return None;
    }

    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn is_channel_id(s: &str) -> bool {
    s.len() == 24
        && s.starts_with("UC")
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "UC_x5XG1OV2P6uZZ5FSM9Ttw";

    #[test]
    fn bare_channel_id() {
        assert_eq!(
            ChannelInput::parse(ID).unwrap(),
            ChannelInput::ChannelId(ID.to_string())
        );
    }

    #[test]
    fn channel_url_with_trailing_tab_and_query() {
        let input = format!("https://www.youtube.com/channel/{ID}/videos?view=0");
        assert_eq!(
            ChannelInput::parse(&input).unwrap(),
            ChannelInput::ChannelId(ID.to_string())
        );
    }

    #[test]
    fn handle_forms() {
        let expected = ChannelInput::Handle("veritasium".to_string());
        assert_eq!(ChannelInput::parse("@veritasium").unwrap(), expected);
        assert_eq!(
            ChannelInput::parse("youtube.com/@veritasium").unwrap(),
            expected
        );
        assert_eq!(
            ChannelInput::parse("https://m.youtube.com/@veritasium/shorts").unwrap(),
            expected
        );
    }

    #[test]
    fn legacy_user_url() {
        assert_eq!(
            ChannelInput::parse("http://youtube.com/user/pewdiepie").unwrap(),
            ChannelInput::Username("pewdiepie".to_string())
        );
    }

    #[test]
    fn custom_url_falls_back_to_search() {
        assert_eq!(
            ChannelInput::parse("https://www.youtube.com/c/LinusTechTips").unwrap(),
            ChannelInput::Search("LinusTechTips".to_string())
        );
    }

    #[test]
    fn free_text_is_search() {
        assert_eq!(
            ChannelInput::parse("  Marques Brownlee ").unwrap(),
            ChannelInput::Search("Marques Brownlee".to_string())
        );
    }

    #[test]
    fn other_hosts_are_search() {
        assert_eq!(
            ChannelInput::parse("https://vimeo.com/channel/foo").unwrap(),
            ChannelInput::Search("https://vimeo.com/channel/foo".to_string())
        );
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(
            ChannelInput::parse("   ").unwrap_err(),
            CoreError::EmptyChannelInput
        );
    }
}
