//! Caption and hashtag formatting constraints

use regex::Regex;
use std::sync::OnceLock;

/// Policy configuration
#[derive(Debug, Clone)]
pub struct CaptionPolicy {
    /// Maximum characters for the post title
    pub title_max_chars: usize,
    /// Expected hashtag count range (inclusive)
    pub min_hashtags: usize,
    pub max_hashtags: usize,
}

impl Default for CaptionPolicy {
    fn default() -> Self {
        Self {
            title_max_chars: 90,
            min_hashtags: 5,
            max_hashtags: 7,
        }
    }
}

const ELLIPSIS: &str = "...";

impl CaptionPolicy {
    /// Caption cut down to the title ceiling, marked with a trailing ellipsis
    pub fn title(&self, caption: &str) -> String {
        let caption = caption.trim();
        if caption.chars().count() <= self.title_max_chars {
            return caption.to_string();
        }

        // No room for the marker: hard cut
        if self.title_max_chars <= ELLIPSIS.len() {
            return caption.chars().take(self.title_max_chars).collect();
        }

        let keep = self.title_max_chars - ELLIPSIS.len();
        let truncated: String = caption.chars().take(keep).collect();
        format!("{}{}", truncated.trim_end(), ELLIPSIS)
    }

    /// Full caption followed by the hashtags
    pub fn description(&self, caption: &str, hashtags: &str) -> String {
        format!("{}\n\n{}", caption.trim(), hashtags.trim())
    }

    /// Collapse whitespace and add missing `#` prefixes
    pub fn normalize_hashtags(&self, hashtags: &str) -> String {
        hashtags
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty() && *token != "#")
            .map(|token| {
                if token.starts_with('#') {
                    token.to_string()
                } else {
                    format!("#{}", token)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the tag count falls inside the expected range
    pub fn hashtag_count_ok(&self, hashtags: &str) -> bool {
        let count = hashtag_regex().find_iter(hashtags).count();
        (self.min_hashtags..=self.max_hashtags).contains(&count)
    }
}

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)#[\p{L}\p{N}_]+").expect("valid hashtag regex"))
}
