//! Text model adapters producing the daily idea

pub mod openai;
pub mod stub;

pub use openai::OpenAiIdeaGenerator;
pub use stub::StubIdeaGenerator;

use dreampost_domain::ContentIdea;
use serde::{Deserialize, Serialize};

/// Common LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Sampling temperature; kept high so subjects vary day to day
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.8,
            max_output_tokens: 400,
            timeout_secs: 60,
        }
    }
}

/// Fixed instruction constraining tone, domain, and output shape
pub const SYSTEM_PROMPT: &str = "You are an AI assistant that generates creative ideas for 'Dreamy Monotone Worlds' illustrations. \
Your goal is to create a unique, whimsical, and peaceful scene description each day for a bedtime-themed post. \
The scenes should be minimalist and imaginative. Think about animals, magical objects, or serene landscapes. \
Avoid repeating subjects. Be creative and diverse. \
Alongside the scene, create a short, motivational caption with a calm, dreamy tone. \
Finally, provide a string of 5-7 relevant hashtags, starting with a # and separated by spaces (e.g., '#aiart #dreamy #illustration #animation #digitalart'). \
You must respond ONLY in JSON format with three keys: 'description', 'caption', and 'hashtags'.";

/// Fixed user request
pub const USER_PROMPT: &str =
    "Please generate a new scene description, a caption, and hashtags for today's post.";

#[derive(Deserialize)]
struct IdeaResponse {
    description: String,
    caption: String,
    hashtags: String,
}

/// Parse the model's JSON answer into a validated idea
pub fn parse_idea_response(response: &str) -> Result<ContentIdea, String> {
    let json_str = extract_json(response);

    let parsed: IdeaResponse =
        serde_json::from_str(json_str).map_err(|e| format!("Failed to parse JSON: {}", e))?;

    ContentIdea {
        description: parsed.description,
        caption: parsed.caption,
        hashtags: parsed.hashtags,
    }
    .validated()
    .map_err(|e| e.to_string())
}

/// Extract JSON from response (handles markdown code blocks)
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return trimmed[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let content = trimmed[start + 3..start + 3 + end].trim();
            // Skip language identifier if present
            if let Some(newline) = content.find('\n') {
                let first_line = &content[..newline];
                if !first_line.starts_with('{') {
                    return content[newline + 1..].trim();
                }
            }
            return content;
        }
    }

    trimmed
}
