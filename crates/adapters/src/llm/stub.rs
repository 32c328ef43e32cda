//! Stub idea generator for testing and offline mode

use async_trait::async_trait;
use dreampost_domain::{ContentIdea, GenerationError, IdeaGenerator};

/// Stub generator that returns a configurable idea
pub struct StubIdeaGenerator {
    response: Option<ContentIdea>,
    error: Option<GenerationError>,
}

impl StubIdeaGenerator {
    /// Create a stub that returns a fixed sample idea
    pub fn sample() -> Self {
        Self::with_response(ContentIdea {
            description: "a small owl reading by lantern light on a crescent moon".to_string(),
            caption: "Every quiet night is a page of its own.".to_string(),
            hashtags: "#dreamy #aiart #illustration #bedtime #calm".to_string(),
        })
    }

    /// Create a stub that returns a specific idea
    pub fn with_response(response: ContentIdea) -> Self {
        Self {
            response: Some(response),
            error: None,
        }
    }

    /// Create a stub that always returns an error
    pub fn with_error(error: GenerationError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }
}

impl Default for StubIdeaGenerator {
    fn default() -> Self {
        Self::sample()
    }
}

#[async_trait]
impl IdeaGenerator for StubIdeaGenerator {
    async fn generate_idea(&self) -> Result<ContentIdea, GenerationError> {
        if let Some(ref error) = self.error {
            return Err(match error {
                GenerationError::Api(msg) => GenerationError::Api(msg.clone()),
                GenerationError::InvalidFormat(msg) => GenerationError::InvalidFormat(msg.clone()),
                GenerationError::RateLimited => GenerationError::RateLimited,
                GenerationError::Timeout => GenerationError::Timeout,
                GenerationError::Config(msg) => GenerationError::Config(msg.clone()),
            });
        }

        match self.response {
            Some(ref idea) => Ok(idea.clone()),
            None => Err(GenerationError::Config(
                "stub has no response configured".to_string(),
            )),
        }
    }
}
