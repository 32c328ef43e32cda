//! Application use cases / business logic

pub mod publish;
pub mod render;
pub mod synthesize;

pub use publish::{PublishConfig, PublishPipeline, PublishPipelineError};
pub use render::{RenderConfig, Renderer};
pub use synthesize::{
    SynthesisOutcome, SynthesizeConfig, SynthesizeError, Synthesizer, announce_staged,
};
