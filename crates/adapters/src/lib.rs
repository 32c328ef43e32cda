//! dreampost adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `llm`: Text model adapters producing the daily idea
//! - `imaging`: Image model adapters and the raster codec
//! - `storage`: S3-compatible and local-directory object storage
//! - `staging`: File and in-memory staging stores
//! - `notify`: Slack webhook notifier
//! - `tiktok`: TikTok credential refresh and content posting

mod slack;
mod staging_fs;
mod staging_memory;

pub mod imaging;
pub mod llm;
pub mod storage;
pub mod tiktok;

/// Re-exports for staging adapters
pub mod staging {
    pub use crate::staging_fs::FsStagingStore;
    pub use crate::staging_memory::InMemoryStagingStore;
}

/// Re-exports for notification adapters
pub mod notify {
    pub use crate::slack::SlackNotifier;
}

#[cfg(test)]
mod tests {
    use super::imaging::StubImageGenerator;
    use super::llm::StubIdeaGenerator;
    use super::notify::SlackNotifier;
    use super::staging::InMemoryStagingStore;
    use super::tiktok::{RefreshTokenStore, TikTokConfig, TikTokCredentials, TikTokPlatform};
    use dreampost_domain::usecases::{
        PublishConfig, PublishPipeline, SynthesizeConfig, Synthesizer,
    };
    use dreampost_domain::{MediaReference, PendingContent, StagingStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_offline_adapters_stage_a_publishable_post() {
        let staging = Arc::new(InMemoryStagingStore::new());

        let synthesizer = Synthesizer::new(
            Arc::new(StubIdeaGenerator::sample()),
            Arc::new(StubImageGenerator::remote("https://cdn.example/owl.png")),
            None,
            staging.clone(),
            Arc::new(SlackNotifier::disabled()),
            SynthesizeConfig {
                notify: false,
                ..Default::default()
            },
        );

        let outcome = synthesizer.run().await.unwrap();
        assert!(!outcome.notified);
        assert_eq!(staging.get().await.unwrap(), Some(outcome.record.clone()));

        let resent = synthesizer.notify_only().await.unwrap();
        assert_eq!(resent.record, outcome.record);
        assert!(!resent.notified);

        let pipeline = PublishPipeline::new(
            staging,
            Arc::new(TikTokCredentials::new(
                TikTokConfig::default(),
                None,
                None,
                RefreshTokenStore::default(),
            )),
            Arc::new(TikTokPlatform::new(TikTokConfig::default())),
            Arc::new(SlackNotifier::disabled()),
            PublishConfig::default(),
        );

        let record = pipeline.load().await.unwrap();
        let draft = pipeline.draft(&record);
        assert_eq!(
            record.media_reference,
            MediaReference::Url("https://cdn.example/owl.png".to_string())
        );
        assert_eq!(draft.title, "Every quiet night is a page of its own.");
        assert!(draft.description.ends_with("#bedtime #calm"));
    }

    #[tokio::test]
    async fn test_in_memory_store_serves_preloaded_record() {
        let record = PendingContent::new(
            MediaReference::Url("https://cdn.example/fox.png".to_string()),
            "Rest easy tonight",
            "#dreamy #calm",
        )
        .unwrap();
        let staging = InMemoryStagingStore::with_record(record.clone());

        assert_eq!(staging.get().await.unwrap(), Some(record));
    }
}
