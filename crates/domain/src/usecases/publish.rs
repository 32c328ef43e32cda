//! Publish use case - refresh credential, check capabilities, submit, report

use std::path::Path;
use std::sync::Arc;

use crate::{
    model::{
        AccessToken, MediaReference, PendingContent, PostDraft, PublishReport, PublishStage,
    },
    policy::CaptionPolicy,
    ports::{ContentPlatform, CredentialRefresher, Notifier, PlatformError, StagingStore},
    usecases::render::{RenderConfig, Renderer},
};

/// Most restrictive visibility, used unless configured otherwise
pub const DEFAULT_PRIVACY_LEVEL: &str = "SELF_ONLY";

/// Configuration for the publish pipeline
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Privacy level requested for the post
    pub privacy_level: String,
    /// Query the platform for permitted privacy levels before submitting
    pub query_capabilities: bool,
    pub disable_comment: bool,
    pub auto_add_music: bool,
    pub caption_policy: CaptionPolicy,
    pub render_config: RenderConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            privacy_level: DEFAULT_PRIVACY_LEVEL.to_string(),
            query_capabilities: true,
            disable_comment: false,
            auto_add_music: true,
            caption_policy: CaptionPolicy::default(),
            render_config: RenderConfig::default(),
        }
    }
}

/// Errors that stop the pipeline before any network call
#[derive(Debug, thiserror::Error)]
pub enum PublishPipelineError {
    #[error("Nothing to publish: {0}")]
    NothingToPublish(String),
}

/// Publish pipeline orchestrator
pub struct PublishPipeline<St, C, P, N>
where
    St: StagingStore + ?Sized,
    C: CredentialRefresher + ?Sized,
    P: ContentPlatform + ?Sized,
    N: Notifier + ?Sized,
{
    staging: Arc<St>,
    credentials: Arc<C>,
    platform: Arc<P>,
    notifier: Arc<N>,
    config: PublishConfig,
}

impl<St, C, P, N> PublishPipeline<St, C, P, N>
where
    St: StagingStore + ?Sized,
    C: CredentialRefresher + ?Sized,
    P: ContentPlatform + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(
        staging: Arc<St>,
        credentials: Arc<C>,
        platform: Arc<P>,
        notifier: Arc<N>,
        config: PublishConfig,
    ) -> Self {
        Self {
            staging,
            credentials,
            platform,
            notifier,
            config,
        }
    }

    /// Load the staged record or explain why there is none
    pub async fn load(&self) -> Result<PendingContent, PublishPipelineError> {
        let record = match self.staging.get().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return Err(PublishPipelineError::NothingToPublish(
                    "no content is staged; run generate first".to_string(),
                ));
            }
            Err(error) => {
                return Err(PublishPipelineError::NothingToPublish(error.to_string()));
            }
        };

        record
            .validate()
            .map_err(|e| PublishPipelineError::NothingToPublish(e.to_string()))?;

        Ok(record)
    }

    /// Post metadata derived from the record
    pub fn draft(&self, record: &PendingContent) -> PostDraft {
        let policy = &self.config.caption_policy;
        PostDraft {
            title: policy.title(&record.caption),
            description: policy.description(&record.caption, &record.hashtags),
            privacy_level: self.config.privacy_level.clone(),
            disable_comment: self.config.disable_comment,
            auto_add_music: self.config.auto_add_music,
        }
    }

    /// Run every stage and report the outcome
    ///
    /// Only a missing or invalid staged record is returned as an error; every
    /// later failure is folded into the report after the final notification.
    pub async fn run(&self) -> Result<PublishReport, PublishPipelineError> {
        let record = self.load().await?;

        tracing::info!(
            platform = self.platform.platform(),
            media_reference = %record.media_reference,
            "Publishing staged content"
        );

        let report = self.publish(&record).await;

        if report.success {
            tracing::info!(publish_id = ?report.publish_id, "Post initiated successfully");
        } else {
            tracing::error!(
                stage = ?report.failed_stage,
                error = ?report.error,
                "Publishing failed"
            );
        }

        self.report(&record, &report).await;

        Ok(report)
    }

    async fn publish(&self, record: &PendingContent) -> PublishReport {
        tracing::info!("Refreshing access token");
        let token = match self.credentials.refresh().await {
            Ok(token) => token,
            Err(error) => {
                return PublishReport::failed(PublishStage::CredentialRefresh, error.to_string());
            }
        };

        if self.config.query_capabilities {
            if let Err(error) = self.check_privacy_level(&token).await {
                return PublishReport::failed(PublishStage::CapabilityQuery, error);
            }
        }

        let draft = self.draft(record);
        match self.submit(&token, &draft, &record.media_reference).await {
            Ok(publish_id) => PublishReport::succeeded(publish_id),
            Err(failure) => {
                let report = PublishReport::failed(PublishStage::Submit, failure.error.to_string());
                match failure.publish_id {
                    Some(publish_id) => report.with_publish_id(publish_id),
                    None => report,
                }
            }
        }
    }

    async fn check_privacy_level(&self, token: &AccessToken) -> Result<(), String> {
        let options = self
            .platform
            .privacy_level_options(token)
            .await
            .map_err(|e| e.to_string())?;

        tracing::debug!(options = ?options, "Permitted privacy levels");

        if options.iter().any(|o| o == &self.config.privacy_level) {
            Ok(())
        } else {
            Err(format!(
                "privacy level {} is not permitted (allowed: {})",
                self.config.privacy_level,
                options.join(", ")
            ))
        }
    }

    /// Choose the submission strategy from the media reference
    async fn submit(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
        media: &MediaReference,
    ) -> Result<String, SubmitFailure> {
        match media {
            MediaReference::Url(url) => {
                tracing::info!(url = %url, "Submitting pull-from-URL post");
                Ok(self.platform.publish_from_url(token, draft, url).await?)
            }
            MediaReference::LocalFile(path) => {
                tracing::info!(path = %path.display(), "Submitting direct-upload post");
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    PlatformError::Api(format!("failed to read {}: {}", path.display(), e))
                })?;

                let ticket = self
                    .platform
                    .init_file_upload(token, draft, bytes.len() as u64)
                    .await?;

                tracing::info!(publish_id = %ticket.publish_id, "Upload initialized");

                if let Err(error) = self
                    .platform
                    .upload_file(&ticket, bytes, content_type_for(path))
                    .await
                {
                    return Err(SubmitFailure {
                        error,
                        publish_id: Some(ticket.publish_id),
                    });
                }

                Ok(ticket.publish_id)
            }
        }
    }

    async fn report(&self, record: &PendingContent, report: &PublishReport) {
        if !self.notifier.is_enabled() {
            tracing::info!("Notifications disabled; skipping final report");
            return;
        }

        let renderer = Renderer::new(self.config.render_config.clone());
        let notification = renderer.render_publish_result(record, report);

        if let Err(error) = self.notifier.notify(&notification).await {
            tracing::warn!(error = %error, "Failed to send final notification");
        }
    }
}

/// Submission error, with the publish ID when the platform already issued one
struct SubmitFailure {
    error: PlatformError,
    publish_id: Option<String>,
}

impl From<PlatformError> for SubmitFailure {
    fn from(error: PlatformError) -> Self {
        Self {
            error,
            publish_id: None,
        }
    }
}

/// MIME type for an image file, from its extension
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Notification, UploadTicket};
    use crate::ports::{NotifyError, StagingError};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FakeStaging {
        record: Option<PendingContent>,
    }

    #[async_trait]
    impl StagingStore for FakeStaging {
        async fn put(&self, _record: &PendingContent) -> Result<(), StagingError> {
            Ok(())
        }

        async fn get(&self) -> Result<Option<PendingContent>, StagingError> {
            Ok(self.record.clone())
        }
    }

    struct CorruptStaging;

    #[async_trait]
    impl StagingStore for CorruptStaging {
        async fn put(&self, _record: &PendingContent) -> Result<(), StagingError> {
            Ok(())
        }

        async fn get(&self) -> Result<Option<PendingContent>, StagingError> {
            Err(StagingError::Corrupt("expected value at line 1".to_string()))
        }
    }

    #[derive(Default)]
    struct FakeCredentials {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialRefresher for FakeCredentials {
        async fn refresh(&self) -> Result<AccessToken, PlatformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PlatformError::InvalidResponse(
                    "missing access_token".to_string(),
                ));
            }
            Ok(AccessToken {
                access_token: SecretString::new("act.token".into()),
                open_id: Some("open-1".to_string()),
                expires_in: Some(86400),
            })
        }
    }

    struct FakePlatform {
        privacy_levels: Vec<String>,
        submit_calls: AtomicUsize,
        drafts: Mutex<Vec<PostDraft>>,
        uploads: Mutex<Vec<(usize, String)>>,
        reject_upload: bool,
    }

    impl FakePlatform {
        fn new() -> Self {
            Self {
                privacy_levels: vec![
                    "PUBLIC_TO_EVERYONE".to_string(),
                    "SELF_ONLY".to_string(),
                ],
                submit_calls: AtomicUsize::new(0),
                drafts: Mutex::new(vec![]),
                uploads: Mutex::new(vec![]),
                reject_upload: false,
            }
        }
    }

    #[async_trait]
    impl ContentPlatform for FakePlatform {
        async fn privacy_level_options(
            &self,
            _token: &AccessToken,
        ) -> Result<Vec<String>, PlatformError> {
            Ok(self.privacy_levels.clone())
        }

        async fn publish_from_url(
            &self,
            _token: &AccessToken,
            draft: &PostDraft,
            _image_url: &str,
        ) -> Result<String, PlatformError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            self.drafts.lock().unwrap().push(draft.clone());
            Ok("p123".to_string())
        }

        async fn init_file_upload(
            &self,
            _token: &AccessToken,
            draft: &PostDraft,
            _size: u64,
        ) -> Result<UploadTicket, PlatformError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            self.drafts.lock().unwrap().push(draft.clone());
            Ok(UploadTicket {
                publish_id: "p456".to_string(),
                upload_url: "https://upload.example/u1".to_string(),
            })
        }

        async fn upload_file(
            &self,
            _ticket: &UploadTicket,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<(), PlatformError> {
            if self.reject_upload {
                return Err(PlatformError::Api("upload URL expired".to_string()));
            }
            self.uploads
                .lock()
                .unwrap()
                .push((bytes.len(), content_type.to_string()));
            Ok(())
        }

        fn platform(&self) -> &'static str {
            "fake"
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        fail: bool,
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            if self.fail {
                Err(NotifyError::Network("connection reset".to_string()))
            } else {
                Ok(())
            }
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    fn url_record() -> PendingContent {
        PendingContent::new(
            MediaReference::Url("https://cdn.example/img123.png".to_string()),
            "Rest easy tonight",
            "#dreamy #calm #art #night #peace",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_absent_record_makes_no_calls() {
        let credentials = Arc::new(FakeCredentials::default());
        let platform = Arc::new(FakePlatform::new());
        let notifier = Arc::new(FakeNotifier::default());

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging { record: None }),
            credentials.clone(),
            platform.clone(),
            notifier.clone(),
            PublishConfig::default(),
        );

        let result = pipeline.run().await;

        assert!(matches!(
            result,
            Err(PublishPipelineError::NothingToPublish(_))
        ));
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 0);
        assert_eq!(platform.submit_calls.load(Ordering::SeqCst), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_nothing_to_publish() {
        let credentials = Arc::new(FakeCredentials::default());

        let pipeline = PublishPipeline::new(
            Arc::new(CorruptStaging),
            credentials.clone(),
            Arc::new(FakePlatform::new()),
            Arc::new(FakeNotifier::default()),
            PublishConfig::default(),
        );

        let result = pipeline.run().await;

        assert!(matches!(
            result,
            Err(PublishPipelineError::NothingToPublish(_))
        ));
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_reports_and_skips_submit() {
        let credentials = Arc::new(FakeCredentials {
            fail: true,
            ..Default::default()
        });
        let platform = Arc::new(FakePlatform::new());
        let notifier = Arc::new(FakeNotifier::default());

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(url_record()),
            }),
            credentials,
            platform.clone(),
            notifier.clone(),
            PublishConfig::default(),
        );

        let report = pipeline.run().await.unwrap();

        assert!(!report.success);
        assert_eq!(report.failed_stage, Some(PublishStage::CredentialRefresh));
        assert_eq!(platform.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pull_from_url_success() {
        let platform = Arc::new(FakePlatform::new());
        let notifier = Arc::new(FakeNotifier::default());

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(url_record()),
            }),
            Arc::new(FakeCredentials::default()),
            platform.clone(),
            notifier.clone(),
            PublishConfig::default(),
        );

        let report = pipeline.run().await.unwrap();

        assert!(report.success);
        assert_eq!(report.publish_id.as_deref(), Some("p123"));
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].plain_text().contains("p123"));

        let drafts = platform.drafts.lock().unwrap();
        assert_eq!(drafts[0].privacy_level, "SELF_ONLY");
        assert_eq!(
            drafts[0].description,
            "Rest easy tonight\n\n#dreamy #calm #art #night #peace"
        );
    }

    #[tokio::test]
    async fn test_long_caption_truncates_title_only() {
        let platform = Arc::new(FakePlatform::new());
        let caption = "Close your eyes and drift across a quiet sea of stars ".repeat(4);
        let record = PendingContent::new(
            MediaReference::Url("https://cdn.example/img123.png".to_string()),
            caption.clone(),
            "#calm #night",
        )
        .unwrap();

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(record),
            }),
            Arc::new(FakeCredentials::default()),
            platform.clone(),
            Arc::new(FakeNotifier::default()),
            PublishConfig::default(),
        );

        pipeline.run().await.unwrap();

        let drafts = platform.drafts.lock().unwrap();
        assert!(drafts[0].title.chars().count() <= 90);
        assert!(drafts[0].title.starts_with("Close your eyes"));
        assert!(drafts[0].title.ends_with("..."));
        assert_eq!(
            drafts[0].description,
            format!("{}\n\n#calm #night", caption.trim())
        );
    }

    #[tokio::test]
    async fn test_disallowed_privacy_level_fails_closed() {
        let mut platform = FakePlatform::new();
        platform.privacy_levels = vec!["PUBLIC_TO_EVERYONE".to_string()];
        let platform = Arc::new(platform);

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(url_record()),
            }),
            Arc::new(FakeCredentials::default()),
            platform.clone(),
            Arc::new(FakeNotifier::default()),
            PublishConfig::default(),
        );

        let report = pipeline.run().await.unwrap();

        assert!(!report.success);
        assert_eq!(report.failed_stage, Some(PublishStage::CapabilityQuery));
        assert_eq!(platform.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_capability_query_can_be_skipped() {
        let mut platform = FakePlatform::new();
        platform.privacy_levels = vec![];
        let platform = Arc::new(platform);

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(url_record()),
            }),
            Arc::new(FakeCredentials::default()),
            platform,
            Arc::new(FakeNotifier::default()),
            PublishConfig {
                query_capabilities: false,
                ..Default::default()
            },
        );

        let report = pipeline.run().await.unwrap();

        assert!(report.success);
    }

    #[tokio::test]
    async fn test_local_file_uses_direct_upload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dream.jpg");
        std::fs::write(&path, vec![7u8; 64]).unwrap();
        let platform = Arc::new(FakePlatform::new());

        let record =
            PendingContent::new(MediaReference::LocalFile(path), "Sleep well", "#calm").unwrap();

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(record),
            }),
            Arc::new(FakeCredentials::default()),
            platform.clone(),
            Arc::new(FakeNotifier::default()),
            PublishConfig::default(),
        );

        let report = pipeline.run().await.unwrap();

        assert!(report.success);
        assert_eq!(report.publish_id.as_deref(), Some("p456"));
        let uploads = platform.uploads.lock().unwrap();
        assert_eq!(uploads.as_slice(), &[(64, "image/jpeg".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_upload_phase_fails_submission() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dream.png");
        std::fs::write(&path, b"png").unwrap();
        let mut platform = FakePlatform::new();
        platform.reject_upload = true;

        let record =
            PendingContent::new(MediaReference::LocalFile(path), "Sleep well", "#calm").unwrap();

        let notifier = Arc::new(FakeNotifier::default());

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(record),
            }),
            Arc::new(FakeCredentials::default()),
            Arc::new(platform),
            notifier.clone(),
            PublishConfig::default(),
        );

        let report = pipeline.run().await.unwrap();

        assert!(!report.success);
        assert_eq!(report.failed_stage, Some(PublishStage::Submit));
        assert_eq!(report.publish_id.as_deref(), Some("p456"));

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].plain_text().contains("p456"));
        assert!(sent[0].plain_text().contains("upload URL expired"));
    }

    #[tokio::test]
    async fn test_missing_local_file_fails_submission() {
        let platform = Arc::new(FakePlatform::new());
        let record = PendingContent::new(
            MediaReference::LocalFile(PathBuf::from("/nonexistent/dream.png")),
            "Sleep well",
            "#calm",
        )
        .unwrap();

        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(record),
            }),
            Arc::new(FakeCredentials::default()),
            platform.clone(),
            Arc::new(FakeNotifier::default()),
            PublishConfig::default(),
        );

        let report = pipeline.run().await.unwrap();

        assert!(!report.success);
        assert_eq!(platform.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_change_outcome() {
        let pipeline = PublishPipeline::new(
            Arc::new(FakeStaging {
                record: Some(url_record()),
            }),
            Arc::new(FakeCredentials::default()),
            Arc::new(FakePlatform::new()),
            Arc::new(FakeNotifier {
                fail: true,
                ..Default::default()
            }),
            PublishConfig::default(),
        );

        let report = pipeline.run().await.unwrap();

        assert!(report.success);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("a.png")), "image/png");
    }
}
