//! Integration tests for the fallback download driver
//!
//! Run with: cargo test --test driver_test

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Mutex;

use tuberelay::core::AppError;
use tuberelay::download::driver;
use tuberelay::download::metadata::VideoMetadata;
use tuberelay::download::tier::{audio_ladder, ladder, AttemptSpec};
use tuberelay::download::tool::MediaTool;
use tuberelay::resolve::VideoId;

/// What a scripted tier should do when the driver reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TierBehavior {
    MetadataFails,
    FetchFails,
    /// fetch() returns Ok but writes nothing to disk
    FetchSucceedsWithoutFile,
    Succeeds,
}

/// A scripted MediaTool that records every call in order.
struct FakeTool {
    tiers: &'static [AttemptSpec],
    behaviors: Vec<TierBehavior>,
    calls: Mutex<Vec<String>>,
}

impl FakeTool {
    fn new(tiers: &'static [AttemptSpec], behaviors: Vec<TierBehavior>) -> Self {
        assert_eq!(tiers.len(), behaviors.len());
        Self {
            tiers,
            behaviors,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn behavior_for(&self, spec: &AttemptSpec) -> TierBehavior {
        let index = self
            .tiers
            .iter()
            .position(|t| t.format == spec.format)
            .expect("unknown tier");
        self.behaviors[index]
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaTool for FakeTool {
    async fn extract_metadata(&self, _id: &VideoId, spec: &AttemptSpec) -> Result<VideoMetadata, AppError> {
        self.record(format!("metadata:{}", spec.format));
        match self.behavior_for(spec) {
            TierBehavior::MetadataFails => Err(AppError::Download("scripted metadata failure".into())),
            _ => Ok(VideoMetadata {
                title: "Fake Clip".to_string(),
                duration_secs: 212,
                view_count: 1000,
            }),
        }
    }

    async fn fetch(&self, _id: &VideoId, spec: &AttemptSpec, destination_template: &str) -> Result<(), AppError> {
        self.record(format!("fetch:{}", spec.format));
        match self.behavior_for(spec) {
            TierBehavior::FetchFails => Err(AppError::Download("scripted fetch failure".into())),
            TierBehavior::Succeeds => {
                let ext = if spec.extract_audio.is_some() { "mp3" } else { "mp4" };
                let path = destination_template.replace(".%(ext)s", &format!(".{}", ext));
                std::fs::write(&path, b"media bytes")?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn test_id() -> VideoId {
    VideoId::new("dQw4w9WgXcQ").unwrap()
}

fn template_in(dir: &tempfile::TempDir) -> String {
    format!("{}/dQw4w9WgXcQ_1.%(ext)s", dir.path().display())
}

#[tokio::test]
async fn test_first_tier_success_stops_the_ladder() {
    let dir = tempfile::tempdir().unwrap();
    let tool = FakeTool::new(ladder(), vec![TierBehavior::Succeeds; 4]);

    let outcome = driver::download(&tool, &test_id(), &template_in(&dir), ladder())
        .await
        .unwrap();

    assert_eq!(outcome.method, ladder()[0].description);
    assert_eq!(outcome.title, "Fake Clip");
    assert_eq!(outcome.video_id, "dQw4w9WgXcQ");
    // One metadata call and one fetch call, first tier only
    assert_eq!(
        tool.calls(),
        vec![
            format!("metadata:{}", ladder()[0].format),
            format!("fetch:{}", ladder()[0].format),
        ]
    );
}

#[tokio::test]
async fn test_metadata_failure_advances_to_next_tier() {
    let dir = tempfile::tempdir().unwrap();
    let tool = FakeTool::new(
        ladder(),
        vec![
            TierBehavior::MetadataFails,
            TierBehavior::Succeeds,
            TierBehavior::Succeeds,
            TierBehavior::Succeeds,
        ],
    );

    let outcome = driver::download(&tool, &test_id(), &template_in(&dir), ladder())
        .await
        .unwrap();

    assert_eq!(outcome.method, ladder()[1].description);
    // Tier 1 was attempted exactly once and never fetched
    assert_eq!(
        tool.calls(),
        vec![
            format!("metadata:{}", ladder()[0].format),
            format!("metadata:{}", ladder()[1].format),
            format!("fetch:{}", ladder()[1].format),
        ]
    );
}

#[tokio::test]
async fn test_fetch_failure_advances_to_next_tier() {
    let dir = tempfile::tempdir().unwrap();
    let tool = FakeTool::new(
        ladder(),
        vec![
            TierBehavior::FetchFails,
            TierBehavior::FetchFails,
            TierBehavior::Succeeds,
            TierBehavior::Succeeds,
        ],
    );

    let outcome = driver::download(&tool, &test_id(), &template_in(&dir), ladder())
        .await
        .unwrap();
    assert_eq!(outcome.method, ladder()[2].description);
}

#[tokio::test]
async fn test_missing_file_after_fetch_advances_tier() {
    let dir = tempfile::tempdir().unwrap();
    let tool = FakeTool::new(
        ladder(),
        vec![
            TierBehavior::FetchSucceedsWithoutFile,
            TierBehavior::Succeeds,
            TierBehavior::Succeeds,
            TierBehavior::Succeeds,
        ],
    );

    let outcome = driver::download(&tool, &test_id(), &template_in(&dir), ladder())
        .await
        .unwrap();
    assert_eq!(outcome.method, ladder()[1].description);
}

#[tokio::test]
async fn test_exhausted_ladder_aggregates_into_one_error() {
    let dir = tempfile::tempdir().unwrap();
    let tool = FakeTool::new(ladder(), vec![TierBehavior::MetadataFails; 4]);

    let err = driver::download(&tool, &test_id(), &template_in(&dir), ladder())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("all 4 download methods failed"));

    // Every tier attempted exactly once, in declared order
    let expected: Vec<String> = ladder().iter().map(|t| format!("metadata:{}", t.format)).collect();
    assert_eq!(tool.calls(), expected);
}

#[tokio::test]
async fn test_audio_ladder_walks_in_order_and_yields_mp3() {
    let dir = tempfile::tempdir().unwrap();
    let tool = FakeTool::new(
        audio_ladder(),
        vec![TierBehavior::FetchFails, TierBehavior::Succeeds],
    );

    let outcome = driver::download(&tool, &test_id(), &template_in(&dir), audio_ladder())
        .await
        .unwrap();

    assert_eq!(outcome.method, audio_ladder()[1].description);
    assert_eq!(outcome.file_path.extension().and_then(|e| e.to_str()), Some("mp3"));
    assert_eq!(
        tool.calls(),
        vec![
            format!("metadata:{}", audio_ladder()[0].format),
            format!("fetch:{}", audio_ladder()[0].format),
            format!("metadata:{}", audio_ladder()[1].format),
            format!("fetch:{}", audio_ladder()[1].format),
        ]
    );
}
