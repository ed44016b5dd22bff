use anyhow::Result;
use async_trait::async_trait;
use picmeta_vision::{LabelDetection, TextDetection, VisionDetector};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Detector that returns canned results and counts calls
#[derive(Default)]
pub struct StaticDetector {
    labels: Vec<LabelDetection>,
    texts: Vec<TextDetection>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticDetector {
    pub fn new(labels: Vec<LabelDetection>, texts: Vec<TextDetection>) -> Self {
        Self {
            labels,
            texts,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionDetector for StaticDetector {
    fn name(&self) -> &str {
        "static"
    }

    async fn detect_labels(&self, _image: &[u8], _min_confidence: f64) -> Result<Vec<LabelDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("detector unavailable");
        }
        Ok(self.labels.clone())
    }

    async fn detect_text(
        &self,
        _image: &[u8],
        _min_confidence: f64,
        _min_bound: f64,
    ) -> Result<Vec<TextDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("detector unavailable");
        }
        Ok(self.texts.clone())
    }
}
