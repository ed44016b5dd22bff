use regex::Regex;

/// Decides which object keys are images worth processing.
///
/// Matching is on the trailing extension and is case-sensitive, so `a.JPG`
/// is skipped unless `JPG` is configured. Sidecar keys end in `.json` and
/// never match.
#[derive(Debug, Clone)]
pub struct ImageFilter {
    extension: Regex,
    extensions: Vec<String>,
}

impl ImageFilter {
    pub fn new(extensions: Vec<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            extension: Regex::new(r"\.([a-zA-Z0-9]+)$")?,
            extensions,
        })
    }

    pub fn extension<'k>(&self, key: &'k str) -> Option<&'k str> {
        self.extension
            .captures(key)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    pub fn is_image(&self, key: &str) -> bool {
        match self.extension(key) {
            Some(ext) => {
                tracing::debug!(key, file_type = ext, "Checking object extension");
                self.extensions.iter().any(|e| e == ext)
            }
            None => false,
        }
    }
}
