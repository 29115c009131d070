//! Advisor that replays a saved response file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::trait_def::{Advisor, AdvisorError};

/// Returns the contents of a file instead of calling a service.
///
/// An empty file is returned as empty text, which the pipeline resolves
/// through fallback synthesis.
#[derive(Debug, Clone)]
pub struct FileAdvisor {
    path: PathBuf,
}

impl FileAdvisor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Advisor for FileAdvisor {
    fn name(&self) -> &str {
        "file"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, AdvisorError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| AdvisorError::ResponseFile {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_file_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("response.txt");
        std::fs::write(&path, "Category: EPF\n").unwrap();

        let advisor = FileAdvisor::new(&path);
        assert_eq!(advisor.name(), "file");
        assert_eq!(advisor.path(), path.as_path());
        assert_eq!(advisor.complete("ignored").await.unwrap(), "Category: EPF\n");
    }

    #[tokio::test]
    async fn empty_file_is_empty_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        assert_eq!(FileAdvisor::new(&path).complete("p").await.unwrap(), "");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = FileAdvisor::new("/nonexistent/response.txt")
            .complete("p")
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::ResponseFile { .. }), "got {err:?}");
    }
}
