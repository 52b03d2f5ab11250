//! JSON file output.
//!
//! Results are written once, at the end of a run, as pretty-printed JSON with
//! four-space indentation. An existing file at the target path is replaced.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `value` with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write `value` to `path` as pretty JSON, creating parent directories.
///
/// # Arguments
///
/// * `value` - Anything serializable; the collected articles or table rows
/// * `path` - Destination file
///
/// # Returns
///
/// `Ok(())` on success, or an error if serialization, directory creation or
/// the file write fails.
///
/// # Output Path
///
/// The file is written to `path` exactly; any previous content is lost.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_pretty_json<T: Serialize + ?Sized>(
    value: &T,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = to_pretty_json(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, &json).await?;
    info!(bytes = json.len(), "Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollectedArticle;

    fn sample() -> Vec<CollectedArticle> {
        vec![
            CollectedArticle {
                title: "First".to_string(),
                date: "2024-01-02T09:00:00Z".to_string(),
                authors: vec!["Ann Author".to_string()],
                text: "Line one.\nLine \"two\".".to_string(),
            },
            CollectedArticle {
                title: "Second".to_string(),
                date: "2024-01-01T09:00:00Z".to_string(),
                authors: vec![],
                text: String::new(),
            },
        ]
    }

    #[test]
    fn test_four_space_indent() {
        let bytes = to_pretty_json(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n    {\n        \"title\": \"First\""));
        assert!(text.contains("        \"authors\": [\n            \"Ann Author\"\n        ],"));
        assert!(text.contains("\"authors\": [],"));
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/articles.json");
        let articles = sample();

        write_pretty_json(&articles, &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let values: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        for value in &values {
            assert_eq!(value.as_object().unwrap().len(), 4);
        }
        let back: Vec<CollectedArticle> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, articles);
    }

    #[tokio::test]
    async fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        std::fs::write(&path, "stale content that is longer than the new output").unwrap();

        write_pretty_json(&Vec::<CollectedArticle>::new(), &path)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
