//! Output discovery.
//!
//! The engine writes `videos/<module>/<resolution>/<Scene>.mp4` under its
//! media directory, with both middle segments chosen by the engine. We match
//! that shape the way the shell glob `videos/*/*/<Scene>.mp4` would: hidden
//! entries are skipped and the lexicographically first match wins.

use crate::error::RenderError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Locate the rendered video for `scene` under `media_dir`
///
/// # Errors
///
/// Returns [`RenderError::OutputMissing`] if no file matches,
/// or [`RenderError::Io`] if a directory cannot be listed
pub async fn find_output(media_dir: &Path, scene: &str) -> Result<PathBuf, RenderError> {
    let file_name = format!("{scene}.mp4");
    let mut matches = Vec::new();

    for module_dir in subdirs(&media_dir.join("videos")).await? {
        for quality_dir in subdirs(&module_dir).await? {
            let candidate = quality_dir.join(&file_name);
            if tokio::fs::metadata(&candidate)
                .await
                .is_ok_and(|meta| meta.is_file())
            {
                matches.push(candidate);
            }
        }
    }

    matches.sort();
    if matches.len() > 1 {
        tracing::warn!(scene, count = matches.len(), "Several rendered videos matched; using the first");
    }
    matches
        .into_iter()
        .next()
        .ok_or_else(|| RenderError::OutputMissing {
            scene: scene.to_string(),
        })
}

/// Non-hidden subdirectories of `dir`; empty when `dir` does not exist
async fn subdirs(dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"mp4").unwrap();
        path
    }

    #[tokio::test]
    async fn test_finds_video() {
        let media = tempfile::tempdir().unwrap();
        let expected = touch(media.path(), "videos/scene_abc/480p15/ConceptScene.mp4");

        let found = find_output(media.path(), "ConceptScene").await.unwrap();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn test_missing_media_dir() {
        let media = tempfile::tempdir().unwrap();
        let err = find_output(&media.path().join("nope"), "ConceptScene")
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::OutputMissing { .. }));
    }

    #[tokio::test]
    async fn test_wrong_depth_ignored() {
        let media = tempfile::tempdir().unwrap();
        touch(media.path(), "videos/ConceptScene.mp4");
        touch(media.path(), "videos/a/ConceptScene.mp4");
        touch(media.path(), "videos/a/b/c/ConceptScene.mp4");

        let err = find_output(media.path(), "ConceptScene").await.unwrap_err();
        assert!(matches!(err, RenderError::OutputMissing { .. }));
    }

    #[tokio::test]
    async fn test_other_scene_ignored() {
        let media = tempfile::tempdir().unwrap();
        touch(media.path(), "videos/m/480p15/Other.mp4");
        touch(media.path(), "videos/m/480p15/partial_movie_files.txt");

        assert!(find_output(media.path(), "ConceptScene").await.is_err());
    }

    #[tokio::test]
    async fn test_hidden_dirs_skipped() {
        let media = tempfile::tempdir().unwrap();
        touch(media.path(), "videos/.cache/480p15/ConceptScene.mp4");

        assert!(find_output(media.path(), "ConceptScene").await.is_err());
    }

    #[tokio::test]
    async fn test_first_match_is_lexicographic() {
        let media = tempfile::tempdir().unwrap();
        touch(media.path(), "videos/m/720p30/ConceptScene.mp4");
        let first = touch(media.path(), "videos/m/480p15/ConceptScene.mp4");

        let found = find_output(media.path(), "ConceptScene").await.unwrap();
        assert_eq!(found, first);
    }
}
