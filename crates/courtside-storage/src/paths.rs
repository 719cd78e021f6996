//! Path and URL translation.
//!
//! Pure functions mapping between relative store paths, public URLs and
//! human-entered titles. No I/O happens here; every storage backend routes
//! its addressing through this module so stored URLs always round-trip back
//! to the relative path they were produced from.

use crate::traits::{StorageError, StorageResult};

/// Maps relative store paths to public URLs and back.
#[derive(Clone, Debug)]
pub struct PathTranslator {
    base: String,
}

impl PathTranslator {
    /// `base` is the absolute URL prefix all stored objects live under,
    /// e.g. `https://store.example/files`. A trailing slash is ignored.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        PathTranslator { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Normalize a relative path: forward slashes only, no leading slash,
    /// no empty segments.
    pub fn normalize(relative_path: &str) -> String {
        relative_path
            .replace('\\', "/")
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Compose the public URL for a relative path.
    pub fn to_public_url(&self, relative_path: &str) -> String {
        format!("{}/{}", self.base, Self::normalize(relative_path))
    }

    /// Recover the relative path from a public URL.
    ///
    /// Fails loudly when the URL was not produced against this base, instead
    /// of silently yielding a malformed remote path.
    pub fn to_relative_path(&self, public_url: &str) -> StorageResult<String> {
        // The base must end at a path boundary: `.../files-old/x.png` is not
        // under the base `.../files`.
        let rest = public_url
            .strip_prefix(&self.base)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| StorageError::ForeignUrl(public_url.to_string()))?;
        Ok(rest.trim_start_matches('/').to_string())
    }

    /// Strip any directory components from a path or name.
    ///
    /// Rename targets are sanitized with this: callers sometimes hand over a
    /// full path where a bare file name is expected.
    pub fn basename_only(path_or_name: &str) -> &str {
        path_or_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path_or_name)
    }

    /// Turn a human-entered title into a stored file name.
    ///
    /// Lowercases, strips characters outside `[a-z0-9-_ ]`, collapses
    /// whitespace runs into single hyphens and appends `extension` when the
    /// title does not already carry it.
    pub fn sanitize_file_name(title: &str, extension: &str) -> String {
        let lowered = title.to_lowercase();
        let cleaned: String = lowered
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | ' ' | '.'))
            .collect();

        let mut name = cleaned
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");

        if !name.ends_with(extension) {
            name.push_str(extension);
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> PathTranslator {
        PathTranslator::new("https://store.example/files")
    }

    #[test]
    fn test_round_trip() {
        let t = translator();
        for rel in ["admin/7/music/x.mp3", "a/b/c.bin", "single.txt", "/lead/slash.png"] {
            let url = t.to_public_url(rel);
            assert_eq!(
                t.to_relative_path(&url).unwrap(),
                PathTranslator::normalize(rel)
            );
        }
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(
            PathTranslator::normalize("a\\b\\c.mp4"),
            "a/b/c.mp4"
        );
        assert_eq!(PathTranslator::normalize("/a//b/"), "a/b");
    }

    #[test]
    fn test_trailing_slash_on_base_ignored() {
        let t = PathTranslator::new("https://store.example/files/");
        assert_eq!(
            t.to_public_url("a/x.png"),
            "https://store.example/files/a/x.png"
        );
    }

    #[test]
    fn test_foreign_url_rejected() {
        let t = translator();
        let err = t
            .to_relative_path("https://elsewhere.example/files/a.png")
            .unwrap_err();
        assert!(matches!(err, StorageError::ForeignUrl(_)));
    }

    #[test]
    fn test_base_prefix_needs_path_boundary() {
        let t = translator();
        // Sibling prefix sharing the base's leading characters.
        let err = t
            .to_relative_path("https://store.example/files-old/a.png")
            .unwrap_err();
        assert!(matches!(err, StorageError::ForeignUrl(_)));
        // The bare base itself still translates (to an empty path).
        assert_eq!(
            t.to_relative_path("https://store.example/files").unwrap(),
            ""
        );
    }

    #[test]
    fn test_basename_only() {
        assert_eq!(PathTranslator::basename_only("a/b/c.mp3"), "c.mp3");
        assert_eq!(PathTranslator::basename_only("c:\\tmp\\c.mp3"), "c.mp3");
        assert_eq!(PathTranslator::basename_only("plain.mp3"), "plain.mp3");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            PathTranslator::sanitize_file_name("Warm Up  Routine!", ".mp3"),
            "warm-up-routine.mp3"
        );
        assert_eq!(
            PathTranslator::sanitize_file_name("drills_4-beginners", ".mp3"),
            "drills_4-beginners.mp3"
        );
        // extension already present
        assert_eq!(
            PathTranslator::sanitize_file_name("track.mp3", ".mp3"),
            "track.mp3"
        );
    }
}
