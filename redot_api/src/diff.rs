use serde::{Deserialize, Serialize};

/// File status from the diff's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// File only exists in the head side.
    Added,
    /// File only exists in the base side.
    Removed,
    /// File exists on both sides with modifications.
    Modified,
    /// File path changed between base and head.
    Renamed,
    /// File content copied from another location.
    Copied,
    /// File type changed (e.g., text -> symlink).
    TypeChange,
}

impl FileStatus {
    /// Whether the head side still carries the file.
    pub const fn exists_in_head(self) -> bool {
        !matches!(self, Self::Removed)
    }
}

/// The line number ranges referenced by a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRange {
    /// Starting line number for the base side.
    pub base_start: u32,
    /// Number of lines covered on the base side.
    pub base_lines: u32,
    /// Starting line number for the head side.
    pub head_start: u32,
    /// Number of lines covered on the head side.
    pub head_lines: u32,
}

/// Type of a line contained in a hunk body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineKind {
    /// Unchanged context line.
    Context,
    /// A newly added line.
    Addition,
    /// A deleted line.
    Deletion,
}

impl DiffLineKind {
    /// Classify a raw hunk body line by its marker character.
    pub fn classify(line: &str) -> Option<Self> {
        match line.as_bytes().first() {
            Some(b'+') => Some(Self::Addition),
            Some(b'-') => Some(Self::Deletion),
            Some(b' ') => Some(Self::Context),
            _ => None,
        }
    }
}

/// One changed file as reported by a diff provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    pub path: String,
    /// Previous path when the file was renamed or copied.
    #[serde(default)]
    pub old_path: Option<String>,
    /// Status of the file change in the diff.
    pub status: FileStatus,
    /// Unified diff patch; absent for binary or rename-only changes.
    #[serde(default)]
    pub patch: Option<String>,
    /// Full head-side text; absent when unreadable.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChangedFile {
    /// Create a modified-file record carrying both patch and content.
    pub fn modified(
        path: impl Into<String>,
        patch: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            status: FileStatus::Modified,
            patch: Some(patch.into()),
            content: Some(content.into()),
        }
    }
}
