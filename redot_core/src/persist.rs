//! Writing rewritten files back into the workspace.

use std::fs;
use std::path::{Component, Path, PathBuf};

use git2::Patch;
use redot_api::RewriteResult;
use tracing::debug;

use crate::repository::Repository;
use crate::rewrite::RewriteError;
use crate::Result;

/// Writes rewrite results into a repository's working tree and index.
#[derive(Debug)]
pub struct DocWriter<'repo> {
    repository: &'repo Repository,
}

impl<'repo> DocWriter<'repo> {
    /// Construct a new writer bound to the provided repository.
    #[must_use]
    pub const fn new(repository: &'repo Repository) -> Self {
        Self { repository }
    }

    /// Write every result whose text differs from the working tree and stage
    /// it. Returns the paths that were written.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is absolute or escapes the repository, if a
    /// file write fails, or if staging updated paths cannot be completed.
    pub fn persist(&self, results: &[RewriteResult]) -> Result<Vec<String>> {
        let repo_root = self.repository.root();
        let mut written = Vec::new();
        let mut index = self.repository.git_repo().index()?;

        for result in results {
            let target = sanitize_path(repo_root, &result.filename)?;
            if fs::read_to_string(&target).is_ok_and(|current| current == result.new_file_text) {
                debug!(path = %result.filename, "working tree already up to date");
                continue;
            }

            fs::write(&target, &result.new_file_text).map_err(|source| RewriteError::Io {
                path: result.filename.clone(),
                source,
            })?;
            index.add_path(Path::new(&result.filename))?;
            written.push(result.filename.clone());
        }

        if !written.is_empty() {
            index.write()?;
        }
        Ok(written)
    }
}

/// Unified diff turning `original` into `updated`, labelled with `path`.
///
/// # Errors
///
/// Propagates libgit2 failures while building the patch.
pub fn preview_patch(path: &str, original: &str, updated: &str) -> Result<String> {
    let path_ref = Path::new(path);
    let mut patch = Patch::from_buffers(
        original.as_bytes(),
        Some(path_ref),
        updated.as_bytes(),
        Some(path_ref),
        None,
    )?;

    let buffer = patch.to_buf()?;
    Ok(String::from_utf8_lossy(buffer.as_ref()).into_owned())
}

fn sanitize_path(root: &Path, relative: &str) -> std::result::Result<PathBuf, RewriteError> {
    let candidate = Path::new(relative);
    if candidate.is_absolute() {
        return Err(RewriteError::AbsolutePath {
            path: relative.to_owned(),
        });
    }

    if candidate
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(RewriteError::PathTraversal {
            path: relative.to_owned(),
        });
    }

    Ok(root.join(candidate))
}
