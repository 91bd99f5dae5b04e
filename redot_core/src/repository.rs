//! Repository access built on top of libgit2: changed files between two
//! revisions and text reads at a revision.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{
    Delta, DiffFindOptions, DiffFlags, DiffOptions, ErrorClass, ErrorCode, Oid, Patch,
    Repository as GitRepository, Tree,
};
use redot_api::{ChangedFile, FileStatus};
use serde::Serialize;

use crate::{Error, Result};

/// Files changed between two revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Base commit id; `None` when the head is a root commit.
    pub base: Option<String>,
    /// Head commit id.
    pub head: String,
    /// One entry per changed path.
    pub files: Vec<ChangedFile>,
}

/// Lightweight handle to a repository that redot operates on.
pub struct Repository {
    inner: GitRepository,
    root: PathBuf,
}

impl Repository {
    /// Open a repository from the given filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized, does not resolve
    /// to a git repository, or if libgit2 reports an unsupported repository
    /// layout (such as a bare repository).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let original = path.as_ref();
        let canonical = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;

        let repo = match GitRepository::discover(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::BareRepository {
                path: display_path(&canonical),
            })?;

        Ok(Self { inner: repo, root })
    }

    /// Returns the absolute path to the repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) const fn git_repo(&self) -> &GitRepository {
        &self.inner
    }

    /// Files changed between `base` and `head`.
    ///
    /// Without an explicit base the first parent of `head` is used; a root
    /// commit is compared against the empty tree. Renames are detected, patch
    /// text is omitted for binary deltas and head-side content is omitted for
    /// removed, binary or non-UTF-8 files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeadRevision`] when `HEAD` is unborn,
    /// [`Error::UnknownRevision`] for revisions that do not resolve to a
    /// commit, and propagates libgit2 diff failures.
    pub fn changed_files(&self, base: Option<&str>, head: &str) -> Result<ChangeSet> {
        let head_commit = self.resolve_commit(head)?;
        let head_tree = head_commit.tree()?;

        let base_commit = match base {
            Some(spec) => Some(self.resolve_commit(spec)?),
            None if head_commit.parent_count() > 0 => Some(head_commit.parent(0)?),
            None => None,
        };
        let base_tree = base_commit.as_ref().map(git2::Commit::tree).transpose()?;

        let mut options = DiffOptions::new();
        options.context_lines(3);
        let mut diff = self.inner.diff_tree_to_tree(
            base_tree.as_ref(),
            Some(&head_tree),
            Some(&mut options),
        )?;
        let mut find = DiffFindOptions::new();
        find.renames(true).copies(true);
        diff.find_similar(Some(&mut find))?;

        let mut files = Vec::new();
        for (index, delta) in diff.deltas().enumerate() {
            let Some(status) = convert_status(delta.status()) else {
                continue;
            };

            let Some(path) = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(display_path)
            else {
                continue;
            };

            let old_path = matches!(status, FileStatus::Renamed | FileStatus::Copied)
                .then(|| delta.old_file().path().map(display_path))
                .flatten();

            let patch = match Patch::from_diff(&diff, index)? {
                Some(mut patch) if !patch.delta().flags().contains(DiffFlags::BINARY) => {
                    let buffer = patch.to_buf()?;
                    Some(String::from_utf8_lossy(buffer.as_ref()).into_owned())
                }
                _ => None,
            };

            let content = if status.exists_in_head() {
                self.blob_text(delta.new_file().id())
            } else {
                None
            };

            files.push(ChangedFile {
                path,
                old_path,
                status,
                patch,
                content,
            });
        }

        Ok(ChangeSet {
            base: base_commit.map(|commit| commit.id().to_string()),
            head: head_commit.id().to_string(),
            files,
        })
    }

    /// Text of `path` at revision `rev`; `None` when the path is absent,
    /// binary or not UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error when `rev` does not resolve to a commit or the tree
    /// cannot be read.
    pub fn read_at(&self, rev: &str, path: &str) -> Result<Option<String>> {
        let tree = self.resolve_commit(rev)?.tree()?;
        Ok(self.tree_text(&tree, path))
    }

    fn tree_text(&self, tree: &Tree<'_>, path: &str) -> Option<String> {
        let entry = tree.get_path(Path::new(path)).ok()?;
        self.blob_text(entry.id())
    }

    fn blob_text(&self, id: Oid) -> Option<String> {
        if id.is_zero() {
            return None;
        }
        let blob = self.inner.find_blob(id).ok()?;
        if blob.is_binary() {
            return None;
        }
        std::str::from_utf8(blob.content()).ok().map(str::to_owned)
    }

    fn resolve_commit(&self, spec: &str) -> Result<git2::Commit<'_>> {
        let object = match self.inner.revparse_single(spec) {
            Ok(object) => object,
            Err(err)
                if spec == "HEAD"
                    && matches!(err.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) =>
            {
                return Err(Error::MissingHeadRevision)
            }
            Err(err)
                if matches!(
                    err.code(),
                    ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous
                ) =>
            {
                return Err(Error::UnknownRevision {
                    spec: spec.to_owned(),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        object.peel_to_commit().map_err(|_| Error::UnknownRevision {
            spec: spec.to_owned(),
        })
    }
}

const fn convert_status(delta: Delta) -> Option<FileStatus> {
    match delta {
        Delta::Added => Some(FileStatus::Added),
        Delta::Deleted => Some(FileStatus::Removed),
        Delta::Modified => Some(FileStatus::Modified),
        Delta::Renamed => Some(FileStatus::Renamed),
        Delta::Copied => Some(FileStatus::Copied),
        Delta::Typechange => Some(FileStatus::TypeChange),
        Delta::Unmodified
        | Delta::Ignored
        | Delta::Untracked
        | Delta::Unreadable
        | Delta::Conflicted => None,
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{IndexAddOption, Repository as GitRepository};
    use tempfile::TempDir;

    #[test]
    fn read_at_returns_text_for_revision() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        let git_repo = GitRepository::init(temp.path())?;

        write_file(temp.path().join("DOC.MD"), "# Docs\n");
        stage_and_commit(&git_repo, "Initial commit")?;
        write_file(temp.path().join("DOC.MD"), "# Docs\n\nmore\n");
        stage_and_commit(&git_repo, "Second commit")?;

        let repo = Repository::open(temp.path())?;
        assert_eq!(repo.read_at("HEAD", "DOC.MD")?.as_deref(), Some("# Docs\n\nmore\n"));
        assert_eq!(repo.read_at("HEAD~1", "DOC.MD")?.as_deref(), Some("# Docs\n"));
        assert_eq!(repo.read_at("HEAD", "missing.md")?, None);

        Ok(())
    }

    #[test]
    fn root_commit_diffs_against_empty_tree() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        let git_repo = GitRepository::init(temp.path())?;

        write_file(temp.path().join("a.js"), "function a() {\n}\n");
        stage_and_commit(&git_repo, "Initial commit")?;

        let repo = Repository::open(temp.path())?;
        let changes = repo.changed_files(None, "HEAD")?;
        assert!(changes.base.is_none());
        assert_eq!(changes.files.len(), 1);

        let file = &changes.files[0];
        assert_eq!(file.status, FileStatus::Added);
        assert_eq!(file.content.as_deref(), Some("function a() {\n}\n"));
        assert!(file
            .patch
            .as_deref()
            .is_some_and(|patch| patch.contains("@@ -0,0 +1,2 @@")));

        Ok(())
    }

    #[test]
    fn unknown_revisions_are_reported() -> Result<()> {
        let temp = TempDir::new().expect("tempdir");
        let git_repo = GitRepository::init(temp.path())?;

        let repo = Repository::open(temp.path())?;
        assert!(matches!(
            repo.changed_files(None, "HEAD"),
            Err(Error::MissingHeadRevision)
        ));

        write_file(temp.path().join("a.txt"), "a\n");
        stage_and_commit(&git_repo, "Initial commit")?;
        assert!(matches!(
            repo.changed_files(Some("no-such-branch"), "HEAD"),
            Err(Error::UnknownRevision { spec }) if spec == "no-such-branch"
        ));

        Ok(())
    }

    #[test]
    fn open_non_repository_returns_error() {
        let temp = TempDir::new().expect("tempdir");
        let err = Repository::open(temp.path());
        assert!(matches!(err, Err(Error::NotARepository { .. })));
    }

    fn write_file(path: std::path::PathBuf, contents: &str) {
        std::fs::write(path, contents).expect("write file");
    }

    fn stage_and_commit(repo: &GitRepository, message: &str) -> Result<()> {
        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let signature = git2::Signature::now("Test User", "test@example.com")?;

        let parents = match repo.head() {
            Ok(head) => head
                .peel_to_commit()
                .map_or_else(|_| Vec::new(), |parent| vec![parent]),
            Err(err)
                if matches!(
                    (err.class(), err.code()),
                    (
                        git2::ErrorClass::Reference,
                        git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch
                    )
                ) =>
            {
                Vec::new()
            }
            Err(err) => return Err(Error::from(err)),
        };

        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parent_refs,
        )?;
        Ok(())
    }
}
