//! End-to-end documentation run over a revision range.

use std::slice;

use redot_api::{ChangedFile, DocProposal, DocSummary, DocUpdate, RewriteResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::generators::GeneratorService;
use crate::localize::localize;
use crate::persist::{preview_patch, DocWriter};
use crate::repository::Repository;
use crate::rewrite::rewrite_docs;
use crate::{Error, Result};

/// DOC.MD locations probed at the head revision, in order.
pub const DEFAULT_DOC_MD_CANDIDATES: &[&str] =
    &["DOC.MD", "docs/DOC.MD", "README.md", "DOCUMENTATION.md"];

/// Knobs for a documentation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Identifier of the generator asked for proposals.
    pub generator: String,
    /// Whether rewritten files are written to the working tree and staged.
    pub write: bool,
    /// DOC.MD locations probed at the head revision; the first present wins.
    pub doc_md_candidates: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            generator: "passive".to_string(),
            write: false,
            doc_md_candidates: DEFAULT_DOC_MD_CANDIDATES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Generator verdict for one affected function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionOutcome {
    /// File containing the function.
    pub filename: String,
    /// Name of the function.
    pub function_name: String,
    /// Declaration line.
    pub line: u32,
    /// Proposal returned by the generator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal: Option<DocProposal>,
    /// Generator failure, when no proposal was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unparseable reply text, kept for inspection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
}

/// A file whose documentation was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenFile {
    /// Path of the file.
    pub filename: String,
    /// Functions whose blocks changed.
    pub updated_functions: Vec<String>,
    /// Unified diff from the head text to the rewritten text.
    pub patch: String,
    /// Rewritten text.
    #[serde(skip)]
    pub new_file_text: String,
    /// Whether the file was written and staged.
    pub written: bool,
    /// Persistence failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A changed file that could not be analysed or rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Path of the file.
    pub filename: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of the DOC.MD revision step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocMdRevision {
    /// Existing DOC.MD location, if one was found.
    pub path: Option<String>,
    /// Revised DOC.MD text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Unified diff against the existing DOC.MD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    /// Whether the revision was written and staged.
    pub written: bool,
    /// Generator or persistence failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Functions handed to the generator.
    pub functions_analyzed: usize,
    /// Functions the generator wanted to update.
    pub functions_needing_update: usize,
    /// Files written to the working tree, DOC.MD included.
    pub files_written: usize,
    /// Whether writing was enabled.
    pub write_enabled: bool,
}

/// Generator verdicts and rewrites for a set of changed files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentedChanges {
    /// One entry per affected function.
    pub outcomes: Vec<FunctionOutcome>,
    /// Files with rewritten documentation.
    pub rewrites: Vec<RewrittenFile>,
    /// Files that were not analysed or could not be rewritten.
    pub skipped: Vec<SkippedFile>,
    /// DOC.MD summaries of the functions needing an update.
    pub summaries: Vec<DocSummary>,
}

/// Report of a full run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Base commit id.
    pub base: Option<String>,
    /// Head commit id.
    pub head: String,
    /// Generator used for proposals.
    pub generator: String,
    /// One entry per affected function.
    pub outcomes: Vec<FunctionOutcome>,
    /// Files with rewritten documentation.
    pub rewrites: Vec<RewrittenFile>,
    /// Files that were not analysed or could not be rewritten.
    pub skipped: Vec<SkippedFile>,
    /// DOC.MD revision, when one was requested.
    pub doc_md: Option<DocMdRevision>,
    /// Counters.
    pub summary: RunSummary,
}

/// Drives localization, generation, rewriting and persistence.
#[derive(Debug, Clone)]
pub struct DocPipeline {
    service: GeneratorService,
    options: RunOptions,
}

impl DocPipeline {
    /// Create a pipeline over `service` with the given options.
    #[must_use]
    pub const fn new(service: GeneratorService, options: RunOptions) -> Self {
        Self { service, options }
    }

    /// Options the pipeline runs with.
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Document the changes between `base` and `head` of `repository`.
    ///
    /// # Errors
    ///
    /// Returns an error when the generator is not registered, when the
    /// revisions cannot be resolved or diffed, or on repository read
    /// failures. Generator and write failures for individual functions or
    /// files are recorded in the report instead.
    pub fn run(
        &self,
        repository: &Repository,
        base: Option<&str>,
        head: &str,
    ) -> Result<RunReport> {
        let changes = repository.changed_files(base, head)?;
        info!(
            base = changes.base.as_deref().unwrap_or("<empty tree>"),
            head = %changes.head,
            files = changes.files.len(),
            "collected changed files"
        );

        let documented = self.document(&changes.files)?;
        let mut doc_md = self.revise_doc_md(repository, &changes.head, &documented.summaries)?;
        let mut rewrites = documented.rewrites;

        let mut files_written = 0;
        if self.options.write {
            let writer = DocWriter::new(repository);
            for rewrite in &mut rewrites {
                let result = RewriteResult {
                    filename: rewrite.filename.clone(),
                    new_file_text: rewrite.new_file_text.clone(),
                };
                match writer.persist(slice::from_ref(&result)) {
                    Ok(written) => rewrite.written = !written.is_empty(),
                    Err(err) => {
                        warn!(
                            path = %rewrite.filename,
                            error = %err,
                            "failed to write documentation"
                        );
                        rewrite.error = Some(err.to_string());
                    }
                }
                files_written += usize::from(rewrite.written);
            }

            if let Some(revision) = doc_md.as_mut() {
                persist_doc_md(&writer, revision);
                files_written += usize::from(revision.written);
            }
        }

        let functions_needing_update = documented
            .outcomes
            .iter()
            .filter(|outcome| outcome.proposal.as_ref().is_some_and(|p| p.needs_update))
            .count();

        Ok(RunReport {
            base: changes.base,
            head: changes.head,
            generator: self.options.generator.clone(),
            summary: RunSummary {
                functions_analyzed: documented.outcomes.len(),
                functions_needing_update,
                files_written,
                write_enabled: self.options.write,
            },
            outcomes: documented.outcomes,
            rewrites,
            skipped: documented.skipped,
            doc_md,
        })
    }

    /// Localize, propose and rewrite documentation for `files` without
    /// touching any repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GeneratorNotRegistered`] when the configured generator
    /// is unknown, or propagates patch preview failures.
    pub fn document(&self, files: &[ChangedFile]) -> Result<DocumentedChanges> {
        let generator = self.options.generator.as_str();
        if self.service.capabilities(generator).is_none() {
            return Err(Error::GeneratorNotRegistered {
                generator: generator.to_string(),
            });
        }

        let mut documented = DocumentedChanges::default();
        for file in files {
            if !file.status.exists_in_head() {
                debug!(path = %file.path, "skipping removed file");
                continue;
            }
            let (Some(patch), Some(text)) = (file.patch.as_deref(), file.content.as_deref()) else {
                debug!(path = %file.path, "no patch or head text; skipping");
                documented.skipped.push(SkippedFile {
                    filename: file.path.clone(),
                    reason: "patch or head text unavailable".to_string(),
                });
                continue;
            };

            let affected = localize(&file.path, Some(patch), Some(text))?;
            info!(path = %file.path, functions = affected.len(), "localized affected functions");

            let mut updates = Vec::new();
            for function in &affected {
                let mut outcome = FunctionOutcome {
                    filename: function.filename.clone(),
                    function_name: function.function_name.clone(),
                    line: function.start_line,
                    proposal: None,
                    error: None,
                    raw_reply: None,
                };

                match self.service.propose(generator, function) {
                    Ok(proposal) => {
                        if proposal.needs_update {
                            documented.summaries.push(DocSummary {
                                filename: function.filename.clone(),
                                function_name: function.function_name.clone(),
                                summary: summary_line(&proposal),
                            });
                        }
                        if let Some(block) = proposal.replacement() {
                            updates.push(DocUpdate::new(
                                function.function_name.clone(),
                                function.start_line,
                                block,
                            ));
                        }
                        outcome.proposal = Some(proposal);
                    }
                    Err(Error::Generator { source, .. }) => {
                        warn!(
                            path = %function.filename,
                            function = %function.function_name,
                            error = %source,
                            "generator failed"
                        );
                        outcome.raw_reply = source.raw_reply().map(str::to_owned);
                        outcome.error = Some(source.to_string());
                    }
                    Err(other) => return Err(other),
                }
                documented.outcomes.push(outcome);
            }

            if updates.is_empty() {
                continue;
            }
            match rewrite_docs(&file.path, text, &updates) {
                Ok(result) if result.new_file_text == text => {
                    debug!(path = %file.path, "documentation already current");
                }
                Ok(result) => {
                    documented.rewrites.push(RewrittenFile {
                        filename: file.path.clone(),
                        updated_functions: updates
                            .iter()
                            .map(|update| update.function_name.clone())
                            .collect(),
                        patch: preview_patch(&file.path, text, &result.new_file_text)?,
                        new_file_text: result.new_file_text,
                        written: false,
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(path = %file.path, error = %err, "failed to rewrite documentation");
                    documented.skipped.push(SkippedFile {
                        filename: file.path.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(documented)
    }

    fn revise_doc_md(
        &self,
        repository: &Repository,
        head: &str,
        summaries: &[DocSummary],
    ) -> Result<Option<DocMdRevision>> {
        if summaries.is_empty() {
            return Ok(None);
        }
        let generator = self.options.generator.as_str();
        if !self
            .service
            .capabilities(generator)
            .is_some_and(|capabilities| capabilities.supports_doc_md)
        {
            debug!(generator, "generator does not revise DOC.MD");
            return Ok(None);
        }

        let mut existing = None;
        for candidate in &self.options.doc_md_candidates {
            if let Some(text) = repository.read_at(head, candidate)? {
                existing = Some((candidate.clone(), text));
                break;
            }
        }
        let (path, current) = existing.unzip();

        let mut revision = DocMdRevision {
            path,
            text: None,
            patch: None,
            written: false,
            error: None,
        };
        match self
            .service
            .revise_doc_md(generator, current.as_deref(), summaries)
        {
            Ok(revised) => {
                if let (Some(path), Some(current)) = (&revision.path, &current) {
                    revision.patch = Some(preview_patch(path, current, &revised)?);
                }
                revision.text = Some(revised);
            }
            Err(Error::Generator { source, .. }) => {
                warn!(error = %source, "DOC.MD revision failed");
                revision.error = Some(source.to_string());
            }
            Err(other) => return Err(other),
        }
        Ok(Some(revision))
    }
}

fn persist_doc_md(writer: &DocWriter<'_>, revision: &mut DocMdRevision) {
    let (Some(path), Some(text)) = (revision.path.as_ref(), revision.text.as_ref()) else {
        return;
    };
    let result = RewriteResult {
        filename: path.clone(),
        new_file_text: text.clone(),
    };
    match writer.persist(slice::from_ref(&result)) {
        Ok(written) => revision.written = !written.is_empty(),
        Err(err) => {
            warn!(path = %path, error = %err, "failed to write DOC.MD");
            revision.error = Some(err.to_string());
        }
    }
}

fn summary_line(proposal: &DocProposal) -> String {
    proposal
        .doc_md_summary
        .as_deref()
        .or(proposal.reason.as_deref())
        .map_or_else(|| "documentation updated".to_string(), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{
        DocGenerator, GeneratorCapabilities, GeneratorError, GeneratorRegistry, GeneratorResult,
    };
    use redot_api::{AffectedFunction, FileStatus};

    struct Scripted;

    impl DocGenerator for Scripted {
        fn id(&self) -> &'static str {
            "scripted"
        }

        fn label(&self) -> &'static str {
            "Scripted"
        }

        fn capabilities(&self) -> GeneratorCapabilities {
            GeneratorCapabilities::new(true, false)
        }

        fn propose(&self, function: &AffectedFunction) -> GeneratorResult<DocProposal> {
            match function.function_name.as_str() {
                "alpha" => Ok(DocProposal {
                    needs_update: true,
                    reason: Some("return value changed".into()),
                    inline_documentation: Some("/** Alpha adds one. */".into()),
                    doc_md_summary: Some("alpha adds one".into()),
                }),
                "broken" => Err(GeneratorError::MalformedReply {
                    detail: "expected value".into(),
                    raw: "not json".into(),
                }),
                _ => Ok(DocProposal::unchanged("still accurate")),
            }
        }

        fn revise_doc_md(
            &self,
            existing: Option<&str>,
            summaries: &[DocSummary],
        ) -> GeneratorResult<String> {
            Ok(format!(
                "{}- {}\n",
                existing.unwrap_or("# Docs\n"),
                summaries[0].summary
            ))
        }
    }

    const LIB: &str = "function alpha(a) {
  return a + 1;
}

function beta(b) {
  return b;
}

function broken() {
  return 0;
}
";

    const LIB_PATCH: &str = "@@ -2 +2 @@
-  return a;
+  return a + 1;
@@ -6 +6 @@
-  return 1;
+  return b;
@@ -10 +10 @@
-  return 1;
+  return 0;
";

    fn pipeline(generator: &str) -> DocPipeline {
        let mut registry = GeneratorRegistry::new();
        registry.register(Scripted);
        DocPipeline::new(
            GeneratorService::new(registry),
            RunOptions {
                generator: generator.to_string(),
                ..RunOptions::default()
            },
        )
    }

    #[test]
    fn documents_affected_functions_and_records_failures() {
        let files = vec![
            ChangedFile::modified("lib.js", LIB_PATCH, LIB),
            ChangedFile {
                path: "gone.js".into(),
                old_path: None,
                status: FileStatus::Removed,
                patch: Some("@@ -1 +0,0 @@\n-x\n".into()),
                content: None,
            },
            ChangedFile {
                path: "logo.png".into(),
                old_path: None,
                status: FileStatus::Added,
                patch: None,
                content: None,
            },
        ];

        let documented = pipeline("scripted").document(&files).expect("document");

        let names: Vec<&str> = documented
            .outcomes
            .iter()
            .map(|outcome| outcome.function_name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "broken"]);

        let broken = &documented.outcomes[2];
        assert!(broken.proposal.is_none());
        assert_eq!(broken.raw_reply.as_deref(), Some("not json"));
        assert!(broken.error.is_some());

        assert_eq!(documented.rewrites.len(), 1);
        let rewrite = &documented.rewrites[0];
        assert_eq!(rewrite.updated_functions, vec!["alpha"]);
        assert!(rewrite
            .new_file_text
            .starts_with("/** Alpha adds one. */\n\nfunction alpha(a) {"));
        assert!(rewrite.patch.contains("+/** Alpha adds one. */"));

        assert_eq!(
            documented.summaries,
            vec![DocSummary {
                filename: "lib.js".into(),
                function_name: "alpha".into(),
                summary: "alpha adds one".into(),
            }]
        );
        assert_eq!(documented.skipped.len(), 1);
        assert_eq!(documented.skipped[0].filename, "logo.png");
    }

    #[test]
    fn unknown_generator_fails_fast() {
        let result = pipeline("missing").document(&[]);
        assert!(matches!(
            result,
            Err(Error::GeneratorNotRegistered { generator }) if generator == "missing"
        ));
    }

    #[test]
    fn summary_line_falls_back_to_reason() {
        let proposal = DocProposal {
            needs_update: true,
            reason: Some("renamed parameter".into()),
            ..DocProposal::default()
        };
        assert_eq!(summary_line(&proposal), "renamed parameter");
        assert_eq!(summary_line(&DocProposal::default()), "documentation updated");
    }

    #[test]
    fn report_serializes_without_file_text() {
        let documented = pipeline("scripted")
            .document(&[ChangedFile::modified("lib.js", LIB_PATCH, LIB)])
            .expect("document");
        let value = serde_json::to_value(&documented.rewrites[0]).expect("json");
        assert!(value.get("new_file_text").is_none());
        assert_eq!(value["filename"], "lib.js");
        assert_eq!(value["written"], false);
    }
}
