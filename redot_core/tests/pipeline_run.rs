use std::path::Path;

use git2::{IndexAddOption, Repository as GitRepository};
use redot_core::generators::{
    DocGenerator, GeneratorCapabilities, GeneratorRegistry, GeneratorResult, GeneratorService,
};
use redot_core::{
    AffectedFunction, DocPipeline, DocProposal, DocSummary, Error, Repository, Result, RunOptions,
};
use tempfile::TempDir;

const MATH_V1: &str = "/**
 * Adds numbers.
 */
function add(a, b) {
  return a + b;
}

function scale(v, k) {
  return v * k;
}
";

const MATH_V2: &str = "/**
 * Adds numbers.
 */
function add(a, b, c = 0) {
  return a + b + c;
}

function scale(v, k) {
  return v * k;
}
";

struct Reviewer;

impl DocGenerator for Reviewer {
    fn id(&self) -> &'static str {
        "reviewer"
    }

    fn label(&self) -> &'static str {
        "Reviewer"
    }

    fn capabilities(&self) -> GeneratorCapabilities {
        GeneratorCapabilities::new(true, false)
    }

    fn propose(&self, function: &AffectedFunction) -> GeneratorResult<DocProposal> {
        Ok(DocProposal {
            needs_update: true,
            reason: Some("new optional parameter".into()),
            inline_documentation: Some(
                "/**\n * Adds up to three numbers.\n * @param c optional third term\n */".into(),
            ),
            doc_md_summary: Some(format!("{} accepts a third term", function.function_name)),
        })
    }

    fn revise_doc_md(
        &self,
        existing: Option<&str>,
        summaries: &[DocSummary],
    ) -> GeneratorResult<String> {
        let mut revised = existing.unwrap_or("# API\n").to_string();
        for summary in summaries {
            revised.push_str(&format!("- {}\n", summary.summary));
        }
        Ok(revised)
    }
}

fn pipeline(write: bool) -> DocPipeline {
    let mut registry = GeneratorRegistry::new();
    registry.register(Reviewer);
    DocPipeline::new(
        GeneratorService::new(registry),
        RunOptions {
            generator: "reviewer".into(),
            write,
            ..RunOptions::default()
        },
    )
}

fn fixture() -> Result<(TempDir, GitRepository)> {
    let temp = TempDir::new().expect("tempdir");
    let git_repo = GitRepository::init(temp.path())?;

    std::fs::create_dir_all(temp.path().join("docs")).expect("create docs");
    write_text(temp.path().join("docs/DOC.MD"), "# API\n");
    write_text(temp.path().join("math.js"), MATH_V1);
    stage_and_commit(&git_repo, "Initial commit")?;

    write_text(temp.path().join("math.js"), MATH_V2);
    stage_and_commit(&git_repo, "Add optional term")?;

    Ok((temp, git_repo))
}

const EXPECTED_MATH: &str = "/**
 * Adds up to three numbers.
 * @param c optional third term
 */
function add(a, b, c = 0) {
  return a + b + c;
}

function scale(v, k) {
  return v * k;
}
";

#[test]
fn dry_run_reports_without_touching_the_workspace() -> Result<()> {
    let (temp, _git_repo) = fixture()?;
    let repository = Repository::open(temp.path())?;

    let report = pipeline(false).run(&repository, None, "HEAD")?;

    assert_eq!(report.generator, "reviewer");
    assert_eq!(report.summary.functions_analyzed, 1);
    assert_eq!(report.summary.functions_needing_update, 1);
    assert_eq!(report.summary.files_written, 0);
    assert!(!report.summary.write_enabled);

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].function_name, "add");
    assert_eq!(report.outcomes[0].line, 4);

    assert_eq!(report.rewrites.len(), 1);
    assert_eq!(report.rewrites[0].new_file_text, EXPECTED_MATH);
    assert!(report.rewrites[0].patch.contains("+ * Adds up to three numbers."));
    assert!(!report.rewrites[0].written);

    let doc_md = report.doc_md.as_ref().expect("DOC.MD revision");
    assert_eq!(doc_md.path.as_deref(), Some("docs/DOC.MD"));
    assert_eq!(
        doc_md.text.as_deref(),
        Some("# API\n- add accepts a third term\n")
    );
    assert!(!doc_md.written);

    let on_disk = std::fs::read_to_string(temp.path().join("math.js")).expect("read math");
    assert_eq!(on_disk, MATH_V2);

    let json = serde_json::to_value(&report).expect("report json");
    assert_eq!(json["summary"]["functions_analyzed"], 1);
    assert!(json["rewrites"][0].get("new_file_text").is_none());

    Ok(())
}

#[test]
fn write_persists_rewrites_and_doc_md() -> Result<()> {
    let (temp, git_repo) = fixture()?;
    let repository = Repository::open(temp.path())?;

    let report = pipeline(true).run(&repository, Some("HEAD~1"), "HEAD")?;

    assert_eq!(report.summary.files_written, 2);
    assert!(report.rewrites[0].written);
    assert!(report.doc_md.as_ref().is_some_and(|doc_md| doc_md.written));

    let math = std::fs::read_to_string(temp.path().join("math.js")).expect("read math");
    assert_eq!(math, EXPECTED_MATH);
    let doc_md = std::fs::read_to_string(temp.path().join("docs/DOC.MD")).expect("read DOC.MD");
    assert_eq!(doc_md, "# API\n- add accepts a third term\n");

    let mut index = git_repo.index()?;
    index.read(true)?;
    for path in ["math.js", "docs/DOC.MD"] {
        assert!(index.get_path(Path::new(path), 0).is_some(), "{path} staged");
    }

    Ok(())
}

#[test]
fn unchanged_functions_produce_no_rewrites() -> Result<()> {
    let (temp, _git_repo) = fixture()?;
    let repository = Repository::open(temp.path())?;

    let passive = DocPipeline::new(GeneratorService::default(), RunOptions::default());
    let report = passive.run(&repository, None, "HEAD")?;

    assert_eq!(report.summary.functions_analyzed, 1);
    assert_eq!(report.summary.functions_needing_update, 0);
    assert!(report.rewrites.is_empty());
    assert!(report.doc_md.is_none());

    Ok(())
}

fn write_text(path: impl AsRef<Path>, contents: &str) {
    std::fs::write(path, contents).expect("write text file");
}

fn stage_and_commit(repo: &GitRepository, message: &str) -> Result<()> {
    let mut index = repo.index()?;
    index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
    index.write()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let signature = git2::Signature::now("Test", "test@example.com")?;

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
