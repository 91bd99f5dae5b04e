use std::io::{self, Write};

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use redot_core::pipeline::DEFAULT_DOC_MD_CANDIDATES;
use redot_core::{DocPipeline, GeneratorService, Repository, RunOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "redot",
    about = "Refresh the documentation of functions touched by a revision range"
)]
struct Args {
    /// Path inside the repository to analyse
    #[arg(default_value = ".")]
    repo: Utf8PathBuf,
    /// Base revision (defaults to the first parent of head)
    #[arg(long)]
    base: Option<String>,
    /// Head revision
    #[arg(long, default_value = "HEAD")]
    head: String,
    /// Generator used for proposals
    #[arg(long, default_value = "passive")]
    generator: String,
    /// Write rewritten files into the working tree and stage them
    #[arg(long)]
    write: bool,
    /// DOC.MD location to probe; repeatable, replaces the defaults
    #[arg(long = "doc-md", value_name = "PATH")]
    doc_md: Vec<String>,
    /// List registered generators and exit
    #[arg(long)]
    list_generators: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let service = GeneratorService::default();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list_generators {
        serde_json::to_writer_pretty(&mut out, &service.summaries())
            .context("failed to encode generator list")?;
        writeln!(out)?;
        return Ok(());
    }

    let doc_md_candidates = if args.doc_md.is_empty() {
        DEFAULT_DOC_MD_CANDIDATES
            .iter()
            .map(ToString::to_string)
            .collect()
    } else {
        args.doc_md
    };

    let repository = Repository::open(&args.repo)
        .with_context(|| format!("failed to open repository at {}", args.repo))?;
    let pipeline = DocPipeline::new(
        service,
        RunOptions {
            generator: args.generator,
            write: args.write,
            doc_md_candidates,
        },
    );
    let report = pipeline
        .run(&repository, args.base.as_deref(), &args.head)
        .context("documentation run failed")?;

    serde_json::to_writer_pretty(&mut out, &report).context("failed to encode run report")?;
    writeln!(out)?;
    Ok(())
}
