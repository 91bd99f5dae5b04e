use std::env;
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use redot_api::{AffectedFunction, DocProposal, DocSummary};
use redot_generator_api::{DocGenerator, GeneratorCapabilities, GeneratorError, GeneratorResult};
use wait_timeout::ChildExt;

use crate::prompt;

const DEFAULT_BINARY: &str = "llm";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const PASSTHROUGH_PREFIX: &str = "REDOT_";
const FORWARDED_VARS: &[&str] = &["PATH", "HOME", "ANTHROPIC_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Clone)]
struct GeneratorCli {
    binary: OsString,
    args: Vec<String>,
    timeout: Duration,
    environment: Vec<(OsString, OsString)>,
}

impl GeneratorCli {
    fn from_env() -> Self {
        let binary =
            env::var_os("REDOT_GENERATOR_BIN").unwrap_or_else(|| OsString::from(DEFAULT_BINARY));
        let args = env::var("REDOT_GENERATOR_ARGS")
            .map(|raw| raw.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
        let timeout = env::var("REDOT_GENERATOR_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut environment = Vec::new();
        for (key, value) in env::vars_os() {
            let name = key.to_string_lossy();
            let forwarded = FORWARDED_VARS.iter().any(|var| *var == name);
            if forwarded || name.starts_with(PASSTHROUGH_PREFIX) {
                environment.push((key, value));
            }
        }

        Self {
            binary,
            args,
            timeout: Duration::from_secs(timeout),
            environment,
        }
    }

    fn complete(&self, prompt: &str) -> GeneratorResult<String> {
        let mut command = Command::new(&self.binary);
        command.args(&self.args);
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.env_clear();
        command.envs(self.environment.iter().map(|(key, value)| (key, value)));

        let mut child = command.spawn().map_err(|err| {
            GeneratorError::message(format!("failed to spawn generator command: {err}"))
        })?;

        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits without reading its input closes the pipe early.
            if let Err(err) = stdin.write_all(prompt.as_bytes()) {
                if err.kind() != io::ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(GeneratorError::message(format!(
                        "failed to write to generator stdin: {err}"
                    )));
                }
            }
        }

        match child.wait_timeout(self.timeout) {
            Ok(Some(_)) => (),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GeneratorError::message(format!(
                    "generator command timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GeneratorError::message(format!(
                    "failed waiting on generator command: {err}"
                )));
            }
        }

        let status = child.wait().map_err(|err| {
            GeneratorError::message(format!("failed to reap generator command: {err}"))
        })?;

        let stdout = join_reader(stdout_handle, "stdout")?;
        let stderr = join_reader(stderr_handle, "stderr")?;

        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "terminated".to_string(), |c| c.to_string());
            return Err(GeneratorError::message(format!(
                "generator command failed with status {}: {}",
                code,
                stderr.trim()
            )));
        }

        Ok(stdout)
    }
}

fn spawn_reader<R>(mut stream: R) -> thread::JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(
    handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>,
    stream: &str,
) -> GeneratorResult<String> {
    match handle {
        Some(handle) => {
            let bytes = handle
                .join()
                .map_err(|_| {
                    GeneratorError::message(format!("failed to join generator {stream} reader"))
                })?
                .map_err(|err| {
                    GeneratorError::message(format!("failed to read generator {stream}: {err}"))
                })?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
        None => Ok(String::new()),
    }
}

/// Generator that pipes prompts into an external text-generation command.
///
/// The command receives the prompt on stdin and must print its reply on
/// stdout. It is configured from `REDOT_GENERATOR_BIN`,
/// `REDOT_GENERATOR_ARGS` and `REDOT_GENERATOR_TIMEOUT_SECS`.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    cli: GeneratorCli,
}

impl CommandGenerator {
    /// Construct a generator from the current environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cli: GeneratorCli::from_env(),
        }
    }
}

impl Default for CommandGenerator {
    fn default() -> Self {
        Self::from_env()
    }
}

impl DocGenerator for CommandGenerator {
    fn id(&self) -> &'static str {
        "command"
    }

    fn label(&self) -> &'static str {
        "External command"
    }

    fn capabilities(&self) -> GeneratorCapabilities {
        GeneratorCapabilities::new(true, true)
    }

    fn propose(&self, function: &AffectedFunction) -> GeneratorResult<DocProposal> {
        let reply = self.cli.complete(&prompt::function_doc_prompt(function))?;
        prompt::parse_proposal(&reply)
    }

    fn revise_doc_md(
        &self,
        existing: Option<&str>,
        summaries: &[DocSummary],
    ) -> GeneratorResult<String> {
        let reply = self
            .cli
            .complete(&prompt::doc_md_prompt(existing, summaries))?;
        let revised = reply.trim();
        if revised.is_empty() {
            return Err(GeneratorError::message(
                "generator command returned an empty DOC.MD",
            ));
        }
        Ok(format!("{revised}\n"))
    }
}
