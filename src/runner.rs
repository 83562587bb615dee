use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::store;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PYTHON: &str = "python3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Language {
    Cpp,
    Python,
}

impl Language {
    /// Guess from the file extension: `.cpp`/`.cc`/`.cxx` or `.py`.
    pub fn detect(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "cpp" | "cc" | "cxx" => Some(Language::Cpp),
            "py" => Some(Language::Python),
            _ => None,
        }
    }
}

/// A command line that runs the solution once. Input arrives on stdin.
#[derive(Debug, Clone)]
pub struct Program {
    program: OsString,
    args: Vec<OsString>,
}

impl Program {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Turn a source file into something runnable. C++ is compiled with `g++`
/// next to the source; Python runs under `python`.
pub async fn prepare(solution: &Path, lang: Language, python: &str) -> Result<Program> {
    match lang {
        Language::Python => Ok(Program::new(python, [solution.as_os_str()])),
        Language::Cpp => {
            let exe = compiled_path(solution);
            info!("Compiling {}", solution.display());
            let output = Command::new("g++")
                .arg(solution)
                .arg("-o")
                .arg(&exe)
                .output()
                .await
                .context("Failed to start g++")?;
            if !output.status.success() {
                bail!(
                    "Compilation of {} failed:\n{}",
                    solution.display(),
                    String::from_utf8_lossy(&output.stderr).trim_end()
                );
            }
            Ok(Program::new(exe, Vec::<OsString>::new()))
        }
    }
}

fn compiled_path(solution: &Path) -> PathBuf {
    let exe = solution.with_extension(std::env::consts::EXE_EXTENSION);
    // A bare relative name would be looked up on PATH.
    if exe.parent().is_some_and(|p| p.as_os_str().is_empty()) {
        Path::new(".").join(exe)
    } else {
        exe
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub number: u32,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    /// Non-zero exit, timeout or spawn failure, with any stderr.
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub cases: Vec<CaseOutcome>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.cases.len()
    }

    pub fn print(&self) {
        for case in &self.cases {
            if case.passed {
                println!("Test case {}: passed", case.number);
                continue;
            }
            println!("Test case {}: FAILED", case.number);
            if let Some(err) = &case.error {
                println!("  error:    {}", err);
            }
            println!("  expected: {}", case.expected);
            println!("  actual:   {}", case.actual);
        }
        println!("{}/{} test cases passed.", self.passed(), self.cases.len());
    }
}

/// Run `program` against every stored case in `dir`, in case order.
pub async fn run_all(program: &Program, dir: &Path, timeout: Duration) -> Result<RunReport> {
    let files = store::case_files(dir)?;
    if files.is_empty() {
        bail!("No ip<N>.txt / op<N>.txt pairs in {}", dir.display());
    }

    let mut report = RunReport::default();
    for case in files {
        let input = tokio::fs::read_to_string(&case.input)
            .await
            .with_context(|| format!("Failed to read {}", case.input.display()))?;
        let expected = tokio::fs::read_to_string(&case.expected)
            .await
            .with_context(|| format!("Failed to read {}", case.expected.display()))?;

        let outcome = run_case(program, case.number, &input, expected.trim(), timeout).await;
        debug!(case = outcome.number, passed = outcome.passed, "case finished");
        report.cases.push(outcome);
    }
    Ok(report)
}

/// Feed `input` to one run of `program` and compare trimmed stdout.
pub async fn run_case(
    program: &Program,
    number: u32,
    input: &str,
    expected: &str,
    timeout: Duration,
) -> CaseOutcome {
    let (actual, error) = match tokio::time::timeout(timeout, execute(program, input)).await {
        Ok(Ok(finished)) => finished,
        Ok(Err(e)) => (String::new(), Some(format!("{:#}", e))),
        Err(_) => (
            String::new(),
            Some(format!("timed out after {:.1}s", timeout.as_secs_f64())),
        ),
    };

    if let Some(err) = &error {
        warn!("Test case {}: {}", number, err);
    }
    CaseOutcome {
        number,
        passed: error.is_none() && actual == expected,
        expected: expected.to_string(),
        actual,
        error,
    }
}

/// Trimmed stdout, plus an error message if the process exited unsuccessfully.
async fn execute(program: &Program, input: &str) -> Result<(String, Option<String>)> {
    let mut child = program
        .command()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start {:?}", program.program))?;

    if let Some(mut stdin) = child.stdin.take() {
        // A program that exits without reading closes the pipe early.
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e).context("Failed to write stdin");
            }
        }
    }

    let output = child.wait_with_output().await.context("Failed to wait for program")?;
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() {
        return Ok((stdout, None));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let err = if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        format!("exited with {}: {}", output.status, stderr)
    };
    Ok((stdout, Some(err)))
}
