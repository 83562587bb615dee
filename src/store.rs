use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::parser::TestCases;

pub const DEFAULT_OUT_DIR: &str = "TestData";

static CASE_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ip|op)(\d+)\.txt$").unwrap());

/// One stored case: its number and the input/expected-output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFiles {
    pub number: u32,
    pub input: PathBuf,
    pub expected: PathBuf,
}

/// Result envelope printed by `extract`.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub message: String,
    pub output: [&'a [String]; 2],
}

impl<'a> Envelope<'a> {
    pub fn new(cases: &'a TestCases) -> Self {
        Self {
            message: format!("Extracted {} test cases", cases.len()),
            output: [cases.inputs(), cases.outputs()],
        }
    }
}

/// Write `ip<N>.txt` / `op<N>.txt` (1-based) under `root/slug/`, replacing
/// any cases already there. Returns the number of pairs written.
pub fn write_cases(root: &Path, slug: &str, cases: &TestCases) -> Result<usize> {
    let dir = problem_dir(root, slug);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    clear_cases(&dir)?;

    for (i, (input, output)) in cases.pairs().enumerate() {
        let n = i + 1;
        write_file(&dir.join(format!("ip{}.txt", n)), input)?;
        write_file(&dir.join(format!("op{}.txt", n)), output)?;
    }

    debug!("Wrote {} cases to {}", cases.len(), dir.display());
    Ok(cases.len())
}

pub fn problem_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(slug)
}

/// Every `ip<N>.txt` in `dir` that has a matching `op<N>.txt`, by number.
pub fn case_files(dir: &Path) -> Result<Vec<CaseFiles>> {
    let mut cases = Vec::new();
    for (kind, number, path) in stored_files(dir)? {
        if kind != "ip" {
            continue;
        }
        let expected = dir.join(format!("op{}.txt", number));
        if !expected.is_file() {
            warn!("{} has no op{}.txt, skipping", path.display(), number);
            continue;
        }
        cases.push(CaseFiles {
            number,
            input: path,
            expected,
        });
    }
    cases.sort_by_key(|c| c.number);
    Ok(cases)
}

fn clear_cases(dir: &Path) -> Result<()> {
    for (_, _, path) in stored_files(dir)? {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// `(kind, number, path)` for each `ip<N>.txt` / `op<N>.txt` in `dir`.
fn stored_files(dir: &Path) -> Result<Vec<(String, u32, PathBuf)>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = CASE_FILE_RE.captures(name) else {
            continue;
        };
        let Ok(number) = caps[2].parse::<u32>() else {
            continue;
        };
        let kind = caps[1].to_string();
        files.push((kind, number, path));
    }
    Ok(files)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cases() -> TestCases {
        TestCases::from_parts(
            vec!["4 2 7 11 15 9".into(), "3 3 2 4 6".into()],
            vec!["0 1".into(), "1 2\n3 4".into()],
        )
        .unwrap()
    }

    #[test]
    fn writes_numbered_pairs() {
        let tmp = tempfile::tempdir().unwrap();
        let n = write_cases(tmp.path(), "two-sum", &cases()).unwrap();
        assert_eq!(n, 2);

        let dir = tmp.path().join("two-sum");
        assert_eq!(fs::read_to_string(dir.join("ip1.txt")).unwrap(), "4 2 7 11 15 9");
        assert_eq!(fs::read_to_string(dir.join("op1.txt")).unwrap(), "0 1");
        assert_eq!(fs::read_to_string(dir.join("ip2.txt")).unwrap(), "3 3 2 4 6");
        assert_eq!(fs::read_to_string(dir.join("op2.txt")).unwrap(), "1 2\n3 4");
        assert!(!dir.join("ip3.txt").exists());
    }

    #[test]
    fn rewriting_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        write_cases(tmp.path(), "p", &cases()).unwrap();
        let single = TestCases::from_parts(vec!["1".into()], vec!["2".into()]).unwrap();
        write_cases(tmp.path(), "p", &single).unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("p/ip1.txt")).unwrap(), "1");
        assert!(!tmp.path().join("p/ip2.txt").exists());
        assert!(!tmp.path().join("p/op2.txt").exists());
    }

    #[test]
    fn rewriting_keeps_unrelated_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("p");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("solution.py"), "print(1)").unwrap();
        fs::write(dir.join("ip9.txt"), "stale").unwrap();

        write_cases(tmp.path(), "p", &cases()).unwrap();
        assert!(dir.join("solution.py").exists());
        assert!(!dir.join("ip9.txt").exists());
    }

    #[test]
    fn case_files_pairs_inputs_with_outputs_in_number_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        for (name, body) in [
            ("ip10.txt", "a"),
            ("op10.txt", "b"),
            ("ip2.txt", "c"),
            ("op2.txt", "d"),
            ("ip3.txt", "orphan"),
            ("notes.txt", "x"),
        ] {
            fs::write(dir.join(name), body).unwrap();
        }

        let found = case_files(dir).unwrap();
        let numbers: Vec<u32> = found.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![2, 10]);
        assert_eq!(found[0].input, dir.join("ip2.txt"));
        assert_eq!(found[0].expected, dir.join("op2.txt"));
    }

    #[test]
    fn empty_cases_create_folder_only() {
        let tmp = tempfile::tempdir().unwrap();
        let n = write_cases(tmp.path(), "none", &TestCases::default()).unwrap();
        assert_eq!(n, 0);
        assert!(tmp.path().join("none").is_dir());
    }

    #[test]
    fn envelope_json_shape() {
        let cases = cases();
        let json = serde_json::to_value(Envelope::new(&cases)).unwrap();
        assert_eq!(json["message"], "Extracted 2 test cases");
        assert_eq!(json["output"][0][0], "4 2 7 11 15 9");
        assert_eq!(json["output"][1][1], "1 2\n3 4");
        assert_eq!(json["output"].as_array().unwrap().len(), 2);
    }
}
