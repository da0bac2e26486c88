//! Record checker.
//!
//! Validates JSON-lines files of transaction records against the shape the
//! ingestion side expects. Every line is checked independently; a bad line
//! never stops the rest of the file from being checked.

use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::record::{declares_json, Header, TransactionRecord};

lazy_static! {
    static ref METHOD_RE: Regex = Regex::new(r"^[A-Z]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref UUID_RE: Regex = Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
    )
    .unwrap();
}

/// Extension of record files picked up when walking a directory.
pub const RECORD_EXTENSION: &str = "jsonl";

/// Rule names for record problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRule {
    MalformedRecord,
    InvalidMethod,
    InvalidStatus,
    EmptyHost,
    InvalidPath,
    EmptyHeaderName,
    InvalidJsonBody,
    InvalidEmail,
    InvalidUuid,
}

impl CheckRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckRule::MalformedRecord => "malformed_record",
            CheckRule::InvalidMethod => "invalid_method",
            CheckRule::InvalidStatus => "invalid_status",
            CheckRule::EmptyHost => "empty_host",
            CheckRule::InvalidPath => "invalid_path",
            CheckRule::EmptyHeaderName => "empty_header_name",
            CheckRule::InvalidJsonBody => "invalid_json_body",
            CheckRule::InvalidEmail => "invalid_email",
            CheckRule::InvalidUuid => "invalid_uuid",
        }
    }
}

impl std::fmt::Display for CheckRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A problem found in one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub rule: CheckRule,
    pub message: String,
    pub file: String,
    pub line: usize,
}

/// Results of checking one or more files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub issues: Vec<Issue>,
    /// Number of records read
    pub records: usize,
    /// Number of files read
    pub files: usize,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: CheckResult) {
        self.issues.extend(other.issues);
        self.records += other.records;
        self.files += other.files;
    }

    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a single record. Returns `(rule, message)` pairs.
pub fn check_record(record: &TransactionRecord) -> Vec<(CheckRule, String)> {
    let mut problems = Vec::new();
    let request = &record.request;
    let response = &record.response;

    if !METHOD_RE.is_match(&request.method) {
        problems.push((
            CheckRule::InvalidMethod,
            format!("method {:?} is not an upper-case token", request.method),
        ));
    }
    if !(100..=599).contains(&response.status) {
        problems.push((
            CheckRule::InvalidStatus,
            format!("status {} is outside 100..=599", response.status),
        ));
    }
    if request.url.host.trim().is_empty() {
        problems.push((CheckRule::EmptyHost, "request host is empty".to_string()));
    }
    if !request.url.path.starts_with('/') {
        problems.push((
            CheckRule::InvalidPath,
            format!("path {:?} does not start with '/'", request.url.path),
        ));
    }

    check_headers("request", &request.headers, &mut problems);
    check_headers("response", &response.headers, &mut problems);
    check_body("request", &request.headers, &request.body, &mut problems);
    check_body("response", &response.headers, &response.body, &mut problems);

    problems
}

fn check_headers(side: &str, headers: &[Header], problems: &mut Vec<(CheckRule, String)>) {
    for (i, header) in headers.iter().enumerate() {
        if header.name.trim().is_empty() {
            problems.push((
                CheckRule::EmptyHeaderName,
                format!("{} header #{} has an empty name", side, i),
            ));
        }
    }
}

fn check_body(side: &str, headers: &[Header], body: &str, problems: &mut Vec<(CheckRule, String)>) {
    if body.is_empty() {
        return;
    }

    // Bodies are inspected whenever they parse, but only required to parse
    // when the headers say JSON.
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            if declares_json(headers) {
                problems.push((
                    CheckRule::InvalidJsonBody,
                    format!("{} body is declared JSON but does not parse: {}", side, e),
                ));
            }
            return;
        }
    };

    check_fields(side, "", &value, problems);
}

fn check_fields(
    side: &str,
    prefix: &str,
    value: &serde_json::Value,
    problems: &mut Vec<(CheckRule, String)>,
) {
    let serde_json::Value::Object(map) = value else {
        return;
    };

    for (key, field) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        let lower = key.to_ascii_lowercase();

        match field {
            serde_json::Value::String(s) if lower.ends_with("email") => {
                if !EMAIL_RE.is_match(s) {
                    problems.push((
                        CheckRule::InvalidEmail,
                        format!("{} body field {} = {:?} is not an email", side, path, s),
                    ));
                }
            }
            serde_json::Value::String(s) if lower.ends_with("uuid") => {
                if !UUID_RE.is_match(s) {
                    problems.push((
                        CheckRule::InvalidUuid,
                        format!("{} body field {} = {:?} is not a uuid", side, path, s),
                    ));
                }
            }
            serde_json::Value::Object(_) => check_fields(side, &path, field, problems),
            _ => {}
        }
    }
}

/// Check every line of a reader. Blank lines are skipped.
pub fn check_reader<R: BufRead>(reader: R, file: &str) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::new();
    result.files = 1;

    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let issue = |rule, message| Issue {
            rule,
            message,
            file: file.to_string(),
            line: line_no,
        };

        let line = match String::from_utf8(bytes?) {
            Ok(line) => line,
            Err(e) => {
                result.records += 1;
                result
                    .issues
                    .push(issue(CheckRule::MalformedRecord, format!("line is not UTF-8: {}", e)));
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        result.records += 1;

        match parse_record(&line) {
            Ok((record, status)) => {
                let mut problems = check_record(&record);
                if let Some(status) = status {
                    problems.retain(|(rule, _)| *rule != CheckRule::InvalidStatus);
                    problems.insert(0, status);
                }
                for (rule, message) in problems {
                    result.issues.push(issue(rule, message));
                }
            }
            Err(e) => result
                .issues
                .push(issue(CheckRule::MalformedRecord, e.to_string())),
        }
    }

    Ok(result)
}

/// Parse one line into a record.
///
/// A numeric status that does not fit a `u16` is still a record with a bad
/// status, so it is reported as such and replaced before decoding.
fn parse_record(
    line: &str,
) -> Result<(TransactionRecord, Option<(CheckRule, String)>), serde_json::Error> {
    let mut value: serde_json::Value = serde_json::from_str(line)?;
    let mut status_problem = None;

    if let Some(status) = value.pointer_mut("/response/status") {
        let fits = status.as_u64().map_or(false, |n| u16::try_from(n).is_ok());
        if status.is_number() && !fits {
            status_problem = Some((
                CheckRule::InvalidStatus,
                format!("status {} is outside 100..=599", status),
            ));
            *status = serde_json::Value::from(0u16);
        }
    }

    let record = serde_json::from_value(value)?;
    Ok((record, status_problem))
}

/// Check a single file.
pub fn check_file(path: &Path) -> anyhow::Result<CheckResult> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open {}: {}", path.display(), e))?;
    check_reader(BufReader::new(file), &path.to_string_lossy())
}

/// Expand directories into the record files they contain, sorted by path.
pub fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Check many files in parallel. Issues keep file order.
pub fn check_files(files: &[PathBuf]) -> anyhow::Result<CheckResult> {
    let results: Vec<anyhow::Result<CheckResult>> =
        files.par_iter().map(|path| check_file(path)).collect();

    let mut combined = CheckResult::new();
    for result in results {
        combined.merge(result?);
    }
    Ok(combined)
}
