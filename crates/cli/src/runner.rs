//! Conformance suite runner.
//!
//! Convention:
//!   positive/  -- *.ml + *.env + *.expected.ml (no error expected)
//!   negative/  -- *.ml + *.env + *.expected-error.json (error expected)
//!
//! Inputs are rewritten with placeholders removed. A missing `.env` means an
//! empty environment.

use crate::tap::Tap;
use envcond_core::{ast, parse_source, rewrite_source, MapEnvironment, RewriteOptions};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct RunResult {
    pub failed: usize,
}

pub fn run_suite(suite_dir: &Path, quiet: bool) -> RunResult {
    let mut tap = Tap::new().failures_only(quiet);

    run_positive_dir(suite_dir, &mut tap);
    run_negative_dir(suite_dir, &mut tap);

    let failed = tap.failure_count();
    tap.finish();

    RunResult { failed }
}

fn options() -> RewriteOptions {
    RewriteOptions {
        keep_placeholders: false,
        ..RewriteOptions::default()
    }
}

fn run_positive_dir(suite_dir: &Path, tap: &mut Tap) {
    let dir = suite_dir.join("positive");
    if !dir.exists() {
        return;
    }
    for input in &glob_inputs(&dir) {
        let stem = stem(input);
        let expected_path = dir.join(format!("{}.expected.ml", stem));
        if !expected_path.exists() {
            tap.not_ok(
                format!("positive/{}", stem),
                format!("missing expected file: {}", expected_path.display()),
            );
            continue;
        }
        run_positive_test(input, &expected_path, &stem, tap);
    }
}

fn run_negative_dir(suite_dir: &Path, tap: &mut Tap) {
    let dir = suite_dir.join("negative");
    if !dir.exists() {
        return;
    }
    for input in &glob_inputs(&dir) {
        let stem = stem(input);
        let expected_path = dir.join(format!("{}.expected-error.json", stem));
        if !expected_path.exists() {
            tap.not_ok(
                format!("negative/{}", stem),
                format!("missing expected-error file: {}", expected_path.display()),
            );
            continue;
        }
        run_negative_test(input, &expected_path, &stem, tap);
    }
}

fn run_positive_test(input: &Path, expected_path: &Path, name: &str, tap: &mut Tap) {
    let test_name = format!("positive/{}", name);

    let (src, env) = match read_case(input) {
        Ok(case) => case,
        Err(e) => {
            tap.not_ok(&test_name, e);
            return;
        }
    };
    let expected = match read_text(expected_path)
        .and_then(|text| parse_source(&text, &file_name(expected_path)).map_err(|e| e.to_string()))
    {
        Ok(tree) => tree,
        Err(e) => {
            tap.not_ok(&test_name, format!("failed to read expected file: {}", e));
            return;
        }
    };

    match rewrite_source(&src, &file_name(input), &env, &options()) {
        Ok(got) => {
            if ast::without_locs(&got) == ast::without_locs(&expected) {
                tap.ok(&test_name);
            } else {
                let diff = format!(
                    "--- expected\n{}\n+++ got\n{}",
                    envcond_core::print_structure(&expected),
                    envcond_core::print_structure(&got)
                );
                tap.not_ok(&test_name, format!("output mismatch:\n{}", diff));
            }
        }
        Err(e) => {
            tap.not_ok(&test_name, format!("unexpected rewrite error: {}", e));
        }
    }
}

fn run_negative_test(input: &Path, expected_error_path: &Path, name: &str, tap: &mut Tap) {
    let test_name = format!("negative/{}", name);

    let expected_error = match read_json(expected_error_path) {
        Ok(v) => v,
        Err(e) => {
            tap.not_ok(
                &test_name,
                format!("failed to read expected-error file: {}", e),
            );
            return;
        }
    };
    let (src, env) = match read_case(input) {
        Ok(case) => case,
        Err(e) => {
            tap.not_ok(&test_name, e);
            return;
        }
    };

    match rewrite_source(&src, &file_name(input), &env, &options()) {
        Err(got_error) => {
            let got_json = got_error.to_json_value();
            if got_json == expected_error {
                tap.ok(&test_name);
            } else {
                let diff = json_diff(&expected_error, &got_json);
                tap.not_ok(&test_name, format!("error mismatch:\n{}", diff));
            }
        }
        Ok(_) => {
            tap.not_ok(&test_name, "expected a rewrite error but rewriting succeeded");
        }
    }
}

// -- Helpers --

fn glob_inputs(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            if name.ends_with(".ml") && !name.ends_with(".expected.ml") {
                results.push(path);
            }
        }
    }
    results.sort();
    results
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Source text plus the environment from the sibling `.env` file.
fn read_case(input: &Path) -> Result<(String, MapEnvironment), String> {
    let src = read_text(input)?;
    let env_path = input.with_extension("env");
    let env = if env_path.exists() {
        parse_env_file(&read_text(&env_path)?)
    } else {
        MapEnvironment::new()
    };
    Ok((src, env))
}

/// `KEY=VALUE` per line; blank lines and `#` comments are skipped, as are
/// lines without `=`.
fn parse_env_file(text: &str) -> MapEnvironment {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v))
        .collect()
}

fn read_text(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn read_json(path: &Path) -> Result<Value, String> {
    let src = read_text(path)?;
    serde_json::from_str(&src).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}

fn json_diff(expected: &Value, got: &Value) -> String {
    let exp_str = serde_json::to_string_pretty(expected).unwrap_or_default();
    let got_str = serde_json::to_string_pretty(got).unwrap_or_default();
    format!("--- expected\n{}\n+++ got\n{}", exp_str, got_str)
}
