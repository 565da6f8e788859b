use std::fs;
use std::path::{Path, PathBuf};

/// every rust source file under src/
fn source_files() -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    files
}

fn collect(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, files);
        } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            files.push(path);
        }
    }
}

/// (file, line number, line) for every line matching `check`
fn offending_lines(check: impl Fn(&str) -> bool) -> Vec<(String, usize, String)> {
    let mut found = Vec::new();
    for path in source_files() {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line_num, line) in content.lines().enumerate() {
            if check(line) {
                found.push((path.display().to_string(), line_num + 1, line.to_string()));
            }
        }
    }
    found
}

fn report(what: &str, found: &[(String, usize, String)]) {
    if found.is_empty() {
        return;
    }
    eprintln!("\nfound {} {}:", found.len(), what);
    for (file, line_num, line) in found {
        eprintln!("  {}:{}: {}", file, line_num, line.trim());
    }
    panic!("{what} must be removed before tests pass");
}

fn is_todo_in_comment(line: &str) -> bool {
    let line_upper = line.to_uppercase();

    // line comments and the start of block comments
    for marker in ["//", "/*"] {
        if let Some(pos) = line.find(marker)
            && line_upper[pos..].contains("TODO")
        {
            return true;
        }
    }

    // block comment continuation lines (e.g., " * TODO")
    let trimmed = line.trim_start();
    trimmed.starts_with('*') && !trimmed.starts_with("*/") && line_upper.contains("TODO")
}

#[test]
fn no_todo_comments() {
    report("TODO comment(s)", &offending_lines(is_todo_in_comment));
}

#[test]
fn no_debug_macros() {
    report(
        "dbg! call(s)",
        &offending_lines(|line| line.contains(concat!("dbg", "!("))),
    );
}

#[test]
fn output_goes_through_ui_macros() {
    // stdout/stderr writes belong in the colored ui macros
    let found = offending_lines(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with("println!(") || trimmed.starts_with("eprintln!(")
    });
    report("raw println!/eprintln! call(s)", &found);
}
