use std::fs;
use std::path::{Path, PathBuf};

/// Modules that must stay pure: no I/O, no clock, no global mutable state
const PURE_ROOTS: &[&str] = &[
    "src/decision",
    "src/sports",
    "src/pricing.rs",
    "src/calculations.rs",
];

const FORBIDDEN: &[&str] = &[
    "std::fs",
    "std::net",
    "std::env",
    "tokio",
    "reqwest",
    "static mut",
    "Utc::now",
    "SystemTime::now",
    "rand::",
];

fn collect_rust_files(root: &Path, out: &mut Vec<PathBuf>) {
    if root.is_file() {
        out.push(root.to_path_buf());
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out);
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

#[test]
fn decision_core_performs_no_io() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    for root in PURE_ROOTS {
        collect_rust_files(&repo_root.join(root), &mut files);
    }
    assert!(!files.is_empty(), "no sources found under {PURE_ROOTS:?}");

    let mut offenders = Vec::new();
    for file in files {
        let rel = file
            .strip_prefix(repo_root)
            .unwrap_or(&file)
            .to_string_lossy()
            .replace('\\', "/");
        let content = fs::read_to_string(&file).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            // unit tests may build fixtures however they like
            if trimmed.starts_with("#[cfg(test)]") {
                break;
            }
            if trimmed.starts_with("//") {
                continue;
            }
            if let Some(token) = FORBIDDEN.iter().find(|t| trimmed.contains(*t)) {
                offenders.push(format!("{rel}:{}: `{token}` in {}", idx + 1, trimmed));
            }
        }
    }

    assert!(
        offenders.is_empty(),
        "impure call detected in the decision core:\n{}",
        offenders.join("\n")
    );
}
