//! Artifact location and staging
//!
//! Build outputs are located by filename pattern (`dist/*.whl`) the way
//! the classic wheel-install step does, and report directories are
//! persisted by copying them into a per-cell directory under the
//! artifacts root.

use crate::workflow::WorkflowError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Locates files matching a wildcard pattern relative to `base`.
///
/// Only the final path component may carry wildcards (`*` and `?`),
/// which is all the wheel-locating contract needs. Matches are returned
/// in lexical order so repeated runs are deterministic.
///
/// # Errors
///
/// Returns [`WorkflowError::ArtifactNotFound`] when nothing matches and
/// [`WorkflowError::Io`] when the directory cannot be read.
pub fn locate(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, WorkflowError> {
    let full = base.join(pattern);
    let dir = full.parent().map(Path::to_path_buf).unwrap_or_default();
    let file_pattern = full
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let matcher = wildcard_regex(&file_pattern);

    let mut matches = Vec::new();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => {
            // A missing directory means nothing was built.
            return Err(WorkflowError::ArtifactNotFound {
                pattern: pattern.to_string(),
            });
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| WorkflowError::Io(e.to_string()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if matcher.is_match(&name) {
            matches.push(entry.path());
        }
    }

    if matches.is_empty() {
        return Err(WorkflowError::ArtifactNotFound {
            pattern: pattern.to_string(),
        });
    }

    matches.sort();
    Ok(matches)
}

/// Copies a file or directory tree into `<artifacts_root>/<name>/`.
///
/// The artifact name is the per-cell name from the upload step, so two
/// matrix cells never collide. Returns the staged artifact directory.
///
/// # Errors
///
/// Returns [`WorkflowError::ArtifactNotFound`] when the source path does
/// not exist and [`WorkflowError::Io`] on copy failures.
pub fn stage(artifacts_root: &Path, name: &str, source: &Path) -> Result<PathBuf, WorkflowError> {
    if !source.exists() {
        return Err(WorkflowError::ArtifactNotFound {
            pattern: source.to_string_lossy().to_string(),
        });
    }

    let dest = artifacts_root.join(name);
    fs::create_dir_all(&dest).map_err(|e| WorkflowError::Io(e.to_string()))?;

    if source.is_dir() {
        copy_tree(source, &dest)?;
    } else {
        let file_name = source
            .file_name()
            .ok_or_else(|| WorkflowError::Io(format!("Invalid source path: {}", source.display())))?;
        fs::copy(source, dest.join(file_name)).map_err(|e| WorkflowError::Io(e.to_string()))?;
    }

    tracing::info!(artifact = %name, dest = %dest.display(), "Staged artifact");
    Ok(dest)
}

pub(crate) fn copy_tree(source: &Path, dest: &Path) -> Result<(), WorkflowError> {
    for entry in fs::read_dir(source).map_err(|e| WorkflowError::Io(e.to_string()))? {
        let entry = entry.map_err(|e| WorkflowError::Io(e.to_string()))?;
        let target = dest.join(entry.file_name());
        if entry.path().is_dir() {
            fs::create_dir_all(&target).map_err(|e| WorkflowError::Io(e.to_string()))?;
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| WorkflowError::Io(e.to_string()))?;
        }
    }
    Ok(())
}

fn wildcard_regex(pattern: &str) -> Regex {
    static METACHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.+^$()\[\]{}|\\]").unwrap());

    let escaped = METACHARS.replace_all(pattern, r"\$0");
    let translated = escaped.replace('*', ".*").replace('?', ".");
    // The pattern is built from a fixed alphabet, so this cannot fail.
    Regex::new(&format!("^{translated}$")).unwrap_or_else(|_| Regex::new("$^").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_locate_matches_wheel_pattern() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        fs::create_dir(&dist).unwrap();
        touch(&dist.join("pkg-1.0.0-py3-none-any.whl"));
        touch(&dist.join("pkg-1.0.0.tar.gz"));

        let matches = locate(tmp.path(), "dist/*.whl").unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].ends_with("pkg-1.0.0-py3-none-any.whl"));
    }

    #[test]
    fn test_locate_orders_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        fs::create_dir(&dist).unwrap();
        touch(&dist.join("b.whl"));
        touch(&dist.join("a.whl"));

        let matches = locate(tmp.path(), "dist/*.whl").unwrap();
        assert!(matches[0].ends_with("a.whl"));
        assert!(matches[1].ends_with("b.whl"));
    }

    #[test]
    fn test_locate_fails_when_nothing_matches() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("dist")).unwrap();
        let err = locate(tmp.path(), "dist/*.whl").unwrap_err();
        assert!(matches!(err, WorkflowError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_locate_fails_on_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = locate(tmp.path(), "dist/*.whl").unwrap_err();
        assert!(matches!(err, WorkflowError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_wildcard_does_not_match_dotted_extension_literally() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        fs::create_dir(&dist).unwrap();
        touch(&dist.join("pkgXwhl"));
        // '.' in the pattern is literal, not "any character"
        let err = locate(tmp.path(), "dist/pkg.whl").unwrap_err();
        assert!(matches!(err, WorkflowError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_stage_copies_report_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let reports = tmp.path().join("reports");
        fs::create_dir_all(reports.join("html")).unwrap();
        let mut f = File::create(reports.join("html").join("index.html")).unwrap();
        writeln!(f, "<html></html>").unwrap();

        let root = tmp.path().join("artifacts");
        let staged = stage(&root, "test-report-ubuntu-latest-3.11", &reports).unwrap();

        assert!(staged.ends_with("test-report-ubuntu-latest-3.11"));
        assert!(staged.join("html").join("index.html").exists());
    }

    #[test]
    fn test_stage_copies_single_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("junit.xml");
        touch(&file);

        let root = tmp.path().join("artifacts");
        let staged = stage(&root, "junit", &file).unwrap();
        assert!(staged.join("junit.xml").exists());
    }

    #[test]
    fn test_stage_missing_source_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = stage(
            tmp.path(),
            "report",
            &tmp.path().join("missing"),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::ArtifactNotFound { .. }));
    }
}
