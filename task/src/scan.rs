use std::path::{Path, PathBuf};

use anyhow::Result;
use glob::Pattern;

use doxyfile::ConfigMap;
use util::PathEncodingError;

use crate::Error;

/// File patterns applied when the config document declares none.
const DEFAULT_FILE_PATTERNS: &[&str] = &[
    "*.c", "*.cc", "*.cxx", "*.cpp", "*.c++", "*.java", "*.ii", "*.ixx", "*.ipp", "*.i++",
    "*.inl", "*.h", "*.hh", "*.hxx", "*.hpp", "*.h++", "*.idl", "*.odl", "*.cs", "*.php",
    "*.php3", "*.inc", "*.m", "*.mm", "*.py", "*.f90",
];

/// Expand the initial input roots into the concrete, ordered list of
/// input files used for dependency scanning.
///
/// Directory roots are expanded with the `FILE_PATTERNS` /
/// `EXCLUDE_PATTERNS` globs from the config (descending into
/// subdirectories when `RECURSIVE = YES`); roots that are plain files
/// are taken verbatim, with no pattern filtering. Ordering follows glob
/// expansion order and duplicates are kept.
pub(crate) fn scan(pars: &ConfigMap, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let excludes = patterns_of(pars.get("EXCLUDE_PATTERNS").unwrap_or(""))?;

    let mut file_patterns: Vec<String> = pars
        .get("FILE_PATTERNS")
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    if file_patterns.is_empty() {
        file_patterns = DEFAULT_FILE_PATTERNS.iter().map(|p| (*p).to_owned()).collect();
    }
    if pars.get("RECURSIVE") == Some("YES") {
        for pattern in &mut file_patterns {
            pattern.insert_str(0, "**/");
        }
    }

    let mut files = Vec::new();
    for root in roots {
        if root.is_dir() {
            expand_dir(root, &file_patterns, &excludes, &mut files)?;
        } else {
            files.push(root.clone());
        }
    }
    Ok(files)
}

fn expand_dir(
    dir: &Path,
    file_patterns: &[String],
    excludes: &[Pattern],
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let dir = Pattern::escape(dir.to_str().ok_or(PathEncodingError)?);
    for pattern in file_patterns {
        let full = format!("{dir}/{pattern}");
        let paths = glob::glob(&full)
            .map_err(|e| Error::BadPattern(pattern.clone(), e))?;
        for path in paths {
            let path = path?;
            if !path.is_file() {
                continue;
            }
            if is_excluded(&path, excludes) {
                continue;
            }
            files.push(path);
        }
    }
    Ok(())
}

/// Exclude patterns match anywhere in the candidate path; `*` is allowed
/// to cross directory separators.
fn is_excluded(path: &Path, excludes: &[Pattern]) -> bool {
    path.to_str()
        .is_some_and(|s| excludes.iter().any(|p| p.matches(s)))
}

fn patterns_of(text: &str) -> Result<Vec<Pattern>> {
    text.split_whitespace()
        .map(|p| Ok(Pattern::new(p).map_err(|e| Error::BadPattern(p.to_owned(), e))?))
        .collect()
}
