use super::spec::FluxFiles;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid flux file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub fn has_wildcard(name: &str) -> bool {
    name.contains(['*', '?'])
}

/// Turns a shell-style wildcard into an anchored regular expression.
fn glob_to_regex(glob: &str) -> String {
    let mut re = String::with_capacity(glob.len() + 8);
    re.push('^');
    for c in glob.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    re
}

/// Finds `name` in the first directory of `dirs` that contains it.
///
/// Absolute paths are returned as-is when they exist.
pub fn find_file(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    dirs.iter()
        .map(|dir| dir.join(candidate))
        .find(|path| path.is_file())
}

/// Resolves a wildcard pattern against an ordered list of search directories.
///
/// The wildcard may only appear in the file-name part. The directory with the most matching
/// files wins; ties go to the directory listed first. An empty directory list searches the
/// working directory.
pub fn find_flux_path(dirs: &[PathBuf], pattern: &str) -> Result<FluxFiles, SearchError> {
    let pattern_path = Path::new(pattern);
    let file_glob = pattern_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sub_dir = pattern_path.parent().unwrap_or(Path::new(""));
    let re = Regex::new(&glob_to_regex(&file_glob)).map_err(|source| {
        SearchError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })?;

    let roots: Vec<PathBuf> = if dirs.is_empty() {
        vec![PathBuf::new()]
    } else {
        dirs.to_vec()
    };

    let mut best: Option<(PathBuf, Vec<PathBuf>)> = None;
    let mut total = 0usize;
    let mut populated = 0usize;
    for root in &roots {
        let dir = root.join(sub_dir);
        let listing = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir.as_path()
        };
        let Ok(entries) = fs::read_dir(listing) else {
            debug!(dir = %listing.display(), "Skipping unreadable search directory");
            continue;
        };
        let mut matches: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .filter(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name == file_glob || re.is_match(&name)
            })
            .map(|e| dir.join(e.file_name()))
            .collect();
        matches.sort();
        if matches.is_empty() {
            continue;
        }
        total += matches.len();
        populated += 1;
        debug!(count = matches.len(), dir = %dir.display(), "Flux files found");
        if best.as_ref().is_none_or(|(_, m)| matches.len() > m.len()) {
            best = Some((dir.join(&file_glob), matches));
        }
    }

    if populated > 1 {
        info!(
            total,
            paths = populated,
            "Flux files found in more than one search path; using the fullest"
        );
    }

    Ok(match best {
        Some((pattern, matches)) => FluxFiles::Pattern { pattern, matches },
        None => FluxFiles::Pattern {
            pattern: PathBuf::from(pattern),
            matches: Vec::new(),
        },
    })
}

/// Resolves the configured flux file entries.
///
/// A single entry with a wildcard is a pattern search; anything else is an explicit list of
/// files looked up one by one. Entries that cannot be found are dropped.
pub fn resolve_flux_files(dirs: &[PathBuf], entries: &[String]) -> Result<FluxFiles, SearchError> {
    if let [single] = entries {
        if has_wildcard(single) {
            return find_flux_path(dirs, single);
        }
    }

    let mut files = BTreeSet::new();
    for (i, entry) in entries.iter().enumerate() {
        match find_file(dirs, entry) {
            Some(found) => {
                debug!(index = i, entry, found = %found.display(), "Flux file resolved");
                files.insert(found);
            }
            None if Path::new(entry).is_absolute() => {
                files.insert(PathBuf::from(entry));
            }
            None => debug!(index = i, entry, "Flux file not found on search path"),
        }
    }
    Ok(FluxFiles::Explicit(files))
}
