use super::driver::FluxError;
use serde::de::DeserializeOwned;
use std::path::Path;

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Reads every row of a CSV flux table. Lines starting with `#` are skipped.
pub fn read_rows<T: DeserializeOwned>(path: &Path, has_headers: bool) -> Result<Vec<T>, FluxError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| FluxError::Csv {
            path: path_string(path),
            source: e,
        })?;

    reader
        .deserialize::<T>()
        .map(|row| {
            row.map_err(|e| FluxError::Csv {
                path: path_string(path),
                source: e,
            })
        })
        .collect()
}

/// Parses the `#`-prefixed header lines of a flux table as TOML metadata.
pub fn read_header<T: DeserializeOwned + Default>(path: &Path) -> Result<T, FluxError> {
    let content = std::fs::read_to_string(path).map_err(|e| FluxError::Io {
        path: path_string(path),
        source: e,
    })?;
    let header: String = content
        .lines()
        .map_while(|line| line.trim_start().strip_prefix('#'))
        .map(|line| format!("{}\n", line.trim()))
        .collect();
    if header.trim().is_empty() {
        return Ok(T::default());
    }
    toml::from_str(&header).map_err(|e| FluxError::Toml {
        path: path_string(path),
        source: e,
    })
}
