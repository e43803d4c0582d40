use super::config::EnvironmentSettings;
use crate::core::flux::search::find_file;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Spline file '{name}' not found along the search path {search_path:?}")]
    SplineNotFound {
        name: String,
        search_path: Vec<String>,
    },
}

/// Environment settings as seen by the event source.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEnvironment {
    pub seed: u64,
    /// Directories searched for configuration files, in order.
    pub xml_search_path: Vec<PathBuf>,
    pub spline_file: Option<PathBuf>,
    pub extra: BTreeMap<String, String>,
}

impl ResolvedEnvironment {
    /// Resolves `settings`; `extra_dirs` are appended to the configured XML search path.
    ///
    /// A spline file that cannot be found along the search path is an error.
    pub fn resolve(settings: &EnvironmentSettings, extra_dirs: &[PathBuf]) -> Result<Self, EnvironmentError> {
        let seed = settings.seed.unwrap_or_else(rand::random::<u64>);

        let mut xml_search_path: Vec<PathBuf> = settings
            .xml_path
            .iter()
            .flat_map(|path| path.split(':'))
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| PathBuf::from(dir.trim()))
            .collect();
        xml_search_path.extend(extra_dirs.iter().cloned());

        let spline_file = match &settings.spline_file {
            Some(name) => Some(find_file(&xml_search_path, name).ok_or_else(|| {
                EnvironmentError::SplineNotFound {
                    name: name.clone(),
                    search_path: xml_search_path
                        .iter()
                        .map(|p| p.to_string_lossy().to_string())
                        .collect(),
                }
            })?),
            None => None,
        };

        info!(seed, "Random seed for the event source");
        debug!(path = ?xml_search_path, spline = ?spline_file, "Event source search path");
        Ok(Self {
            seed,
            xml_search_path,
            spline_file,
            extra: settings.extra.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_seed_is_kept_and_search_path_is_ordered() {
        let settings = EnvironmentSettings {
            seed: Some(1234),
            xml_path: Some("/opt/a:/opt/b".to_string()),
            ..Default::default()
        };
        let env = ResolvedEnvironment::resolve(&settings, &[PathBuf::from("/opt/c")]).unwrap();
        assert_eq!(env.seed, 1234);
        assert_eq!(
            env.xml_search_path,
            vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b"), PathBuf::from("/opt/c")]
        );
        assert_eq!(env.spline_file, None);
    }

    #[test]
    fn spline_is_found_along_search_path() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(second.path().join("xsec.xml"), "<xsec/>").unwrap();

        let settings = EnvironmentSettings {
            seed: Some(1),
            xml_path: Some(first.path().to_string_lossy().to_string()),
            spline_file: Some("xsec.xml".to_string()),
            ..Default::default()
        };
        let env = ResolvedEnvironment::resolve(&settings, &[second.path().to_path_buf()]).unwrap();
        assert_eq!(env.spline_file, Some(second.path().join("xsec.xml")));
    }

    #[test]
    fn missing_spline_is_an_error() {
        let dir = TempDir::new().unwrap();
        let settings = EnvironmentSettings {
            seed: Some(1),
            spline_file: Some("missing.xml".to_string()),
            ..Default::default()
        };
        let err = ResolvedEnvironment::resolve(&settings, &[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, EnvironmentError::SplineNotFound { .. }));
    }
}
