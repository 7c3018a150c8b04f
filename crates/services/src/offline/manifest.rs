use url::Url;

use crate::error::InstallError;

/// Cache generation shipped with the current asset set.
pub const DEFAULT_CACHE_VERSION: &str = "artikel-drill-v2";

const DEFAULT_ASSETS: [&str; 8] = [
    "./",
    "./index.html",
    "./style.css",
    "./app.js",
    "./manifest.webmanifest",
    "./questions_masc.json",
    "./questions_fem.json",
    "./questions_neut.json",
];

/// Relative paths cached at install time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    paths: Vec<String>,
}

impl AssetManifest {
    #[must_use]
    pub fn new(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Resolve every entry against `scope`, which should end with `/`.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::InvalidUrl` for the first entry that cannot be joined.
    pub fn resolve(&self, scope: &Url) -> Result<Vec<(String, Url)>, InstallError> {
        self.paths
            .iter()
            .map(|path| {
                scope
                    .join(path)
                    .map(|url| (path.clone(), url))
                    .map_err(|source| InstallError::InvalidUrl {
                        path: path.clone(),
                        source,
                    })
            })
            .collect()
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::new(DEFAULT_ASSETS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_scope() {
        let scope = Url::parse("https://drill.test/app/").unwrap();
        let resolved = AssetManifest::new(["./", "./questions_fem.json"])
            .resolve(&scope)
            .unwrap();

        assert_eq!(resolved[0].1.as_str(), "https://drill.test/app/");
        assert_eq!(
            resolved[1].1.as_str(),
            "https://drill.test/app/questions_fem.json"
        );
    }

    #[test]
    fn default_manifest_lists_shell_and_banks() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.len(), 8);
        assert!(manifest.paths().iter().any(|p| p == "./questions_neut.json"));
    }
}
