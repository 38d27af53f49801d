//! Raw source text loading

use std::fs;

use crate::config::SourcesConfig;
use crate::error::{Error, Result};
use crate::sources::SourceKind;

/// Raw text of the three sources, loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    pub sync_rules: String,
    pub client_schema: String,
    pub backend_schema: String,
}

impl SourceSet {
    pub fn new(
        sync_rules: impl Into<String>,
        client_schema: impl Into<String>,
        backend_schema: impl Into<String>,
    ) -> Self {
        Self {
            sync_rules: sync_rules.into(),
            client_schema: client_schema.into(),
            backend_schema: backend_schema.into(),
        }
    }

    pub fn text(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::SyncRules => &self.sync_rules,
            SourceKind::ClientSchema => &self.client_schema,
            SourceKind::BackendSchema => &self.backend_schema,
        }
    }
}

/// Read all three sources; any unreadable file aborts the run
pub fn load_sources(config: &SourcesConfig) -> Result<SourceSet> {
    let read = |kind: SourceKind| -> Result<String> {
        let path = config.path_for(kind);
        tracing::debug!(source = %kind, path = %path.display(), "Reading source");
        fs::read_to_string(&path).map_err(|source| Error::SourceReadError {
            source_kind: kind,
            path,
            source,
        })
    };

    Ok(SourceSet {
        sync_rules: read(SourceKind::SyncRules)?,
        client_schema: read(SourceKind::ClientSchema)?,
        backend_schema: read(SourceKind::BackendSchema)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sources_in(dir: &std::path::Path) -> SourcesConfig {
        SourcesConfig {
            base_dir: dir.to_path_buf(),
            sync_rules: PathBuf::from("rules.yaml"),
            client_schema: PathBuf::from("schema.ts"),
            backend_schema: PathBuf::from("types.ts"),
        }
    }

    #[test]
    fn test_loads_all_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rules.yaml"), "rules").unwrap();
        fs::write(dir.path().join("schema.ts"), "client").unwrap();
        fs::write(dir.path().join("types.ts"), "backend").unwrap();

        let set = load_sources(&sources_in(dir.path())).unwrap();
        assert_eq!(set, SourceSet::new("rules", "client", "backend"));
        assert_eq!(set.text(SourceKind::ClientSchema), "client");
    }

    #[test]
    fn test_missing_source_names_the_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rules.yaml"), "rules").unwrap();

        match load_sources(&sources_in(dir.path())) {
            Err(Error::SourceReadError { source_kind, path, .. }) => {
                assert_eq!(source_kind, SourceKind::ClientSchema);
                assert!(path.ends_with("schema.ts"));
            }
            other => panic!("expected source read error, got {:?}", other),
        }
    }
}
