use crate::{Error, Result};
use ethers::types::Bytes;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Deployment bytecode of one implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bytecode {
    pub name: String,
    pub code: Bytes,
}

/// Directory holding one hex-encoded bytecode file per implementation.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read the artifact for `name`, ignoring surrounding whitespace and an optional
    /// `0x` prefix.
    pub fn load(&self, name: &str) -> Result<Bytecode> {
        let path = self.path(name);
        let contents = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let trimmed = contents.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(Error::InvalidArtifact {
                path,
                reason: "empty bytecode".to_string(),
            });
        }
        let code = hex::decode(digits).map_err(|err| Error::InvalidArtifact {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        debug!(name, path = %path.display(), bytes = code.len(), "loaded artifact");
        Ok(Bytecode {
            name: name.to_string(),
            code: code.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(name: &str, contents: &str) -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(name), contents).unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_load_trims_whitespace() {
        let (_dir, store) = store_with("sha1_lll.hex", "  6080604052\n\n");
        let bytecode = store.load("sha1_lll.hex").unwrap();
        assert_eq!(bytecode.name, "sha1_lll.hex");
        assert_eq!(bytecode.code.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_load_accepts_prefix() {
        let (_dir, store) = store_with("sha1_sol.hex", "0x600a\r\n");
        let bytecode = store.load("sha1_sol.hex").unwrap();
        assert_eq!(bytecode.code.to_vec(), vec![0x60, 0x0a]);
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.load("sha1_lll_opt.hex").unwrap_err();
        let Error::Io { path, source } = err else {
            panic!("expected Io error, got {err:?}");
        };
        assert_eq!(path, dir.path().join("sha1_lll_opt.hex"));
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_load_rejects_empty_artifact() {
        let (_dir, store) = store_with("sha1_sol_opt.hex", "\n  \n");
        let err = store.load("sha1_sol_opt.hex").unwrap_err();
        assert!(err.to_string().ends_with("empty bytecode"), "unexpected error: {err}");
    }

    #[test]
    fn test_load_rejects_non_hex() {
        let (_dir, store) = store_with("broken.hex", "60zz");
        let err = store.load("broken.hex").unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact { .. }));

        let (_dir, store) = store_with("odd.hex", "608");
        assert!(matches!(
            store.load("odd.hex"),
            Err(Error::InvalidArtifact { .. })
        ));
    }
}
