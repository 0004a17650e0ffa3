// src/watch/hash.rs

use std::fmt;
use std::io::Read;
use std::path::Path;

use rand::RngCore;
use tracing::trace;

use crate::errors::{ReloadwatchError, Result};
use crate::fs::FileSystem;
use crate::watch::digest::HashAlgorithm;

/// Random bytes prefixed to every file before hashing.
///
/// One salt is generated per watcher and lives as long as that watcher. It is
/// never persisted, so digests from one process are not comparable with
/// digests from another one (or from another watcher in the same process).
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Generate `algorithm.block_size()` bytes from the thread-local CSPRNG
    /// (seeded from the OS).
    pub fn generate(algorithm: HashAlgorithm) -> Self {
        let mut bytes = vec![0u8; algorithm.block_size()];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Keep salt bytes out of logs.
impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({} bytes)", self.0.len())
    }
}

/// Hex digest of `salt || contents of path`.
///
/// The file is streamed in 8 KiB chunks. Open and read failures both map to
/// [`ReloadwatchError::FileUnreadable`]; a file deleted between notification
/// and re-read ends up here too.
pub fn compute_salted_hash(
    fs: &dyn FileSystem,
    path: &Path,
    algorithm: HashAlgorithm,
    salt: &Salt,
) -> Result<String> {
    let unreadable = |source| ReloadwatchError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs.open_read(path).map_err(unreadable)?;

    let mut digester = algorithm.digester();
    digester.update(salt.as_bytes());

    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(unreadable)?;
        if n == 0 {
            break;
        }
        digester.update(&buf[..n]);
    }

    let hash = hex::encode(digester.finalize());
    trace!(?path, %algorithm, hash = %hash, "hashed file");
    Ok(hash)
}
