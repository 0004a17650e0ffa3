// src/watch/digest.rs

//! Hash algorithm selection.
//!
//! The supported set is closed on purpose: every algorithm is a variant of
//! [`HashAlgorithm`], and parsing anything else fails with
//! [`ReloadwatchError::UnsupportedAlgorithm`].

use std::fmt;
use std::str::FromStr;

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::errors::ReloadwatchError;

/// Digest algorithms a watcher may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    Sha1,
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    /// Internal block size in bytes. This is also the salt length.
    pub const fn block_size(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 64,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Blake3 => blake3::BLOCK_LEN,
        }
    }

    /// Length of the finalized digest in bytes.
    pub const fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Blake3 => blake3::OUT_LEN,
        }
    }

    /// Fresh streaming digest for this algorithm.
    pub fn digester(self) -> Digester {
        match self {
            HashAlgorithm::Sha1 => Digester::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Digester::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => Digester::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ReloadwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            _ => Err(ReloadwatchError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Streaming digest state.
pub enum Digester {
    Sha1(Sha1),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Digester {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Digester::Sha1(h) => h.update(data),
            Digester::Sha256(h) => h.update(data),
            Digester::Blake3(h) => {
                h.update(data);
            }
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            Digester::Sha1(h) => h.finalize().to_vec(),
            Digester::Sha256(h) => h.finalize().to_vec(),
            Digester::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for Digester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Digester::Sha1(_) => "sha1",
            Digester::Sha256(_) => "sha256",
            Digester::Blake3(_) => "blake3",
        };
        f.debug_tuple("Digester").field(&name).finish()
    }
}
