//! Whole-file content hasher.
//!
//! # Overview
//! This module provides the [`Hasher`] struct, which streams a file's entire
//! content through a fixed buffer and encodes its digest as a lowercase hex
//! [`Fingerprint`]. Identical bytes always produce identical fingerprints,
//! independent of file name, location or timestamps.
//!
//! The [`FileHasher`] trait is the seam the [`Scanner`](super::Scanner)
//! hashes through, so callers may substitute their own implementation.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::FileReadError;

/// Content digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5, 128-bit digest (32 hex characters)
    #[default]
    Md5,
    /// SHA-256, 256-bit digest (64 hex characters)
    Sha256,
    /// BLAKE3, 256-bit digest (64 hex characters)
    Blake3,
}

impl HashAlgorithm {
    /// Length of the hex-encoded digest.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 | Self::Blake3 => 64,
        }
    }

    /// Digest `content` and hex-encode the result.
    #[must_use]
    pub fn digest(self, content: &[u8]) -> Fingerprint {
        match self {
            Self::Md5 => Fingerprint(format!("{:x}", Md5::digest(content))),
            Self::Sha256 => Fingerprint(format!("{:x}", Sha256::digest(content))),
            Self::Blake3 => Fingerprint(blake3::hash(content).to_hex().to_string()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// Lowercase hex encoding of a content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse an existing hex digest. Returns `None` unless the input is a
    /// non-empty, even-length string of hex digits.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = !hex.is_empty()
            && hex.len() % 2 == 0
            && hex.chars().all(|c| c.is_ascii_hexdigit());
        valid.then(|| Self(hex.to_ascii_lowercase()))
    }

    /// The hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters, for compact display.
    #[must_use]
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the fingerprint of a single file.
///
/// Implementations must be deterministic over file content and must not
/// touch shared state; the concurrent strategy calls them from many threads.
pub trait FileHasher: Send + Sync {
    /// Fingerprint the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FileReadError`] if the file cannot be opened or fully read.
    fn fingerprint(&self, path: &Path) -> Result<(Fingerprint, u64), FileReadError>;
}

/// Default [`FileHasher`]: streams the file through the configured digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
}

impl Hasher {
    /// Create an MD5 hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash a file's full content.
    ///
    /// # Errors
    ///
    /// Returns [`FileReadError`] carrying the path and the I/O cause when
    /// the file cannot be read (permissions, deletion mid-scan, I/O error).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupclean::scanner::Hasher;
    /// use std::path::Path;
    ///
    /// let hasher = Hasher::new();
    /// let fingerprint = hasher.hash(Path::new("notes.txt")).unwrap();
    /// assert_eq!(fingerprint.as_str().len(), 32);
    /// ```
    pub fn hash(&self, path: &Path) -> Result<Fingerprint, FileReadError> {
        self.fingerprint(path).map(|(fingerprint, _)| fingerprint)
    }
}

/// Read buffer size for streaming.
const BUFFER_SIZE: usize = 64 * 1024;

/// Incremental digest state for one file.
enum DigestState {
    Md5(Md5),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Self::Md5(Md5::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(h) => h.update(chunk),
            Self::Sha256(h) => h.update(chunk),
            Self::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finish(self) -> Fingerprint {
        match self {
            Self::Md5(h) => Fingerprint(format!("{:x}", h.finalize())),
            Self::Sha256(h) => Fingerprint(format!("{:x}", h.finalize())),
            Self::Blake3(h) => Fingerprint(h.finalize().to_hex().to_string()),
        }
    }
}

impl Hasher {
    fn stream(&self, path: &Path) -> io::Result<(Fingerprint, u64)> {
        let mut file = File::open(path)?;
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut total: u64 = 0;

        loop {
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&buffer[..n]);
            total += n as u64;
        }

        Ok((state.finish(), total))
    }
}

impl FileHasher for Hasher {
    fn fingerprint(&self, path: &Path) -> Result<(Fingerprint, u64), FileReadError> {
        let (fingerprint, bytes) = self.stream(path).map_err(|e| FileReadError::new(path, e))?;
        log::trace!("Hashed {} ({} bytes)", path.display(), bytes);
        Ok((fingerprint, bytes))
    }
}
