use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// An opaque content-derived identity, used for change detection and
/// for stamping discovered outputs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 32]);

#[derive(Debug, thiserror::Error)]
#[error("Could not read {path:?} while computing its signature")]
pub struct SigError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

impl Signature {
    /// Compute the signature of a file's contents.
    ///
    /// Once a file has been declared an input or output its contents are
    /// expected to stay readable, so callers treat this error as fatal.
    pub fn of_file(path: &Path) -> Result<Self, SigError> {
        let mut hasher = blake3::Hasher::new();
        File::open(path)
            .and_then(|file| hasher.update_reader(file).map(drop))
            .map_err(|source| SigError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self(hasher.finalize().into()))
    }

    fn to_hex(self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut acc = Vec::with_capacity(64);
        for &byte in &self.0 {
            acc.push(HEX[(byte >> 4) as usize]);
            acc.push(HEX[(byte & 0xf) as usize]);
        }
        String::from_utf8(acc).unwrap()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// Accumulates the identity of a task: the tool that will run, its
/// flags, and the signature of every declared input, in order.
pub struct SigWriter(blake3::Hasher);

impl SigWriter {
    pub fn new() -> Self {
        Self(blake3::Hasher::new())
    }

    pub fn write_str(&mut self, s: &str) {
        self.0.update(s.as_bytes());
        // separator so adjacent strings can't collide by concatenation
        self.0.update(&[0]);
    }

    pub fn write_sig(&mut self, sig: &Signature) {
        self.0.update(&sig.0);
    }

    pub fn finish(self) -> Signature {
        Signature(self.0.finalize().into())
    }
}

impl Default for SigWriter {
    fn default() -> Self {
        Self::new()
    }
}
