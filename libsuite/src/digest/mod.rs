//! OCI Content Digest validation and manipulation.
//!
//! This module provides a wrapper around the `oci_spec::image::Digest` type
//! to integrate with the suite's error handling and to verify downloaded
//! content against its address.

use crate::error::{Result, SuiteError};
use oci_spec::image::Digest as OciDigest;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;


/// Represents a content digest, wrapping the `oci_spec::image::Digest` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl Digest {
    /// Computes the sha256 digest of `bytes`.
    pub fn sha256_of(bytes: &[u8]) -> Result<Self> {
        Self::from_str(&format!("sha256:{}", sha256_hex(bytes)))
    }

    /// Returns the algorithm part of the digest (e.g. `sha256`).
    pub fn algorithm(&self) -> String {
        self.split().0
    }

    /// Returns the encoded (hex) part of the digest.
    pub fn hex(&self) -> String {
        self.split().1
    }

    fn split(&self) -> (String, String) {
        let s = self.0.to_string();
        match s.split_once(':') {
            Some((alg, hex)) => (alg.to_string(), hex.to_string()),
            None => (String::new(), s),
        }
    }

    /// Returns true if this digest can be checked locally.
    pub fn is_verifiable(&self) -> bool {
        self.algorithm() == "sha256"
    }

    /// Checks that `bytes` hash to this digest.
    ///
    /// Only sha256 content is hashed. Digests using other algorithms are
    /// accepted as-is.
    pub fn verify(&self, bytes: &[u8]) -> Result<()> {
        if !self.is_verifiable() {
            return Ok(());
        }

        let computed = sha256_hex(bytes);
        if computed != self.hex() {
            return Err(SuiteError::validation(format!(
                "Blob digest mismatch: expected {}, computed sha256:{}",
                self, computed
            )));
        }
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

impl FromStr for Digest {
    type Err = SuiteError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| SuiteError::Validation {
            message: format!("Invalid digest format: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
