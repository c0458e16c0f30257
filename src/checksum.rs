//! Schema fingerprints
//!
//! Fingerprints are taken over the Parsing Canonical Form, so two schemas
//! that differ only in docs, aliases, properties or defaults share them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::LazyLock;

use crate::schema::Schema;

const CRC64_EMPTY: u64 = 0xc15d_213a_a4d7_a795;

static CRC64_TABLE: LazyLock<[u64; 256]> = LazyLock::new(|| {
    let mut table = [0u64; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        let mut fp = i as u64;
        for _ in 0..8 {
            fp = (fp >> 1) ^ (CRC64_EMPTY & (fp & 1).wrapping_neg());
        }
        *slot = fp;
    }
    table
});

/// Fingerprints of one schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Hex SHA-256 of the canonical form
    pub sha256: String,
    /// CRC-64-AVRO of the canonical form
    pub rabin64: u64,
}

impl Fingerprint {
    pub fn of(schema: &Schema) -> Self {
        Self::from_canonical(&schema.canonical_form())
    }

    /// Fingerprint text that is already in canonical form
    pub fn from_canonical(canonical: &str) -> Self {
        Self {
            sha256: sha256_hex(canonical.as_bytes()),
            rabin64: rabin64(canonical.as_bytes()),
        }
    }

    /// Check a schema against this fingerprint
    pub fn verify(&self, schema: &Schema) -> bool {
        *self == Self::of(schema)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{} rabin64:{:016x}", self.sha256, self.rabin64)
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// 64-bit Rabin fingerprint (CRC-64-AVRO)
pub fn rabin64(data: &[u8]) -> u64 {
    data.iter().fold(CRC64_EMPTY, |fp, &byte| {
        (fp >> 8) ^ CRC64_TABLE[((fp ^ byte as u64) & 0xff) as usize]
    })
}
