// Content hash types reported by upstream registries

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Hash algorithm types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub fn prefix(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Length of the hex digest in characters
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Normalize an upstream digest to lowercase hex.
///
/// Returns `None` for blank values and for anything that is not a hex
/// digest of the right length.
pub fn normalize_hash(raw: &str, algorithm: HashAlgorithm) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    match hex::decode(&lower) {
        Ok(bytes) if bytes.len() * 2 == algorithm.hex_len() => Some(lower),
        _ => {
            warn!("Ignoring malformed {} digest '{}'", algorithm, trimmed);
            None
        }
    }
}

/// Collect the digests an upstream reported into an artifact hash map,
/// skipping absent and malformed ones.
pub fn collect_hashes<'a>(
    digests: impl IntoIterator<Item = (HashAlgorithm, Option<&'a str>)>,
) -> BTreeMap<HashAlgorithm, String> {
    digests
        .into_iter()
        .filter_map(|(algorithm, raw)| {
            raw.and_then(|r| normalize_hash(r, algorithm))
                .map(|h| (algorithm, h))
        })
        .collect()
}
