use xxhash_rust::xxh3::xxh3_64;

/// Stable 64-bit content hash used for artifact fingerprints.
///
/// xxh3 output is fixed across platforms and releases, so fingerprints
/// written into manifests stay comparable between runs.
#[must_use]
pub fn stable_hash(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

/// Lower-case hex rendering of [`stable_hash`], zero-padded to 16 chars.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:016x}", stable_hash(bytes))
}

///
/// TESTS
///
