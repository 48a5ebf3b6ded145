use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

/// Integrity token for a canonical JSON string.
///
/// Sums UTF-16 code units (what a browser's `charCodeAt` sees), so records
/// written by the web client verify here too.
pub fn compute(canonical: &str) -> String {
    let sum: u64 = canonical.encode_utf16().map(u64::from).sum();
    BASE64.encode(sum.to_string())
}

/// Exact comparison. A missing or empty stored checksum predates checksums
/// and is accepted as unverifiable.
pub fn matches(canonical: &str, stored: Option<&str>) -> bool {
    match stored.filter(|s| !s.is_empty()) {
        None => true,
        Some(stored) => compute(canonical) == stored,
    }
}
