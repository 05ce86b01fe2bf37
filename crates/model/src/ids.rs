//! Deterministic short identifiers from canonical URLs.

/// Length of the identifier window taken from the digest's hex form.
const ID_LEN: usize = 16;

/// Derive a short, stable identifier from a canonical URL.
///
/// Hashes the URL with BLAKE3 and takes a 16-character window of the hex
/// digest, starting at an offset given by the digest's own leading nibble
/// (0..=15) so the id isn't always the digest's head. The offset carries no
/// security weight; collision resistance comes from the underlying digest.
///
/// Same URL in, same id out — across restarts and processes — which is what
/// lets working variants carry ids before they are ever persisted.
///
/// ```
/// use droidmirror_model::short_hash;
///
/// let id = short_hash("https://catalog.example/app/org.example.app/");
/// assert_eq!(id.len(), 16);
/// assert_eq!(id, short_hash("https://catalog.example/app/org.example.app/"));
/// ```
pub fn short_hash(url: &str) -> String {
    let hex = blake3::hash(url.as_bytes()).to_hex().to_string();
    // The leading nibble of a hex digest always parses; 15 + 16 stays well
    // within the 64-character BLAKE3 hex form.
    let offset = usize::from_str_radix(&hex[..1], 16).unwrap_or(0);
    hex[offset..offset + ID_LEN].to_string()
}
