//! TL-005: Document stream emission — YAML, JSON, and BLAKE3 digests.

use super::types::Manifest;

/// Serialize manifests as a multi-document YAML stream, documents joined
/// with the conventional `---` separator.
pub fn to_yaml_stream(manifests: &[Manifest]) -> Result<String, String> {
    let mut docs = Vec::with_capacity(manifests.len());
    for manifest in manifests {
        docs.push(
            serde_yaml_ng::to_string(manifest).map_err(|e| format!("YAML serialize error: {}", e))?,
        );
    }
    Ok(docs.join("---\n"))
}

/// Serialize manifests as a stream of pretty-printed JSON documents.
pub fn to_json_stream(manifests: &[Manifest]) -> Result<String, String> {
    let mut docs = Vec::with_capacity(manifests.len());
    for manifest in manifests {
        docs.push(
            serde_json::to_string_pretty(manifest)
                .map_err(|e| format!("JSON serialize error: {}", e))?,
        );
    }
    let mut stream = docs.join("\n");
    stream.push('\n');
    Ok(stream)
}

/// Content digest of a rendered stream. Returns `"blake3:{hex}"`.
pub fn stream_digest(stream: &str) -> String {
    format!("blake3:{}", blake3::hash(stream.as_bytes()).to_hex())
}
