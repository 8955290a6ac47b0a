use base64::Engine;
use std::io;
use std::path::Path;
use tokio::fs;

/// Media type used when the extension is missing or unknown.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Read a file in full and encode it as a `data:<mime>;base64,<payload>` URI.
///
/// The media type is inferred from the path's extension.
pub async fn encode_file(path: &Path) -> io::Result<String> {
    let data = fs::read(path).await?;
    Ok(encode_bytes(&data, &guess_mime_type(path)))
}

/// Encode raw bytes as a data URI with the given media type.
pub fn encode_bytes(data: &[u8], mime_type: &str) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{};base64,{}", mime_type, b64)
}

/// Split a base64 data URI into `(media_type, payload)`.
pub fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime_type, payload) = rest.split_once(',')?;
    let mime_type = mime_type.strip_suffix(";base64")?;
    Some((mime_type, payload))
}

/// Guess MIME type from the path's extension, falling back to
/// `application/octet-stream`.
pub fn guess_mime_type(path: impl AsRef<Path>) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
