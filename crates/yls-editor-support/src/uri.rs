//! Conversions between document URIs and file paths.

use std::path::{Path, PathBuf};

/// Extract the path from a `file://` URI.
///
/// Handles both Unix-style (`file:///path`) and Windows-style
/// (`file:///C:/path`) URIs. Anything that is not a `file` URI is returned as
/// is, so plain paths pass through unchanged.
pub fn uri_to_path(uri: &str) -> PathBuf {
    let path = if let Some(stripped) = uri.strip_prefix("file:///") {
        if stripped.chars().nth(1) == Some(':') {
            stripped.to_string()
        } else {
            format!("/{stripped}")
        }
    } else if let Some(stripped) = uri.strip_prefix("file://") {
        stripped.to_string()
    } else {
        uri.to_string()
    };
    PathBuf::from(percent_decode(&path))
}

/// Percent-decode a URI path.
pub fn percent_decode(s: &str) -> String {
    percent_encoding::percent_decode_str(s)
        .decode_utf8_lossy()
        .into_owned()
}

/// `file://` URI for a path. Relative paths are made absolute against the
/// current directory when possible.
pub fn path_to_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.to_string_lossy().replace('\\', "/");
    let encoded = percent_encoding::utf8_percent_encode(&text, PATH_ENCODE_SET);
    if text.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

const PATH_ENCODE_SET: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');
