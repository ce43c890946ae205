//! Conversion of fetched binary resources into renderable data URIs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use bd_core::ports::FetchedResource;
use bd_core::ResourceKey;

/// Builds a `data:` URI for a fetched resource.
///
/// The media type comes from the server's content-type header when present,
/// otherwise from the resource key's extension, otherwise
/// `application/octet-stream`.
pub fn encode(resource: &FetchedResource, key: &ResourceKey) -> String {
    let mime = resource
        .content_type
        .as_deref()
        .filter(|ct| !ct.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| mime_for_name(key.as_str()).to_string());
    format!("data:{};base64,{}", mime, STANDARD.encode(&resource.bytes))
}

/// Guesses a media type from a file name's extension.
pub fn mime_for_name(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
