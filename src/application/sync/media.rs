//! Image URL resolution for records that may have originated remotely.

use url::Url;

/// Resolve an image reference against the remote service.
///
/// Already-absolute URLs pass through unchanged; absolute paths are prefixed
/// with the remote origin; anything else is treated as a file under the
/// remote media root.
pub fn resolve_image_url(remote_base: &Url, reference: &str) -> String {
    if reference.starts_with("http") {
        return reference.to_string();
    }

    let origin = remote_base.origin().ascii_serialization();
    if reference.starts_with('/') {
        format!("{origin}{reference}")
    } else {
        format!("{origin}/media/{reference}")
    }
}
