use xdid_core::did::Did;

/// Maps a did:web to the URL of its document.
///
/// ```text
/// did:web:example.com                  -> https://example.com/.well-known/did.json
/// did:web:example.com%3A3000:user:alice -> https://example.com:3000/user/alice/did.json
/// ```
pub fn parse_url(did: &Did) -> String {
    let (domain, path) = match did.method_id.0.split_once(':') {
        Some((domain, path)) => (domain, Some(path)),
        None => (did.method_id.0.as_str(), None),
    };

    let domain = domain.replace("%3A", ":").replace("%3a", ":");

    // Plain HTTP for localhost, so tests can serve documents locally.
    let scheme = if domain == "localhost" || domain.starts_with("localhost:") {
        "http"
    } else {
        "https"
    };

    match path {
        Some(path) => format!("{scheme}://{domain}/{}/did.json", path.replace(':', "/")),
        None => format!("{scheme}://{domain}/.well-known/did.json"),
    }
}
