//! URL handling for load targets, relay requests and shareable links.

use url::Url;

use crate::error::InputError;

/// Query parameter asking a FHIR server for a JSON response.
pub const FORMAT_PARAM: &str = "_format";

/// Query parameter carrying the target URL on the application's own address.
pub const LINK_PARAM: &str = "url";

/// Parse a user-entered string into an absolute http(s) URL.
pub fn parse_target_url(input: &str) -> Result<Url, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(InputError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(InputError::MissingHost);
    }

    Ok(url)
}

/// Return `url` with `_format=json` in its query. An existing `_format`
/// parameter is replaced; every other parameter is kept byte for byte, in
/// its original position.
pub fn with_json_format(url: &Url) -> Url {
    let mut pieces: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|piece| !piece.is_empty())
        .filter(|piece| piece.split('=').next() != Some(FORMAT_PARAM))
        .collect();
    let format = format!("{FORMAT_PARAM}=json");
    pieces.push(&format);

    let mut out = url.clone();
    out.set_query(Some(&pieces.join("&")));
    out
}

/// Build the relay address that wraps `target` as the `param` query parameter.
/// The target is percent-encoded by the query serializer.
pub fn relay_url(endpoint: &Url, param: &str, target: &Url) -> Url {
    let mut out = endpoint.clone();
    out.query_pairs_mut().append_pair(param, target.as_str());
    out
}

/// Extract the decoded target from an application address such as
/// `https://viewer.example/?url=https%3A%2F%2Fserver%2Fmetadata`.
pub fn target_from_app_address(address: &str) -> Option<String> {
    let url = Url::parse(address.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == LINK_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Application address that reopens `target` when visited.
pub fn permalink(app_base: &Url, target: &str) -> Url {
    let retained: Vec<(String, String)> = app_base
        .query_pairs()
        .filter(|(key, _)| key != LINK_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut out = app_base.clone();
    out.set_query(None);
    out.set_fragment(None);
    {
        let mut pairs = out.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(LINK_PARAM, target);
    }
    out
}
