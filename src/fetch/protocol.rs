//! The `sarif://` pseudo-protocol
//!
//! `sarif:///path` names a local file and `sarif://host/path` a web resource.

use crate::error::{FetchError, FetchResult};
use url::Url;

const LOCAL_PREFIX: &str = "sarif:///";
const REMOTE_PREFIX: &str = "sarif://";

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    input
        .get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &input[prefix.len()..])
}

/// Rewrite a `sarif://` URL to `file://` or `http://`
pub fn decode_sarif_protocol(input: &str) -> FetchResult<String> {
    if let Some(rest) = strip_prefix_ignore_case(input, LOCAL_PREFIX) {
        return Ok(format!("file:///{rest}"));
    }
    if let Some(rest) = strip_prefix_ignore_case(input, REMOTE_PREFIX) {
        return Ok(format!("http://{rest}"));
    }
    Err(FetchError::UnsupportedProtocol {
        url: input.to_string(),
    })
}

/// Parse a download source, decoding `sarif://` and rejecting other schemes
/// than http(s) and file
pub fn parse_download_url(input: &str) -> FetchResult<Url> {
    let decoded = if strip_prefix_ignore_case(input, REMOTE_PREFIX).is_some() {
        decode_sarif_protocol(input)?
    } else {
        input.to_string()
    };

    let url = Url::parse(&decoded).map_err(|_| FetchError::InvalidUrl {
        url: input.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        _ => Err(FetchError::UnsupportedProtocol {
            url: input.to_string(),
        }),
    }
}
