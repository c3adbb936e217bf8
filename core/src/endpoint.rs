//! Joining the Gen-API root URL with operation paths.

use url::{ParseError, Url};

/// Append `path` to the path of `endpoint`, keeping any base path the
/// endpoint already carries (`http://gw/genapi/` + `/ping` gives
/// `http://gw/genapi/ping`).
pub fn join_path(endpoint: &str, path: &str) -> Result<String, ParseError> {
    let mut url = Url::parse(endpoint)?;
    if url.cannot_be_a_base() {
        return Err(ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    Ok(url.into())
}
