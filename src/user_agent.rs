//! Client identity header sent with every page and artifact request.
//!
//! The catalogue blocks requests without a browser-like product token, so the
//! string leads with `Mozilla/5.0` and names the tool in the comment part.

/// User-Agent for catalogue and artifact requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("Mozilla/5.0 (compatible; springer-download/{version})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_has_browser_token_and_version() {
        let ua = default_user_agent();
        assert!(ua.starts_with("Mozilla/5.0"), "unexpected UA: {ua}");
        assert!(
            ua.contains(&format!("springer-download/{}", env!("CARGO_PKG_VERSION"))),
            "UA must carry crate version: {ua}"
        );
    }
}
