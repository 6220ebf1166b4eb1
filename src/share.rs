use url::Url;

/// Extract the secret from a share URL's `key` query parameter.
/// Percent escapes and `+`-as-space are decoded per form encoding.
pub fn key_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;

    for (name, value) in url.query_pairs() {
        if name == "key" {
            return Some(value.into_owned());
        }
    }

    None
}

/// Build a shareable link of the form `<base>?key=<url-encoded secret>`.
pub fn share_url(base: &str, secret: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().clear().append_pair("key", secret);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_key_parameter() {
        let key = key_from_url("https://example.com/2fa?key=JBSWY3DPEHPK3PXP");
        assert_eq!(key.as_deref(), Some("JBSWY3DPEHPK3PXP"));
    }

    #[test]
    fn decodes_percent_escapes_and_plus() {
        // Legacy form encoding: `+` is a space.
        let key = key_from_url("https://example.com/2fa?key=JBSW%20Y3DP+EHPK");
        assert_eq!(key.as_deref(), Some("JBSW Y3DP EHPK"));
    }

    #[test]
    fn missing_or_unparseable_key_is_none() {
        assert_eq!(key_from_url("https://example.com/2fa?other=1"), None);
        assert_eq!(key_from_url("JBSWY3DPEHPK3PXP"), None);
    }

    #[test]
    fn share_link_round_trips_the_secret() {
        let link = share_url("https://example.com/2fa", "JBSW Y3DP+3PXP").unwrap();
        assert!(link.starts_with("https://example.com/2fa?key="));
        assert_eq!(key_from_url(&link).as_deref(), Some("JBSW Y3DP+3PXP"));
    }

    #[test]
    fn share_link_replaces_existing_query() {
        let link = share_url("https://example.com/2fa?key=OLD", "NEW").unwrap();
        assert_eq!(key_from_url(&link).as_deref(), Some("NEW"));
    }
}
