use lazy_static::lazy_static;
use regex::Regex;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

lazy_static! {
    /// A pattern that matches a [DID][ref], capturing the method name and the method-specific id.
    ///
    /// [ref]: https://www.w3.org/TR/did-core/#did-syntax
    pub(crate) static ref RE_DID: Regex =
        Regex::new(
            r"^did:([a-z0-9]+):((?:(?:[A-Za-z0-9._\-]|%[0-9A-Fa-f]{2})*:)*(?:[A-Za-z0-9._\-]|%[0-9A-Fa-f]{2})+)$"
        )
        .unwrap();
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_did() {
        assert!(RE_DID.is_match("did:key:z6MkiTBz1ymuepAQ4HEHYSF1H8quG5GLVVQR3djdX3mDooWp"));
        assert!(RE_DID.is_match("did:web:example.com:user%20a"));
        assert!(RE_DID.is_match("did:example:a"));

        assert!(!RE_DID.is_match("did:key:"));
        assert!(!RE_DID.is_match("did:key:abc:"));
        assert!(!RE_DID.is_match("did:KEY:abc"));
        assert!(!RE_DID.is_match("key:abc"));
        assert!(!RE_DID.is_match("did:key:a b"));
    }
}
