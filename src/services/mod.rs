//! Service functions, one per content API resource.
//!
//! Each function issues one request, unwraps the payload and resolves media
//! paths to absolute URLs. Errors propagate unchanged; the only fallbacks are
//! a missing profile (placeholder) and a missing background (`None`).

mod contact;
mod gallery;
mod profile;
mod projects;
mod travel;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::client::ApiClient;

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Content API resources.
#[derive(Debug, Clone)]
pub struct Services {
    client: ApiClient,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn media(&self, path: &str) -> String {
        self.client.media(path)
    }

    fn media_opt(&self, path: Option<String>) -> Option<String> {
        crate::client::media::resolve_optional(self.client.media_url(), path)
    }
}

/// Escape a value for use as one path segment.
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Query pairs for the optional parameters that are set and non-empty.
fn query_pairs<'a>(pairs: &[(&'a str, Option<&'a str>)]) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some((*key, *v)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_escapes_separators() {
        assert_eq!(segment("m31-andromeda"), "m31-andromeda");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_query_pairs_skip_empty() {
        let pairs = query_pairs(&[("filter", Some("deepsky")), ("tag", Some("")), ("lang", None)]);
        assert_eq!(pairs, vec![("filter", "deepsky")]);
    }
}
