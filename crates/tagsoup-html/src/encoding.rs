//! Charset declarations in `<meta>` elements.

use encoding_rs::Encoding;
use tagsoup_dom::{DomTree, NodeId};

/// `name=value` pairs separated by `;`, as found in a `content` attribute
/// like `text/html; charset=utf-8`.
///
/// Names are trimmed and lowercased; values are trimmed. An entry without
/// `=` is kept with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValuePairs {
    pairs: Vec<(String, String)>,
}

impl NameValuePairs {
    /// Split `text` into pairs.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let pairs = text
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((name, value)) => (name.trim().to_ascii_lowercase(), value.trim().to_owned()),
                None => (entry.to_ascii_lowercase(), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// Value of the first pair with this name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate in order of appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Map a charset label to an encoding. `utf8` is accepted as an alias of
/// `utf-8`; everything else goes through the WHATWG label table.
#[must_use]
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim().trim_matches(|c| c == '"' || c == '\'');
    if label.eq_ignore_ascii_case("utf8") {
        return Some(encoding_rs::UTF_8);
    }
    Encoding::for_label(label.as_bytes())
}

/// The charset declared by a `<meta>` element, if any.
///
/// Both `<meta http-equiv="content-type" content="...; charset=x">` and
/// `<meta charset="x">` are recognized.
pub(crate) fn declared_charset(tree: &DomTree, id: NodeId) -> Option<String> {
    let name = tree.name(id);
    if name != "meta" {
        return None;
    }
    let charset = if let Some(http_equiv) = tree.attribute_value(id, "http-equiv") {
        if !http_equiv.trim().eq_ignore_ascii_case("content-type") {
            return None;
        }
        let content = tree.attribute_value(id, "content")?;
        NameValuePairs::parse(content).get("charset")?.to_owned()
    } else {
        tree.attribute_value(id, "charset")?.trim().to_owned()
    };
    (!charset.is_empty()).then_some(charset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_are_trimmed_and_lowercased() {
        let pairs = NameValuePairs::parse(" text/html ;  CharSet = ISO-8859-1 ");
        assert_eq!(pairs.get("charset"), Some("ISO-8859-1"));
        assert_eq!(pairs.get("text/html"), Some(""));
        assert_eq!(pairs.iter().count(), 2);
    }

    #[test]
    fn test_first_pair_wins() {
        let pairs = NameValuePairs::parse("charset=a; charset=b");
        assert_eq!(pairs.get("charset"), Some("a"));
    }

    #[test]
    fn test_utf8_alias() {
        assert_eq!(resolve_encoding("utf8"), Some(encoding_rs::UTF_8));
        assert_eq!(resolve_encoding("UTF-8"), Some(encoding_rs::UTF_8));
        assert_eq!(resolve_encoding("latin1"), Some(encoding_rs::WINDOWS_1252));
        assert_eq!(resolve_encoding("no-such-charset"), None);
    }
}
