//! Property tests for the parser over generated markup.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use tagsoup_html::{HtmlDocument, ParseOptions};

/// Container names with no special closing rules.
const NAMES: &[&str] = &["div", "span", "b", "em", "section", "Article"];
const ATTRIBUTE_NAMES: &[&str] = &["id", "class", "title", "data-x"];
const WORDS: &[&str] = &["a", "hello", "x1", "Z", "42", "lorem ipsum"];

/// A well-formed fragment: properly nested containers, double-quoted
/// attributes and plain text.
#[derive(Debug, Clone)]
struct Fragment(String);

impl Fragment {
    fn generate(g: &mut Gen, depth: usize, out: &mut String) {
        let count = usize::arbitrary(g) % 4;
        for _ in 0..count {
            if depth == 0 || bool::arbitrary(g) {
                out.push_str(pick(g, WORDS));
                continue;
            }
            let name = pick(g, NAMES);
            out.push('<');
            out.push_str(name);
            for _ in 0..usize::arbitrary(g) % 3 {
                out.push(' ');
                out.push_str(pick(g, ATTRIBUTE_NAMES));
                out.push_str("=\"");
                out.push_str(pick(g, WORDS));
                out.push('"');
            }
            out.push('>');
            Self::generate(g, depth - 1, out);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn pick<'a>(g: &mut Gen, items: &[&'a str]) -> &'a str {
    g.choose(items).copied().unwrap_or_default()
}

impl Arbitrary for Fragment {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut out = String::new();
        Self::generate(g, 4, &mut out);
        Self(out)
    }
}

#[quickcheck]
fn prop_well_formed_fragment_round_trips(fragment: Fragment) -> bool {
    let mut doc = HtmlDocument::new();
    if doc.load_html(&fragment.0).is_err() {
        return false;
    }
    let root = doc.root();
    doc.errors().is_empty()
        && doc.tree().regenerate_html(root).ok().as_deref() == Some(fragment.0.as_str())
        && doc.outer_html(root).ok().as_deref() == Some(fragment.0.as_str())
}

#[quickcheck]
fn prop_checksum_covers_whole_input(fragment: Fragment) -> bool {
    let mut doc = HtmlDocument::with_options(ParseOptions::default().with_checksum(true));
    doc.load_html(&fragment.0).is_ok()
        && doc.checksum() == Some(crc32fast::hash(fragment.0.as_bytes()))
}

#[quickcheck]
fn prop_arbitrary_text_never_fails(text: String) -> bool {
    let mut doc = HtmlDocument::new();
    doc.load_html(&text).is_ok() && doc.outer_html(doc.root()).is_ok()
}

#[quickcheck]
fn prop_repair_never_fails(text: String) -> bool {
    let options = ParseOptions::default()
        .with_fix_nested_tags(true)
        .with_auto_close_on_end(true);
    let mut doc = HtmlDocument::with_options(options);
    doc.load_html(&text).is_ok() && doc.tree().regenerate_html(doc.root()).is_ok()
}
