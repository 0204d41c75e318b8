//! Vendor class cleanup for stored editor markup
//!
//! Older editors saved presentation as class names under a vendor prefix (`ql-align-center`,
//! `ql-direction-rtl`, `ql-indent-1`, ...). The document model has no notion of those classes, so
//! before parsing, alignment and direction classes are rewritten into a `style` declaration and a
//! `dir` attribute, and every other prefixed class is dropped.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static START_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)(\s[^<>]*?)?(/?)>").unwrap());

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'=<>/`]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

static CLASS_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+class\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

const ALIGNMENTS: [&str; 4] = ["left", "center", "right", "justify"];

/// Rewrites vendor-prefixed classes in an HTML fragment.
#[derive(Debug, Clone)]
pub struct ClassCleaner {
    prefix: String,
}

/// One parsed attribute of a start tag; `None` for valueless attributes
type RawAttribute = (String, Option<String>);

impl ClassCleaner {
    /// Cleaner for classes named `<prefix>-*`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim().trim_end_matches('-').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Rewrite alignment and direction classes, then strip whatever prefixed classes remain.
    pub fn clean(&self, markup: &str) -> String {
        if self.prefix.is_empty() {
            return markup.to_string();
        }
        let rewritten = START_TAG.replace_all(markup, |caps: &Captures| self.rewrite_tag(caps));
        self.strip_remaining(&rewritten)
    }

    fn is_vendor(&self, class: &str) -> bool {
        class
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    }

    fn alignment(&self, class: &str) -> Option<&'static str> {
        let rest = class.strip_prefix(self.prefix.as_str())?.strip_prefix("-align-")?;
        ALIGNMENTS.iter().copied().find(|a| *a == rest)
    }

    fn is_rtl(&self, class: &str) -> bool {
        class
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest == "-direction-rtl")
    }

    fn rewrite_tag(&self, caps: &Captures) -> String {
        let original = caps[0].to_string();
        let Some(raw_attrs) = caps.get(2) else {
            return original;
        };
        let mut attrs = self.parse_attributes(raw_attrs.as_str());
        let Some(class_index) = attrs.iter().position(|(name, _)| name.eq_ignore_ascii_case("class"))
        else {
            return original;
        };

        let classes = attrs[class_index].1.clone().unwrap_or_default();
        if !classes.split_whitespace().any(|c| self.is_vendor(c)) {
            return original;
        }

        let align = classes.split_whitespace().find_map(|c| self.alignment(c));
        let rtl = classes.split_whitespace().any(|c| self.is_rtl(c));
        let kept: Vec<&str> = classes
            .split_whitespace()
            .filter(|c| !self.is_vendor(c))
            .collect();

        if kept.is_empty() {
            attrs.remove(class_index);
        } else {
            attrs[class_index].1 = Some(kept.join(" "));
        }

        if let Some(align) = align {
            let declaration = format!("text-align: {};", align);
            match attrs.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case("style")) {
                Some((_, value)) => {
                    let existing = value.take().unwrap_or_default();
                    let existing = existing.trim().trim_end_matches(';');
                    *value = Some(if existing.is_empty() {
                        declaration
                    } else {
                        format!("{}; {}", existing, declaration)
                    });
                }
                None => attrs.push(("style".to_string(), Some(declaration))),
            }
        }

        if rtl && !attrs.iter().any(|(name, _)| name.eq_ignore_ascii_case("dir")) {
            attrs.push(("dir".to_string(), Some("rtl".to_string())));
        }

        let mut tag = format!("<{}", &caps[1]);
        for (name, value) in &attrs {
            tag.push(' ');
            tag.push_str(name);
            if let Some(value) = value {
                tag.push_str("=\"");
                tag.push_str(&value.replace('"', "&quot;"));
                tag.push('"');
            }
        }
        tag.push_str(&caps[3]);
        tag.push('>');
        tag
    }

    fn parse_attributes(&self, raw: &str) -> Vec<RawAttribute> {
        ATTRIBUTE
            .captures_iter(raw)
            .map(|caps| {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map(|m| m.as_str().to_string());
                (caps[1].to_string(), value)
            })
            .collect()
    }

    /// Second pass over class attributes the tag rewrite could not reach (e.g. unusual spacing).
    fn strip_remaining(&self, markup: &str) -> String {
        CLASS_ATTR
            .replace_all(markup, |caps: &Captures| {
                let (value, quote) = match caps.get(1) {
                    Some(m) => (m.as_str(), '"'),
                    None => (caps.get(2).map_or("", |m| m.as_str()), '\''),
                };
                let kept: Vec<&str> = value
                    .split_whitespace()
                    .filter(|c| !self.is_vendor(c))
                    .collect();
                if kept.len() == value.split_whitespace().count() {
                    caps[0].to_string()
                } else if kept.is_empty() {
                    String::new()
                } else {
                    format!(" class={q}{}{q}", kept.join(" "), q = quote)
                }
            })
            .into_owned()
    }
}

impl Default for ClassCleaner {
    fn default() -> Self {
        Self::new("ql")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        r#"<p class="ql-align-center ql-direction-rtl">Hello</p>"#,
        r#"<p style="text-align: center;" dir="rtl">Hello</p>"#
    )]
    #[case(r#"<p class="ql-indent-2">x</p>"#, "<p>x</p>")]
    #[case(
        r#"<p class="lead ql-align-right">x</p>"#,
        r#"<p class="lead" style="text-align: right;">x</p>"#
    )]
    #[case(
        r#"<p style="color: red" class="ql-align-justify">x</p>"#,
        r#"<p style="color: red; text-align: justify;">x</p>"#
    )]
    #[case(r#"<p class="lead">x</p>"#, r#"<p class="lead">x</p>"#)]
    #[case(r#"<p dir="ltr" class="ql-direction-rtl">x</p>"#, r#"<p dir="ltr">x</p>"#)]
    #[case("<p>a<br/>b</p>", "<p>a<br/>b</p>")]
    fn test_clean(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(ClassCleaner::default().clean(input), expected);
    }

    #[test]
    fn test_custom_prefix() {
        let cleaner = ClassCleaner::new("ed-");
        assert_eq!(cleaner.prefix(), "ed");
        assert_eq!(
            cleaner.clean(r#"<h2 class="ed-align-center ql-align-left">T</h2>"#),
            r#"<h2 class="ql-align-left" style="text-align: center;">T</h2>"#
        );
    }

    #[test]
    fn test_similar_names_are_kept() {
        assert_eq!(
            ClassCleaner::default().clean(r#"<span class="qlx quill">x</span>"#),
            r#"<span class="qlx quill">x</span>"#
        );
    }

    #[test]
    fn test_second_pass_catches_spaced_attribute() {
        let cleaner = ClassCleaner::default();
        assert_eq!(
            cleaner.strip_remaining(r#"<p  class = 'ql-indent-1 note'>x</p>"#),
            r#"<p class='note'>x</p>"#
        );
    }

    #[test]
    fn test_empty_prefix_disables_cleanup() {
        let markup = r#"<p class="ql-align-center">x</p>"#;
        assert_eq!(ClassCleaner::new("").clean(markup), markup);
    }
}
