//! `{name}` placeholder substitution

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_\-]+)\}").expect("placeholder pattern is valid"));

/// Variable name to replacement text, in insertion order
pub type TemplateVars = IndexMap<String, String>;

/// Replace every `{name}` bound in `vars`; unbound tokens stay as written
#[must_use]
pub fn substitute(template: &str, vars: &TemplateVars) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn replaces_bound_tokens() {
        let out = substitute(
            r#"<cbc:ProcurementTypeCode listName="gpp-criteria">{source}</cbc:ProcurementTypeCode>"#,
            &vars(&[("source", "eu")]),
        );
        assert_eq!(
            out,
            r#"<cbc:ProcurementTypeCode listName="gpp-criteria">eu</cbc:ProcurementTypeCode>"#
        );
    }

    #[test]
    fn leaves_unbound_tokens() {
        assert_eq!(substitute("{a}-{b}", &vars(&[("a", "1")])), "1-{b}");
    }

    #[test]
    fn replacement_is_not_rescanned() {
        assert_eq!(substitute("{a}", &vars(&[("a", "{b}"), ("b", "x")])), "{b}");
    }

    proptest! {
        #[test]
        fn text_without_braces_is_unchanged(text in "[^{}]*") {
            prop_assert_eq!(substitute(&text, &vars(&[("a", "b")])), text);
        }
    }
}
