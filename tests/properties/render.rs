use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::string::string_regex;

use stagecraft::domain::value_objects::DocumentFormat;
use stagecraft::{render, StagecraftError, TemplateDocument, ValueSet};

fn literal_strategy() -> impl Strategy<Value = String> {
    string_regex(r"[a-zA-Z0-9 .,:=\n-]{0,16}").expect("valid regex")
}

fn name_strategy() -> impl Strategy<Value = String> {
    string_regex(r"[a-z][a-z0-9_]{0,8}").expect("valid regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    string_regex(r#"[a-zA-Z0-9 ."\\/:-]{0,24}"#).expect("valid regex")
}

/// A text template: literal runs interleaved with `${name}` / `${var.name}` markers
fn template_strategy() -> impl Strategy<Value = (String, BTreeSet<String>)> {
    prop::collection::vec((literal_strategy(), name_strategy(), any::<bool>()), 1..6).prop_map(
        |parts| {
            let mut source = String::new();
            let mut names = BTreeSet::new();
            for (literal, name, var_prefix) in parts {
                source.push_str(&literal);
                if var_prefix {
                    source.push_str(&format!("${{var.{}}}", name));
                } else {
                    source.push_str(&format!("${{{}}}", name));
                }
                names.insert(name);
            }
            (source, names)
        },
    )
}

fn text_template(source: &str) -> TemplateDocument {
    TemplateDocument::parse("main.tf", DocumentFormat::Text, source).expect("template parses")
}

fn value_set(names: impl IntoIterator<Item = String>, value: &str) -> ValueSet {
    ValueSet::from_pairs("staging", names.into_iter().map(|n| (n, value.to_string())))
        .expect("unique keys")
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    #[test]
    fn property_complete_value_set_leaves_no_markers(
        (source, names) in template_strategy(),
        value in value_strategy(),
    ) {
        let template = text_template(&source);
        prop_assert_eq!(template.placeholders(), names.clone());

        let rendered = render(&template, &value_set(names, &value)).expect("complete set renders");
        prop_assert!(!rendered.content().contains("${"), "rendered content still contains a placeholder marker");
    }

    #[test]
    fn property_missing_keys_are_reported_exactly(
        (source, names) in template_strategy(),
        keep in prop::collection::vec(any::<bool>(), 6),
    ) {
        let bound: BTreeSet<String> = names
            .iter()
            .zip(keep.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|(name, _)| name.clone())
            .collect();
        let expected: BTreeSet<String> = names.difference(&bound).cloned().collect();

        let result = render(&text_template(&source), &value_set(bound, "v"));
        if expected.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(StagecraftError::UnresolvedPlaceholders { missing, .. }) => {
                    prop_assert_eq!(missing, expected);
                }
                other => prop_assert!(false, "expected unresolved placeholders, got {:?}", other),
            }
        }
    }

    #[test]
    fn property_rendering_is_deterministic(
        (source, names) in template_strategy(),
        value in value_strategy(),
    ) {
        let template = text_template(&source);
        let values = value_set(names, &value);
        let first = render(&template, &values).expect("renders");
        let second = render(&template, &values).expect("renders");
        prop_assert_eq!(first.content(), second.content());
        prop_assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn property_json_templates_render_valid_json(
        name in name_strategy(),
        value in value_strategy(),
    ) {
        let source = format!(r#"{{"service": {{"name": "${{{}}}", "port": 443}}}}"#, name);
        let template = TemplateDocument::parse("app.json", DocumentFormat::Json, &source)
            .expect("template parses");
        let rendered = render(&template, &value_set([name], &value)).expect("renders");

        let parsed: serde_json::Value = serde_json::from_str(rendered.content())
            .expect("rendered JSON stays valid");
        prop_assert_eq!(parsed["service"]["name"].as_str(), Some(value.as_str()));
        prop_assert_eq!(parsed["service"]["port"].as_i64(), Some(443));
    }
}
