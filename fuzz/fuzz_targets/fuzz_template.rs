#![no_main]

use libfuzzer_sys::fuzz_target;
use stagecraft::domain::value_objects::DocumentFormat;
use stagecraft::{render, TemplateDocument, ValueSet};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        for format in [
            DocumentFormat::Json,
            DocumentFormat::Toml,
            DocumentFormat::Yaml,
            DocumentFormat::Text,
        ] {
            // Parsing and rendering against an empty value set should never panic
            if let Ok(template) = TemplateDocument::parse("fuzz", format, content) {
                let _ = render(&template, &ValueSet::new("fuzz"));
            }
        }
    }
});
