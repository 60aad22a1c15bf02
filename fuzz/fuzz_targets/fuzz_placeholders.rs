#![no_main]

use libfuzzer_sys::fuzz_target;
use stagecraft::domain::value_objects::{parse_segments, Segment};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Splitting a text leaf should never panic
        if let Ok(segments) = parse_segments(content) {
            let literal_len: usize = segments
                .iter()
                .map(|s| match s {
                    Segment::Literal(text) => text.len(),
                    Segment::Placeholder(_) => 0,
                })
                .sum();
            assert!(literal_len <= content.len());
        }
    }
});
