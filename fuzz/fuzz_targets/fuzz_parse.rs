#![no_main]

use libfuzzer_sys::fuzz_target;
use nav_core::SchemaComponent;
use nav_parser::{parse_schema, sort_schema_by_sections};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = parse_schema(text, 1);
    let keys: Vec<u64> = parsed.components.iter().map(SchemaComponent::key).collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(keys.iter().all(|key| *key < parsed.next_counter));

    let sorted = sort_schema_by_sections(text);
    assert_eq!(sort_schema_by_sections(&sorted), sorted);
});
