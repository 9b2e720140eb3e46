#![no_main]

use libfuzzer_sys::fuzz_target;
use nav_render_html::{extract_shared_schema, generate_shareable_document};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary URLs must never panic.
    let _ = extract_shared_schema(text);

    if !text.contains("</script>") {
        let url = generate_shareable_document(text, "https://example.com");
        assert_eq!(extract_shared_schema(&url).ok().as_deref(), Some(text.trim()));
    }
});
