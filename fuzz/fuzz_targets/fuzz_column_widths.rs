#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use tableplus_doc::markup::{DATA_COLUMN_SIZE, parse_table_attrs};
use tableplus_doc::table::COLUMN_WIDTHS;
use tableplus_layout::ColumnWidths;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if raw.len() > 4096 {
        return;
    }

    // Parsing is all-or-nothing and never panics.
    let widths = ColumnWidths::parse(raw);
    assert!(widths.as_slice().iter().all(|w| w.is_finite()));

    // A parsed vector survives its own serialization.
    if !widths.is_empty() {
        assert_eq!(ColumnWidths::parse(&widths.serialize()), widths);
    }

    // Markup parsing stores the same vector.
    let mut markup = BTreeMap::new();
    markup.insert(DATA_COLUMN_SIZE.to_string(), raw.to_string());
    let attrs = parse_table_attrs(&markup);
    let stored = attrs
        .get(COLUMN_WIDTHS)
        .and_then(|v| v.as_str())
        .map(ColumnWidths::parse)
        .unwrap_or_default();
    assert_eq!(stored, widths);
});
