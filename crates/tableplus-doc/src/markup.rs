#![forbid(unsafe_code)]

//! Persisted markup encoding of table and header-cell attributes.
//!
//! Elements are modelled as flat attribute maps; the surrounding tag and
//! child serialization belong to the host's markup layer.
//!
//! | Node attribute    | Markup                                                   |
//! |-------------------|----------------------------------------------------------|
//! | `columnWidths`    | `data-column-size="30,30,40"`                             |
//! | `locked`          | `data-locked="true"` (`"true"`, `"1"`, `""` parse locked) |
//! | `borderColor`     | `data-border-color` + `--table-border-color` style        |
//! | `backgroundColor` | `data-header-bg` + `background-color` style               |

use std::collections::BTreeMap;

use tableplus_layout::ColumnWidths;

use crate::node::{AttrValue, Attrs, Node};
use crate::table::{BACKGROUND_COLOR, BORDER_COLOR, COLUMN_WIDTHS, LOCKED, column_widths};

pub const DATA_COLUMN_SIZE: &str = "data-column-size";
pub const DATA_LOCKED: &str = "data-locked";
pub const DATA_BORDER_COLOR: &str = "data-border-color";
pub const DATA_HEADER_BG: &str = "data-header-bg";
pub const STYLE: &str = "style";
/// CSS custom property mirroring the border colour.
pub const BORDER_COLOR_VAR: &str = "--table-border-color";

const TABLE_BASE_STYLE: &str = "border-radius: 8px; overflow: hidden;";
const HEADER_DEFAULT_BACKGROUND: &str = "var(--color-secondary, #f5f5f5)";

/// Markup attributes of one element.
pub type MarkupAttrs = BTreeMap<String, String>;

/// Table node attributes from markup. Malformed width strings become
/// empty rather than partially numeric.
#[must_use]
pub fn parse_table_attrs(markup: &MarkupAttrs) -> Attrs {
    let mut attrs = Attrs::new();
    let widths = markup
        .get(DATA_COLUMN_SIZE)
        .map(|raw| ColumnWidths::parse(raw))
        .unwrap_or_default();
    attrs.insert(COLUMN_WIDTHS.to_string(), AttrValue::from(widths.serialize()));
    let locked = markup
        .get(DATA_LOCKED)
        .is_some_and(|raw| matches!(raw.as_str(), "true" | "1" | ""));
    attrs.insert(LOCKED.to_string(), AttrValue::Bool(locked));
    attrs.insert(
        BORDER_COLOR.to_string(),
        AttrValue::from(markup.get(DATA_BORDER_COLOR).cloned()),
    );
    attrs
}

/// Markup for a table node's attributes.
#[must_use]
pub fn render_table_attrs(table: &Node) -> MarkupAttrs {
    let mut out = MarkupAttrs::new();
    out.insert(
        DATA_COLUMN_SIZE.to_string(),
        column_widths(table).serialize(),
    );
    if crate::table::is_locked(table) {
        out.insert(DATA_LOCKED.to_string(), "true".to_string());
    }
    let mut style = TABLE_BASE_STYLE.to_string();
    if let Some(color) = crate::table::border_color(table) {
        out.insert(DATA_BORDER_COLOR.to_string(), color.to_string());
        style.push_str(&format!(" {BORDER_COLOR_VAR}:{color}"));
    }
    out.insert("border".to_string(), "1".to_string());
    out.insert(STYLE.to_string(), style);
    out
}

/// Header cell attributes from markup; the data attribute wins over an
/// inline `background-color`.
#[must_use]
pub fn parse_header_attrs(markup: &MarkupAttrs) -> Attrs {
    let background = markup
        .get(DATA_HEADER_BG)
        .filter(|v| !v.is_empty())
        .cloned()
        .or_else(|| {
            markup
                .get(STYLE)
                .and_then(|style| style_property(style, "background-color"))
        });
    let mut attrs = Attrs::new();
    attrs.insert(BACKGROUND_COLOR.to_string(), AttrValue::from(background));
    attrs
}

/// Markup for a header cell's attributes.
#[must_use]
pub fn render_header_attrs(cell: &Node) -> MarkupAttrs {
    let mut out = MarkupAttrs::new();
    match crate::table::header_background(cell) {
        Some(color) => {
            out.insert(DATA_HEADER_BG.to_string(), color.to_string());
            out.insert(STYLE.to_string(), format!("background-color: {color}"));
        }
        None => {
            out.insert(
                STYLE.to_string(),
                format!("background-color: {HEADER_DEFAULT_BACKGROUND}"),
            );
        }
    }
    out
}

/// Value of one declaration in an inline style, property names compared
/// case-insensitively.
#[must_use]
pub fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let value = value.trim();
        (name.trim().eq_ignore_ascii_case(property) && !value.is_empty())
            .then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{header, table};

    fn markup(pairs: &[(&str, &str)]) -> MarkupAttrs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn parse_valid_and_invalid_widths() {
        let attrs = parse_table_attrs(&markup(&[(DATA_COLUMN_SIZE, "30, 30,40")]));
        assert_eq!(attrs[COLUMN_WIDTHS], AttrValue::from("30,30,40"));
        let attrs = parse_table_attrs(&markup(&[(DATA_COLUMN_SIZE, "30,abc")]));
        assert_eq!(attrs[COLUMN_WIDTHS], AttrValue::from(""));
        let attrs = parse_table_attrs(&MarkupAttrs::new());
        assert_eq!(attrs[COLUMN_WIDTHS], AttrValue::from(""));
    }

    #[test]
    fn locked_parsing_accepts_boolish_values() {
        for raw in ["true", "1", ""] {
            let attrs = parse_table_attrs(&markup(&[(DATA_LOCKED, raw)]));
            assert_eq!(attrs[LOCKED], AttrValue::Bool(true), "{raw:?}");
        }
        for raw in ["false", "0", "yes"] {
            let attrs = parse_table_attrs(&markup(&[(DATA_LOCKED, raw)]));
            assert_eq!(attrs[LOCKED], AttrValue::Bool(false), "{raw:?}");
        }
        assert_eq!(parse_table_attrs(&MarkupAttrs::new())[LOCKED], AttrValue::Bool(false));
    }

    #[test]
    fn render_table_mirrors_border_color() {
        let t = table(vec![])
            .with_attr(COLUMN_WIDTHS, "50,50")
            .with_attr(LOCKED, true)
            .with_attr(BORDER_COLOR, "red");
        let out = render_table_attrs(&t);
        assert_eq!(out[DATA_COLUMN_SIZE], "50,50");
        assert_eq!(out[DATA_LOCKED], "true");
        assert_eq!(out[DATA_BORDER_COLOR], "red");
        assert!(out[STYLE].ends_with("--table-border-color:red"));

        let plain = render_table_attrs(&table(vec![]));
        assert!(!plain.contains_key(DATA_LOCKED));
        assert!(!plain.contains_key(DATA_BORDER_COLOR));
        assert_eq!(plain[STYLE], TABLE_BASE_STYLE);
    }

    #[test]
    fn table_attrs_survive_render_then_parse() {
        let t = table(vec![])
            .with_attr(COLUMN_WIDTHS, "33.5,66.5")
            .with_attr(LOCKED, true)
            .with_attr(BORDER_COLOR, "#00f");
        let attrs = parse_table_attrs(&render_table_attrs(&t));
        assert_eq!(&attrs, t.attrs());
    }

    #[test]
    fn header_background_falls_back_to_inline_style() {
        let attrs = parse_header_attrs(&markup(&[(STYLE, "color: red; Background-Color: #eee")]));
        assert_eq!(attrs[BACKGROUND_COLOR], AttrValue::from("#eee"));
        let attrs = parse_header_attrs(&markup(&[
            (DATA_HEADER_BG, "#fff"),
            (STYLE, "background-color: #eee"),
        ]));
        assert_eq!(attrs[BACKGROUND_COLOR], AttrValue::from("#fff"));
        assert_eq!(
            parse_header_attrs(&MarkupAttrs::new())[BACKGROUND_COLOR],
            AttrValue::Null
        );
    }

    #[test]
    fn render_header() {
        let h = header("x").with_attr(BACKGROUND_COLOR, "#fff");
        let out = render_header_attrs(&h);
        assert_eq!(out[DATA_HEADER_BG], "#fff");
        assert_eq!(out[STYLE], "background-color: #fff");
        let out = render_header_attrs(&header("x"));
        assert!(!out.contains_key(DATA_HEADER_BG));
        assert!(out[STYLE].contains("--color-secondary"));
    }
}
