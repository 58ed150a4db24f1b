/*
 * numbering.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Display labels for numbered entities.
 */

//! Display labels for numbered entities.
//!
//! Turns an entity's [`CrossrefOrder`] into the text a reader sees, using
//! the numbering options of the output file that defines the entity:
//!
//! - sections render as dotted paths (`2.3.1`), chapter first
//! - everything else renders in the active label style (arabic, roman,
//!   alphabetic, or a cyclic list of custom labels), prefixed with the
//!   chapter index unless `chapters: false`
//! - subreferences render as `"<parent> (<child>)"`
//!
//! Alphabetic styles are plain character arithmetic: numbering past `z`
//! continues into whatever code points follow it.

use crate::types::{CrossrefEntry, CrossrefOptions, CrossrefOrder, NumberingScheme, ref_type};

/// Style used when neither a per-type nor a global style is configured.
pub const DEFAULT_STYLE: &str = "arabic";

/// Default style for the child part of a subreference.
pub const SUBREF_DEFAULT_STYLE: &str = "alpha a";

/// Type name used to look up the subreference style (`subref-labels`).
pub const SUBREF_TYPE: &str = "subref";

const ROMAN_NUMERALS: [(&str, u32); 13] = [
    ("M", 1000),
    ("CM", 900),
    ("D", 500),
    ("CD", 400),
    ("C", 100),
    ("XC", 90),
    ("L", 50),
    ("XL", 40),
    ("X", 10),
    ("IX", 9),
    ("V", 5),
    ("IV", 4),
    ("I", 1),
];

/// Label for a resolved reference.
///
/// `options` are the options of the file that defines `entry`. When `parent`
/// is given the entry is a subreference and the label is composed from the
/// parent's label and the child's.
pub fn format_crossref(
    ref_type_name: &str,
    options: &CrossrefOptions,
    entry: &CrossrefEntry,
    parent: Option<&CrossrefEntry>,
) -> String {
    match parent {
        Some(parent) => {
            let parent_type = ref_type(&parent.key);
            let mut label = number_option(&parent.order, options, parent_type, None);
            label.push_str(" (");
            label.push_str(&number_option(
                &entry.order,
                options,
                SUBREF_TYPE,
                Some(SUBREF_DEFAULT_STYLE),
            ));
            label.push(')');
            label
        }
        None => number_option(&entry.order, options, ref_type_name, None),
    }
}

/// Label for one order value.
///
/// The style is `<type>-labels`, else the global `labels`, else
/// `default_style`, else arabic.
pub fn number_option(
    order: &CrossrefOrder,
    options: &CrossrefOptions,
    ref_type_name: &str,
    default_style: Option<&str>,
) -> String {
    if ref_type_name == "sec"
        && let Some(section) = &order.section
    {
        return section_number(options, section);
    }

    let scheme = match options.label_style(ref_type_name) {
        Some(style) => style.scheme(),
        None => NumberingScheme::parse(default_style.unwrap_or(DEFAULT_STYLE)),
    };

    let label = match scheme {
        NumberingScheme::List(labels) if !labels.is_empty() => {
            let index = (i64::from(order.number) - 1).rem_euclid(labels.len() as i64);
            labels[index as usize].clone()
        }
        NumberingScheme::List(_) | NumberingScheme::Arabic => order.number.to_string(),
        NumberingScheme::Alpha { start } => {
            offset_char(start, i64::from(order.number) - 1).to_string()
        }
        NumberingScheme::Roman { lowercase } => to_roman(order.number, lowercase),
    };

    with_chapter(options, label, order)
}

/// Dotted section number, e.g. `[2, 1, 0, 3]` → `2.1.3`.
pub fn section_number(options: &CrossrefOptions, section: &[u32]) -> String {
    section
        .iter()
        .enumerate()
        .filter(|(_, value)| **value > 0)
        .filter_map(|(level, &value)| {
            if level == 0 {
                chapter_index(options, value)
            } else {
                Some(value.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Chapter token: a letter (`1` → `A`) with `chapters-alpha`, otherwise the
/// number. `None` for chapter zero.
pub fn chapter_index(options: &CrossrefOptions, index: u32) -> Option<String> {
    if index == 0 {
        None
    } else if options.chapters_alpha() {
        Some(offset_char('@', i64::from(index)).to_string())
    } else {
        Some(index.to_string())
    }
}

fn with_chapter(options: &CrossrefOptions, label: String, order: &CrossrefOrder) -> String {
    if !options.chapters_enabled() {
        return label;
    }
    match order.chapter().and_then(|c| chapter_index(options, c)) {
        Some(chapter) => format!("{}.{}", chapter, label),
        None => label,
    }
}

/// Greedy subtractive Roman numeral. Zero yields an empty string.
pub fn to_roman(number: u32, lowercase: bool) -> String {
    let mut remaining = number;
    let mut numeral = String::new();
    for (symbol, value) in ROMAN_NUMERALS {
        let count = remaining / value;
        remaining -= count * value;
        for _ in 0..count {
            if lowercase {
                numeral.push_str(&symbol.to_lowercase());
            } else {
                numeral.push_str(symbol);
            }
        }
    }
    numeral
}

/// `start` shifted by `offset` code points; U+FFFD outside the `char` range.
fn offset_char(start: char, offset: i64) -> char {
    u32::try_from(i64::from(u32::from(start)) + offset)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LabelStyle;

    fn entry(key: &str, order: CrossrefOrder) -> CrossrefEntry {
        CrossrefEntry {
            key: key.to_string(),
            parent: None,
            file: "index.html".to_string(),
            order,
        }
    }

    fn label(options: &CrossrefOptions, ref_type_name: &str, order: CrossrefOrder) -> String {
        number_option(&order, options, ref_type_name, None)
    }

    #[test]
    fn test_arabic_default() {
        let options = CrossrefOptions::default();
        assert_eq!(label(&options, "fig", CrossrefOrder::new(3)), "3");
    }

    #[test]
    fn test_chapter_prefix() {
        let options = CrossrefOptions::default();
        let order = CrossrefOrder::new(1).with_section([2, 0, 0]);
        assert_eq!(label(&options, "fig", order.clone()), "2.1");

        let options = CrossrefOptions::default().with_chapters(false);
        assert_eq!(label(&options, "fig", order), "1");
    }

    #[test]
    fn test_chapter_prefix_skipped_for_chapter_zero() {
        let options = CrossrefOptions::default();
        let order = CrossrefOrder::new(4).with_section([0, 1]);
        assert_eq!(label(&options, "tbl", order), "4");
    }

    #[test]
    fn test_alpha_chapters() {
        let options = CrossrefOptions::default().with_chapters_alpha(true);
        let order = CrossrefOrder::new(2).with_section([3]);
        assert_eq!(label(&options, "tbl", order), "C.2");
    }

    #[test]
    fn test_section_numbers() {
        let options = CrossrefOptions::default();
        assert_eq!(section_number(&options, &[2, 1, 0, 3]), "2.1.3");
        assert_eq!(section_number(&options, &[0, 2, 1]), "2.1");
        assert_eq!(section_number(&options, &[1]), "1");
        assert_eq!(section_number(&options, &[0, 0]), "");

        let alpha = CrossrefOptions::default().with_chapters_alpha(true);
        assert_eq!(section_number(&alpha, &[1, 2]), "A.2");
    }

    #[test]
    fn test_section_ignores_label_style_and_chapter_option() {
        let options = CrossrefOptions::default()
            .with_labels(LabelStyle::named("roman"))
            .with_chapters(false);
        let order = CrossrefOrder::new(7).with_section([3, 2]);
        assert_eq!(label(&options, "sec", order), "3.2");
    }

    #[test]
    fn test_sec_without_section_uses_general_case() {
        let options = CrossrefOptions::default();
        assert_eq!(label(&options, "sec", CrossrefOrder::new(5)), "5");
    }

    #[test]
    fn test_roman_styles() {
        let options = CrossrefOptions::default().with_type_labels("fig", LabelStyle::named("roman"));
        assert_eq!(label(&options, "fig", CrossrefOrder::new(14)), "XIV");

        let options = CrossrefOptions::default().with_type_labels("fig", LabelStyle::named("romani"));
        assert_eq!(label(&options, "fig", CrossrefOrder::new(9)), "ix");
    }

    #[test]
    fn test_roman_reference_values() {
        let expected = [
            "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII",
            "XIV", "XV", "XVI", "XVII", "XVIII", "XIX", "XX",
        ];
        for (i, numeral) in expected.iter().enumerate() {
            assert_eq!(to_roman(i as u32 + 1, false), *numeral);
        }
        assert_eq!(to_roman(49, false), "XLIX");
        assert_eq!(to_roman(99, false), "XCIX");
        assert_eq!(to_roman(444, false), "CDXLIV");
        assert_eq!(to_roman(1987, false), "MCMLXXXVII");
        assert_eq!(to_roman(1987, true), "mcmlxxxvii");
        assert_eq!(to_roman(0, false), "");
    }

    #[test]
    fn test_alpha_styles() {
        let options = CrossrefOptions::default().with_labels(LabelStyle::named("alpha a"));
        assert_eq!(label(&options, "fig", CrossrefOrder::new(1)), "a");
        assert_eq!(label(&options, "fig", CrossrefOrder::new(26)), "z");

        let options = CrossrefOptions::default().with_labels(LabelStyle::named("alpha A"));
        assert_eq!(label(&options, "fig", CrossrefOrder::new(3)), "C");
    }

    #[test]
    fn test_alpha_overflow_is_unguarded() {
        let options = CrossrefOptions::default().with_labels(LabelStyle::named("alpha a"));
        assert_eq!(label(&options, "fig", CrossrefOrder::new(27)), "{");
    }

    #[test]
    fn test_custom_label_list_cycles() {
        let options = CrossrefOptions::default()
            .with_type_labels("eq", LabelStyle::list(["*", "†", "‡"]));
        assert_eq!(label(&options, "eq", CrossrefOrder::new(1)), "*");
        assert_eq!(label(&options, "eq", CrossrefOrder::new(3)), "‡");
        assert_eq!(label(&options, "eq", CrossrefOrder::new(4)), "*");

        let order = CrossrefOrder::new(2).with_section([5]);
        assert_eq!(label(&options, "eq", order), "5.†");
    }

    #[test]
    fn test_empty_label_list_falls_back_to_number() {
        let options = CrossrefOptions::default().with_type_labels("eq", LabelStyle::List(vec![]));
        assert_eq!(label(&options, "eq", CrossrefOrder::new(2)), "2");
    }

    #[test]
    fn test_type_style_overrides_global() {
        let options = CrossrefOptions::default()
            .with_labels(LabelStyle::named("roman"))
            .with_type_labels("tbl", LabelStyle::named("arabic"));
        assert_eq!(label(&options, "tbl", CrossrefOrder::new(4)), "4");
        assert_eq!(label(&options, "fig", CrossrefOrder::new(4)), "IV");
    }

    #[test]
    fn test_subreference() {
        let options = CrossrefOptions::default();
        let parent = entry("fig:p", CrossrefOrder::new(1));
        let child = CrossrefEntry {
            parent: Some("fig:p".to_string()),
            ..entry("fig:p-a", CrossrefOrder::new(1))
        };
        assert_eq!(format_crossref("fig", &options, &child, Some(&parent)), "1 (a)");

        let second = entry("fig:p-b", CrossrefOrder::new(2));
        assert_eq!(format_crossref("fig", &options, &second, Some(&parent)), "1 (b)");
    }

    #[test]
    fn test_subreference_style_override() {
        let options =
            CrossrefOptions::default().with_type_labels("subref", LabelStyle::named("romani"));
        let parent = entry("fig:p", CrossrefOrder::new(3).with_section([2]));
        let child = entry("fig:p-c", CrossrefOrder::new(3));
        assert_eq!(
            format_crossref("fig", &options, &child, Some(&parent)),
            "2.3 (iii)"
        );
    }

    #[test]
    fn test_subreference_of_section() {
        let options = CrossrefOptions::default();
        let parent = entry("sec:intro", CrossrefOrder::new(1).with_section([1, 2]));
        let child = entry("fig:x", CrossrefOrder::new(2));
        assert_eq!(
            format_crossref("fig", &options, &child, Some(&parent)),
            "1.2 (b)"
        );
    }

    #[test]
    fn test_subreference_of_untyped_parent_uses_figure_labels() {
        let options =
            CrossrefOptions::default().with_type_labels("fig", LabelStyle::named("roman"));
        let parent = entry("my-thm:x", CrossrefOrder::new(4));
        let child = entry("my-thm:x-a", CrossrefOrder::new(1));
        assert_eq!(
            format_crossref("fig", &options, &child, Some(&parent)),
            "IV (a)"
        );
    }

    #[test]
    fn test_format_crossref_without_parent() {
        let options = CrossrefOptions::default();
        let fig = entry("fig:b", CrossrefOrder::new(1).with_section([2]));
        assert_eq!(format_crossref("fig", &options, &fig, None), "2.1");
    }

    #[test]
    fn test_offset_char_stays_total() {
        assert_eq!(offset_char('a', -100), char::REPLACEMENT_CHARACTER);
        assert_eq!(offset_char('\u{D7FF}', 1), char::REPLACEMENT_CHARACTER);
        assert_eq!(offset_char('a', 0), 'a');
    }
}
