// piiguard/src/ui/output.rs
//! Status messages on stderr and tables on stdout.

use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use is_terminal::IsTerminal;
use owo_colors::{AnsiColors, OwoColorize};
use piiguard_core::{CompiledPattern, RiskSummary, Span};

use crate::ui::theme::{ThemeEntry, ThemeMap};

fn paint(text: &str, entry: ThemeEntry, theme: &ThemeMap, enable_colors: bool) -> String {
    if !enable_colors {
        return text.to_string();
    }
    let color = theme
        .get(&entry)
        .and_then(|style| style.fg.as_ref())
        .map(|c| c.to_ansi_color())
        .unwrap_or(AnsiColors::White);
    text.color(color).to_string()
}

pub fn print_message<W: Write>(
    writer: &mut W,
    prefix: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    enable_colors: bool,
) -> io::Result<()> {
    writeln!(writer, "{} {}", paint(prefix, entry, theme, enable_colors), msg)
}

pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), "info:", msg.as_ref(), ThemeEntry::Info, theme, color);
}

pub fn success_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), "ok:", msg.as_ref(), ThemeEntry::Success, theme, color);
}

pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), "warning:", msg.as_ref(), ThemeEntry::Warn, theme, color);
}

pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let color = io::stderr().is_terminal();
    let _ = print_message(&mut io::stderr(), "error:", msg.as_ref(), ThemeEntry::Error, theme, color);
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// One row per span, in the order given.
pub fn detections_table(spans: &[Span], theme: &ThemeMap, enable_colors: bool) -> Table {
    let mut table = new_table(vec!["Type", "Text", "Start", "End", "Confidence", "Method"]);
    for span in spans {
        table.add_row(vec![
            paint(&span.entity_type, ThemeEntry::EntityType, theme, enable_colors),
            span.matched_text.clone(),
            span.start.to_string(),
            span.end.to_string(),
            paint(&format!("{:.2}", span.confidence), ThemeEntry::Confidence, theme, enable_colors),
            span.method.to_string(),
        ]);
    }
    table
}

pub fn risk_summary_line(summary: &RiskSummary, theme: &ThemeMap, enable_colors: bool) -> String {
    format!(
        "{} HIPAA {} / GDPR {} / PCI {}",
        paint("Risk:", ThemeEntry::Header, theme, enable_colors),
        summary.hipaa_relevant,
        summary.gdpr_relevant,
        summary.pci_relevant
    )
}

pub fn patterns_table(patterns: &[CompiledPattern], theme: &ThemeMap, enable_colors: bool) -> Table {
    let mut table = new_table(vec!["Name", "Validator", "Confidence", "Pattern"]);
    for pattern in patterns {
        table.add_row(vec![
            paint(&pattern.name, ThemeEntry::EntityType, theme, enable_colors),
            pattern.validator.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            paint(&format!("{:.2}", pattern.confidence), ThemeEntry::Confidence, theme, enable_colors),
            pattern.regex.as_str().to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;
    use piiguard_core::DetectionMethod;

    #[test]
    fn plain_message_has_no_escape_codes() {
        let theme = ThemeStyle::default_theme_map();
        let mut out = Vec::new();
        print_message(&mut out, "error:", "boom", ThemeEntry::Error, &theme, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "error: boom\n");
    }

    #[test]
    fn coloured_message_wraps_prefix() {
        let theme = ThemeStyle::default_theme_map();
        let mut out = Vec::new();
        print_message(&mut out, "error:", "boom", ThemeEntry::Error, &theme, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{1b}'));
        assert!(text.ends_with(" boom\n"));
    }

    #[test]
    fn detections_table_lists_spans() {
        let spans = vec![Span {
            entity_type: "EMAIL".into(),
            matched_text: "a@b.co".into(),
            start: 0,
            end: 6,
            confidence: 0.99,
            method: DetectionMethod::Regex,
        }];
        let theme = ThemeStyle::default_theme_map();
        let rendered = detections_table(&spans, &theme, false).to_string();
        assert!(rendered.contains("EMAIL"));
        assert!(rendered.contains("0.99"));
        assert!(rendered.contains("regex"));
        assert!(!rendered.contains('\u{1b}'));
    }

    #[test]
    fn tables_paint_type_and_confidence_from_theme() {
        let spans = vec![Span {
            entity_type: "SSN".into(),
            matched_text: "123-45-6789".into(),
            start: 5,
            end: 16,
            confidence: 1.0,
            method: DetectionMethod::Regex,
        }];
        let theme = ThemeStyle::default_theme_map();
        let rendered = detections_table(&spans, &theme, true).to_string();
        assert!(rendered.contains(&paint("SSN", ThemeEntry::EntityType, &theme, true)));
        assert!(rendered.contains(&paint("1.00", ThemeEntry::Confidence, &theme, true)));
        assert!(rendered.contains("123-45-6789"));
    }
}
