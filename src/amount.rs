use std::sync::OnceLock;

use regex::Regex;

// Separators that stand in for a decimal point or a thousands group in
// statements exported through OCR or a mangled encoding.
const SEPARATORS: &str = ",:;\u{00B7}";

fn decimal_tail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,:;\x{00B7}](\d{2})$").expect("valid regex"))
}

fn thousands_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,3})[,:;\x{00B7}](\d{3})(\D|$)").expect("valid regex"))
}

/// Repair the raw text of an amount cell into something `f64` can parse.
///
/// Order matters: the two-digit decimal tail is rewritten before thousands
/// groups are collapsed, so `1,23` stays `1.23` instead of becoming `123`.
pub fn repair_amount(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || SEPARATORS.contains(*c))
        .collect();

    let mut s = decimal_tail_re().replace(&stripped, ".$1").into_owned();

    // Non-overlapping matches, so `1,234,567` needs a second pass.
    loop {
        let next = thousands_re().replace_all(&s, "$1$2$3").into_owned();
        if next == s {
            break;
        }
        s = next;
    }
    s
}

/// Repair and parse an amount; `None` means the row is not a transaction.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let repaired = repair_amount(raw);
    if repaired.is_empty() {
        return None;
    }
    repaired.parse::<f64>().ok().filter(|v| v.is_finite())
}
