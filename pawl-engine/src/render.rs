//! Human-readable rendering of parameterized statements.
//!
//! Output is for display only. Execution always binds parameters; nothing
//! produced here is ever sent to the database.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Matches `$n` positional placeholders.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)").unwrap());

/// Replace each `$n` placeholder with a quoted literal for display.
///
/// Placeholders with no matching argument are left untouched; `None`
/// arguments render as `null`.
pub fn substitute(sql: &str, args: &[Option<String>]) -> String {
    PLACEHOLDER
        .replace_all(sql, |caps: &regex_lite::Captures<'_>| {
            let index = match caps[1].parse::<usize>() {
                Ok(n) if (1..=args.len()).contains(&n) => n - 1,
                _ => return caps[0].to_string(),
            };
            match &args[index] {
                Some(value) => quote_literal(value),
                None => "null".to_string(),
            }
        })
        .into_owned()
}

/// Quote a literal for display, escaping anything outside a small safe set.
///
/// Alphanumerics, spaces, `/`, `.` and `_` pass through; every other
/// character becomes a hex or unicode escape and the literal is wrapped in
/// the escape-aware `E'...'` form.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    let mut escaped = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, ' ' | '/' | '.' | '_') {
            out.push(c);
        } else {
            escaped = true;
            let code = c as u32;
            if code < 0x80 {
                out.push_str(&format!("\\x{code:02X}"));
            } else if code < 0x10000 {
                out.push_str(&format!("\\u{code:04X}"));
            } else {
                out.push_str(&format!("\\U{code:08X}"));
            }
        }
    }

    if escaped {
        format!("E'{out}'")
    } else {
        format!("'{out}'")
    }
}
