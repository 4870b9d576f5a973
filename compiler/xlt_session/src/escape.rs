//! Escaping of string literals for the generated C++-family source.

use std::fmt::Write;

/// Decides whether literal text can be emitted inline and escapes it.
pub trait TextEscaper {
    /// Whether every character of `text` can appear in an emitted literal.
    fn has_valid_cpp_characters(&self, text: &str) -> bool;

    /// Body of a double-quoted literal for `text`, without the quotes.
    fn escape_string_literal(&self, text: &str) -> String;
}

/// Default escaper for Objective-C/C++ string literals.
///
/// Text containing NUL or a control character other than `\n`, `\r` and
/// `\t` is rejected. Non-ASCII characters are written as universal
/// character names.
#[derive(Copy, Clone, Debug, Default)]
pub struct CppEscaper;

impl TextEscaper for CppEscaper {
    fn has_valid_cpp_characters(&self, text: &str) -> bool {
        !text
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    }

    fn escape_string_literal(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            let code = u32::from(c);
            // Writing to a String cannot fail.
            let _ = match c {
                '\\' => out.write_str("\\\\"),
                '"' => out.write_str("\\\""),
                '\n' => out.write_str("\\n"),
                '\r' => out.write_str("\\r"),
                '\t' => out.write_str("\\t"),
                c if c.is_ascii_control() => write!(out, "\\{code:03o}"),
                c if c.is_ascii() => out.write_char(c),
                _ if code <= 0xFFFF => write!(out, "\\u{code:04X}"),
                _ => write!(out, "\\U{code:08X}"),
            };
        }
        out
    }
}
