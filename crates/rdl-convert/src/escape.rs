//! Markup escape codec.
//!
//! The document format stores attribute values and element text with the
//! usual XML named entities plus decimal character references for control
//! characters. Element and attribute *names* are never escaped; callers must
//! supply valid identifiers.

use std::borrow::Cow;

use crate::error::{ConvertError, ConvertResult};

/// Longest entity body we accept between `&` and `;` (`#x10FFFF` is 8).
const MAX_ENTITY_LEN: usize = 10;

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"') || (c as u32) < 0x20
}

/// Escape text for use as element content or an attribute value.
///
/// `&`, `<`, `>` and `"` become named entities; control characters below
/// U+0020 (including tab, LF and CR, which would otherwise be normalized
/// away inside attributes) become decimal character references. Returns the
/// input unchanged (borrowed) when nothing needs escaping.
pub fn xml_escape(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c if (c as u32) < 0x20 => {
                out.push_str("&#");
                out.push_str(&(c as u32).to_string());
                out.push(';');
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode escaped element content or attribute text.
///
/// Accepts the five named entities (`amp`, `lt`, `gt`, `quot`, `apos`) and
/// decimal/hex character references. An unterminated or unrecognized entity
/// is a [`ConvertError::BadEntity`].
pub fn xml_unescape(s: &str) -> ConvertResult<String> {
    if !s.contains('&') {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        let end = match rest.find(';') {
            Some(end) if end <= MAX_ENTITY_LEN => end,
            _ => {
                return Err(ConvertError::BadEntity {
                    entity: rest.chars().take(MAX_ENTITY_LEN).collect(),
                })
            }
        };
        let entity = &rest[..end];
        rest = &rest[end + 1..];

        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => out.push(decode_char_ref(entity)?),
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn decode_char_ref(entity: &str) -> ConvertResult<char> {
    let bad = || ConvertError::BadEntity {
        entity: entity.to_string(),
    };

    let digits = entity.strip_prefix('#').ok_or_else(bad)?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| bad())?,
        None => digits.parse::<u32>().map_err(|_| bad())?,
    };
    char::from_u32(code).ok_or(ConvertError::BadCodePoint { code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(xml_escape("Report page 1"), Cow::Borrowed(_)));
    }

    #[test]
    fn special_characters_escape() {
        assert_eq!(
            xml_escape(r#"a < b && c > "d""#),
            "a &lt; b &amp;&amp; c &gt; &quot;d&quot;"
        );
    }

    #[test]
    fn control_characters_become_decimal_refs() {
        assert_eq!(xml_escape("line1\r\nline2\t"), "line1&#13;&#10;line2&#9;");
    }

    #[test]
    fn named_and_numeric_entities_decode() {
        assert_eq!(
            xml_unescape("&lt;&gt;&amp;&quot;&apos;&#65;&#x42;").unwrap(),
            "<>&\"'AB"
        );
    }

    #[test]
    fn unterminated_entity_is_rejected() {
        assert!(matches!(
            xml_unescape("broken &amp"),
            Err(ConvertError::BadEntity { .. })
        ));
    }

    #[test]
    fn unknown_entity_is_rejected() {
        assert!(matches!(
            xml_unescape("&copy;"),
            Err(ConvertError::BadEntity { .. })
        ));
    }

    #[test]
    fn surrogate_code_point_is_rejected() {
        assert!(matches!(
            xml_unescape("&#xD800;"),
            Err(ConvertError::BadCodePoint { .. })
        ));
    }

    proptest! {
        #[test]
        fn escape_roundtrip(s in "\\PC*") {
            let escaped = xml_escape(&s);
            prop_assert_eq!(xml_unescape(&escaped).unwrap(), s);
        }

        #[test]
        fn escape_roundtrip_with_controls(s in proptest::collection::vec(0u32..0x80, 0..64)) {
            let s: String = s.into_iter().filter_map(char::from_u32).collect();
            let escaped = xml_escape(&s);
            prop_assert_eq!(xml_unescape(&escaped).unwrap(), s);
        }
    }
}
