//! HTML tag stripping and entity unescaping for field text.

/// Strips HTML tags from `val` and unescapes HTML entities in what remains.
///
/// A `<` only opens tag mode when immediately followed by `/` or an ASCII
/// letter; any other `<` (e.g. a bare "3 < 5") is preserved as text. Tag mode
/// consumes everything up to and including the next `>`, discarding
/// attributes along with the tag name. This is the stricter of the two
/// variants the source carried; see the design notes on why it was chosen.
pub fn strip_html(val: &str) -> String {
    let chars: Vec<char> = val.chars().collect();
    let mut out = String::with_capacity(val.len());
    let mut in_tag = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_tag {
            if c == '>' {
                in_tag = false;
            }
            i += 1;
            continue;
        }

        if c == '<' {
            let opens_tag = chars
                .get(i + 1)
                .is_some_and(|&next| next == '/' || next.is_ascii_alphabetic());

            if opens_tag {
                in_tag = true;
                i += 1;
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    unescape_entities(&out)
}

/// Unescapes the common named HTML entities plus decimal and hex numeric
/// character references. Not a full HTML5 entity table, but covers the
/// entities that show up in real document text.
fn unescape_entities(val: &str) -> String {
    let mut out = String::with_capacity(val.len());
    let bytes: Vec<char> = val.chars().collect();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == '&' {
            if let Some((replacement, consumed)) = match_entity(&bytes[i..]) {
                out.push_str(&replacement);
                i += consumed;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    out
}

fn match_entity(rest: &[char]) -> Option<(String, usize)> {
    let semi = rest.iter().position(|&c| c == ';')?;
    if semi == 0 || semi > 10 {
        return None;
    }
    let entity: String = rest[1..semi].iter().collect();
    let consumed = semi + 1;

    if let Some(stripped) = entity.strip_prefix('#') {
        let code = if let Some(hex) = stripped.strip_prefix('x').or_else(|| stripped.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            stripped.parse::<u32>().ok()?
        };
        let ch = char::from_u32(code)?;
        return Some((ch.to_string(), consumed));
    }

    let replacement = match entity.as_str() {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        _ => return None,
    };

    Some((replacement.to_string(), consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("<b>bold</b>", "bold")]
    #[case("<p>para</p><p>two</p>", "paratwo")]
    #[case("plain text", "plain text")]
    #[case("3 < 5 and 5 > 3", "3 < 5 and 5 > 3")]
    #[case("<img src=\"x.png\">caption", "caption")]
    fn strips_tags(#[case] input: &str, #[case] expected: &str) {
        check!(strip_html(input) == expected);
    }

    #[test]
    fn unescapes_entities() {
        check!(strip_html("Tom &amp; Jerry") == "Tom & Jerry");
        check!(strip_html("O&#39;Niel") == "O'Niel");
        check!(strip_html("quarter &#x2d;") == "quarter -");
    }

    #[test]
    fn preserves_angle_bracket_not_opening_a_tag() {
        check!(strip_html("<3 heart") == "<3 heart");
    }
}
