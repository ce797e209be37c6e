use std::fmt::Write;

/// HTML-entity encode text the way the backup app's original exporter did:
/// the five markup characters by name (apostrophe numerically) and the
/// Latin-1 supplement as decimal references.
pub fn html_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\u{A0}'..='\u{FF}' => {
                let _ = write!(out, "&#{};", u32::from(ch));
            },
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("<b>&\"'", "&lt;b&gt;&amp;&quot;&#39;")]
    #[case("café", "caf&#233;")]
    #[case("\u{A0}ÿ", "&#160;&#255;")]
    #[case("€ Привет 😀", "€ Привет 😀")]
    #[case("", "")]
    fn encodes(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(html_encode(text), expected);
    }
}
