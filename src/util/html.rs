//! Text helpers shared by the page renderers.

/// Escape text for use in element content or a quoted attribute value.
pub fn escape(s: &str) -> String {
    html_escape::encode_quoted_attribute(s).into_owned()
}

/// Escape, then turn line breaks into `<br>`.
pub fn escape_multiline(s: &str) -> String {
    escape(&s.replace("\r\n", "\n")).replace('\n', "<br>")
}

/// `1234567` becomes `1,234,567`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Listing price as shown to visitors. No price, or zero, means the provider
/// quotes on request.
pub fn format_price(price: Option<i64>) -> String {
    match price {
        Some(p) if p != 0 => format!("UGX {}", thousands(p)),
        _ => "Contact for Quote".to_string(),
    }
}

/// URL query component encoding for the few links built from user data.
pub fn encode_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        let out = escape(r#"<script>alert("x")</script> & 'y'"#);
        assert!(out.starts_with("&lt;script&gt;alert(&quot;x&quot;)"));
        assert!(out.contains(" &amp; "));
        assert!(!out.contains(['<', '>', '"', '\'']));
    }

    #[test]
    fn multiline_breaks_after_escaping() {
        assert_eq!(escape_multiline("a<b\nc"), "a&lt;b<br>c");
    }

    #[test]
    fn price_rendering() {
        assert_eq!(format_price(None), "Contact for Quote");
        assert_eq!(format_price(Some(0)), "Contact for Quote");
        assert_eq!(format_price(Some(500)), "UGX 500");
        assert_eq!(format_price(Some(15000)), "UGX 15,000");
        assert_eq!(format_price(Some(1234567)), "UGX 1,234,567");
    }

    #[test]
    fn thousands_handles_edges() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(-45000), "-45,000");
    }

    #[test]
    fn query_encoding() {
        assert_eq!(encode_query("a b&c"), "a%20b%26c");
    }
}
