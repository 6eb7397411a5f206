// src/ingest/mod.rs
pub mod providers;
pub mod types;

/// Normalize text pulled from remote payloads: decode entities, strip tags,
/// collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1000 chars
    if out.chars().count() > 1000 {
        out = out.chars().take(1000).collect();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_decodes_entities_and_collapses_ws() {
        let s = "  Hello,&nbsp;&nbsp; world!  ";
        assert_eq!(normalize_text(s), "Hello, world!");
    }

    #[test]
    fn normalize_text_strips_tags() {
        let s = "<p>Fed cuts rates</p><a href=\"x\">link</a>";
        assert_eq!(normalize_text(s), "Fed cuts rates link");
    }

    #[test]
    fn normalize_text_normalizes_curly_quotes() {
        let s = "\u{201C}soft landing\u{201D} isn\u{2019}t here";
        assert_eq!(normalize_text(s), "\"soft landing\" isn't here");
    }

    #[test]
    fn normalize_text_caps_length() {
        let s = "x".repeat(5_000);
        assert_eq!(normalize_text(&s).chars().count(), 1000);
    }
}
