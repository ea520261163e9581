use regex::RegexBuilder;

use crate::convert::plain_text;
use crate::format::escape_html;

pub const SNIPPET_MAX_LEN: usize = 200;

/// Builds a search-result snippet from note HTML: plain-text window
/// centered on the first case-insensitive keyword match, ellipses on
/// clipped edges, every occurrence inside the window wrapped in
/// `<mark>` after escaping.
pub fn search_snippet(html: &str, keyword: &str, max_len: usize) -> String {
    let plain = plain_text(html);
    let chars: Vec<char> = plain.chars().collect();

    let window = match find_ci(&plain, keyword) {
        Some(pos) => {
            let start = pos.saturating_sub(max_len / 2);
            let end = (start + max_len).min(chars.len());
            let mut text: String = chars[start..end].iter().collect();
            if start > 0 {
                text = format!("...{}", text);
            }
            if end < chars.len() {
                text = format!("{}...", text);
            }
            text
        }
        None => {
            let mut text: String = chars.iter().take(max_len).collect();
            if chars.len() > max_len {
                text.push_str("...");
            }
            return escape_html(&text);
        }
    };

    highlight(&window, keyword)
}

/// Escapes the text, then wraps every case-insensitive occurrence of
/// the keyword in `<mark>`. Escaping comes first so the markers are the
/// only live markup in the output.
pub fn highlight(text: &str, keyword: &str) -> String {
    let escaped = escape_html(text);
    if keyword.trim().is_empty() {
        return escaped;
    }
    let pattern = regex::escape(&escape_html(keyword));
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(_) => return escaped,
    };
    re.replace_all(&escaped, "<mark>$0</mark>").into_owned()
}

/// First case-insensitive match position, in chars of the original
/// text. Compares lowercased per char so one-to-many lowercasings
/// (e.g. 'İ') cannot shift the reported position.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() || needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| {
        hay[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(h, n)| chars_eq_ci(*h, *n))
    })
}

fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
