use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

/// Renders markdown to HTML with the same dialect the notes are written
/// in: GFM tables, strikethrough and task lists, single newlines as
/// `<br>`, headings carrying slugified `id` anchors.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let events = anchor_headings(soft_breaks_as_br(events));

    let mut html = String::with_capacity(markdown.len() * 2);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

fn soft_breaks_as_br(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .map(|ev| match ev {
            Event::SoftBreak => Event::Html(CowStr::Borrowed("<br>")),
            other => other,
        })
        .collect()
}

/// Gives each heading without an explicit id a slug derived from its
/// text, matching the anchors the web renderer produced.
fn anchor_headings(events: Vec<Event>) -> Vec<Event<'static>> {
    let mut out: Vec<Event<'static>> = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading {
                level,
                id: None,
                classes,
                attrs,
            }) => {
                let mut text = String::new();
                for ev in &events[i + 1..] {
                    match ev {
                        Event::Text(t) | Event::Code(t) => text.push_str(t),
                        Event::End(TagEnd::Heading(_)) => break,
                        _ => {}
                    }
                }
                out.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: Some(CowStr::from(slugify(&text))),
                    classes: classes.iter().map(|c| CowStr::from(c.to_string())).collect(),
                    attrs: attrs
                        .iter()
                        .map(|(k, v)| {
                            (
                                CowStr::from(k.to_string()),
                                v.as_ref().map(|v| CowStr::from(v.to_string())),
                            )
                        })
                        .collect(),
                }));
            }
            other => out.push(other.clone().into_static()),
        }
        i += 1;
    }
    out
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Converts the rich editor's HTML back to markdown. A tolerant
/// hand-written scanner: unknown tags are dropped keeping their text,
/// malformed input degrades to best-effort output, never a panic.
pub fn to_markdown(html: &str) -> String {
    let mut w = MarkdownWriter::new();
    let chars: Vec<char> = html.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '<' {
            if let Some((tag, end)) = parse_tag(&chars, i) {
                w.handle_tag(&tag);
                i = end;
                continue;
            }
            // Stray '<' with no closing '>': keep it literally.
            w.push_text("<");
            i += 1;
        } else if chars[i] == '&' {
            let (text, end) = decode_entity(&chars, i);
            w.push_text(&text);
            i = end;
        } else {
            // Raw newlines between tags are formatting, not content.
            if chars[i] != '\n' && chars[i] != '\r' {
                w.push_text(&chars[i].to_string());
            } else if w.in_code_block {
                w.push_text("\n");
            }
            i += 1;
        }
    }

    w.finish()
}

/// Plain-text extraction: tags stripped, block boundaries become
/// newlines, entities decoded. Feeds title derivation and snippets.
pub fn plain_text(html: &str) -> String {
    let chars: Vec<char> = html.chars().collect();
    let mut out = String::with_capacity(html.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '<' {
            if let Some((tag, end)) = parse_tag(&chars, i) {
                if tag.is_block() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                i = end;
                continue;
            }
            out.push('<');
            i += 1;
        } else if chars[i] == '&' {
            let (text, end) = decode_entity(&chars, i);
            out.push_str(&text);
            i = end;
        } else {
            if chars[i] != '\n' && chars[i] != '\r' {
                out.push(chars[i]);
            } else if !out.is_empty() && !out.ends_with('\n') && !out.ends_with(' ') {
                out.push(' ');
            }
            i += 1;
        }
    }

    out.trim().to_string()
}

#[derive(Debug)]
pub(crate) struct ParsedTag {
    pub(crate) name: String,
    pub(crate) closing: bool,
    pub(crate) attrs: Vec<(String, String)>,
}

impl ParsedTag {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn is_block(&self) -> bool {
        matches!(
            self.name.as_str(),
            "p" | "div"
                | "br"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "ul"
                | "ol"
                | "li"
                | "blockquote"
                | "pre"
                | "table"
                | "tr"
                | "hr"
        )
    }
}

/// Parses a tag starting at `start` (which must be '<'). Returns the
/// parsed tag and the index just past the closing '>', or None when the
/// tag never closes.
pub(crate) fn parse_tag(chars: &[char], start: usize) -> Option<(ParsedTag, usize)> {
    let mut i = start + 1;

    // Comments and doctype declarations: skip to '>' and drop.
    if matches!(chars.get(i), Some('!') | Some('?')) {
        while i < chars.len() && chars[i] != '>' {
            i += 1;
        }
        if i >= chars.len() {
            return None;
        }
        return Some((
            ParsedTag {
                name: String::new(),
                closing: false,
                attrs: Vec::new(),
            },
            i + 1,
        ));
    }

    let closing = chars.get(i) == Some(&'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    while i < chars.len() && (chars[i].is_ascii_alphanumeric()) {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let name: String = chars[name_start..i].iter().collect::<String>().to_lowercase();

    let mut attrs = Vec::new();
    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        match chars.get(i) {
            None => return None,
            Some('>') => {
                return Some((
                    ParsedTag {
                        name,
                        closing,
                        attrs,
                    },
                    i + 1,
                ))
            }
            Some('/') => {
                i += 1;
            }
            Some(_) => {
                let key_start = i;
                while i < chars.len()
                    && chars[i] != '='
                    && chars[i] != '>'
                    && !chars[i].is_whitespace()
                {
                    i += 1;
                }
                let key: String = chars[key_start..i].iter().collect::<String>().to_lowercase();
                let mut value = String::new();
                if chars.get(i) == Some(&'=') {
                    i += 1;
                    match chars.get(i) {
                        Some(&quote @ ('"' | '\'')) => {
                            i += 1;
                            while i < chars.len() && chars[i] != quote {
                                value.push(chars[i]);
                                i += 1;
                            }
                            i += 1; // past the quote
                        }
                        _ => {
                            while i < chars.len() && chars[i] != '>' && !chars[i].is_whitespace() {
                                value.push(chars[i]);
                                i += 1;
                            }
                        }
                    }
                }
                if !key.is_empty() {
                    attrs.push((key, value));
                }
            }
        }
    }
}

/// Decodes the entity starting at `start` ('&'). Unknown entities pass
/// through literally.
pub(crate) fn decode_entity(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start + 1;
    while end < chars.len() && end - start <= 8 && chars[end] != ';' {
        end += 1;
    }
    if chars.get(end) != Some(&';') {
        return ("&".to_string(), start + 1);
    }
    let name: String = chars[start + 1..end].iter().collect();
    let decoded = match name.as_str() {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "#39" | "apos" => "'",
        "nbsp" | "#160" => " ",
        _ => return ("&".to_string(), start + 1),
    };
    (decoded.to_string(), end + 1)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListKind {
    Bullet,
    Ordered(u32),
}

struct MarkdownWriter {
    out: String,
    list_stack: Vec<ListKind>,
    link_href: Option<String>,
    in_pre: bool,
    in_code_block: bool,
    in_blockquote: bool,
    at_line_start: bool,
    pending_blank: bool,
}

impl MarkdownWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            list_stack: Vec::new(),
            link_href: None,
            in_pre: false,
            in_code_block: false,
            in_blockquote: false,
            at_line_start: true,
            pending_blank: false,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush_separator();
        if self.out.is_empty() && text.trim().is_empty() {
            return;
        }
        self.out.push_str(text);
        self.at_line_start = text.ends_with('\n');
    }

    fn flush_separator(&mut self) {
        if self.pending_blank {
            self.pending_blank = false;
            if !self.out.is_empty() {
                while !self.out.ends_with("\n\n") {
                    self.out.push('\n');
                }
                if self.in_blockquote {
                    self.out.pop();
                    self.out.push_str("> ");
                }
            }
            self.at_line_start = true;
        }
    }

    fn newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.at_line_start = true;
    }

    fn block_break(&mut self) {
        self.pending_blank = true;
    }

    fn handle_tag(&mut self, tag: &ParsedTag) {
        if self.in_code_block && !(tag.name == "code" || tag.name == "pre") {
            // Markup inside a code block is content as far as the
            // markdown form is concerned; drop it quietly.
            return;
        }
        match (tag.name.as_str(), tag.closing) {
            ("p", false) | ("div", false) => self.block_break(),
            ("p", true) | ("div", true) => self.block_break(),
            ("br", _) => {
                self.flush_separator();
                self.newline();
                if self.in_blockquote {
                    self.out.push_str("> ");
                }
            }
            (h @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6"), false) => {
                self.block_break();
                self.flush_separator();
                let level = h.as_bytes()[1] - b'0';
                for _ in 0..level {
                    self.out.push('#');
                }
                self.out.push(' ');
                self.at_line_start = false;
            }
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", true) => self.block_break(),
            ("strong" | "b", _) => self.push_inline("**"),
            ("em" | "i", _) => self.push_inline("*"),
            // Strikethrough from any of the three rich-text spellings.
            ("del" | "s" | "strike", _) => self.push_inline("~~"),
            ("ul", false) => {
                self.block_break();
                self.list_stack.push(ListKind::Bullet);
            }
            ("ol", false) => {
                self.block_break();
                self.list_stack.push(ListKind::Ordered(0));
            }
            ("ul" | "ol", true) => {
                self.list_stack.pop();
                self.block_break();
            }
            ("li", false) => {
                self.flush_separator();
                self.newline();
                let depth = self.list_stack.len().saturating_sub(1);
                for _ in 0..depth {
                    self.out.push_str("  ");
                }
                match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        *n += 1;
                        let n = *n;
                        self.out.push_str(&format!("{}. ", n));
                    }
                    _ => self.out.push_str("- "),
                }
                self.at_line_start = false;
            }
            ("li", true) => {}
            ("blockquote", false) => {
                self.block_break();
                self.flush_separator();
                self.out.push_str("> ");
                self.in_blockquote = true;
                self.at_line_start = false;
            }
            ("blockquote", true) => {
                self.in_blockquote = false;
                self.block_break();
            }
            ("pre", false) => {
                self.block_break();
                self.flush_separator();
                self.in_pre = true;
            }
            ("pre", true) => {
                self.in_pre = false;
                if self.in_code_block {
                    // Unclosed <code> inside <pre>; close the fence anyway.
                    self.newline();
                    self.out.push_str("```");
                    self.in_code_block = false;
                }
                self.block_break();
            }
            ("code", false) => {
                if self.in_pre {
                    let lang = tag
                        .attr("class")
                        .and_then(|c| c.strip_prefix("language-").map(String::from))
                        .unwrap_or_default();
                    self.out.push_str(&format!("```{}\n", lang));
                    self.in_code_block = true;
                    self.at_line_start = true;
                } else {
                    self.push_inline("`");
                }
            }
            ("code", true) => {
                if self.in_code_block {
                    self.newline();
                    self.out.push_str("```");
                    self.in_code_block = false;
                } else {
                    self.push_inline("`");
                }
            }
            ("a", false) => {
                self.flush_separator();
                self.link_href = tag.attr("href").map(String::from);
                self.out.push('[');
                self.at_line_start = false;
            }
            ("a", true) => {
                let href = self.link_href.take().unwrap_or_default();
                self.out.push_str(&format!("]({})", href));
            }
            ("img", false) => {
                self.flush_separator();
                let alt = tag.attr("alt").unwrap_or("");
                let src = tag.attr("src").unwrap_or("");
                self.out.push_str(&format!("![{}]({})", alt, src));
                self.at_line_start = false;
            }
            ("hr", false) => {
                self.block_break();
                self.flush_separator();
                self.out.push_str("---");
                self.block_break();
            }
            // mark, span, font and anything unknown: keep the text only.
            _ => {}
        }
    }

    fn push_inline(&mut self, marker: &str) {
        self.flush_separator();
        self.out.push_str(marker);
        self.at_line_start = false;
    }

    fn finish(mut self) -> String {
        if self.in_code_block {
            self.newline();
            self.out.push_str("```");
        }
        // Collapse runs of blank lines left by adjacent block tags.
        let mut cleaned = String::with_capacity(self.out.len());
        let mut newlines = 0;
        for ch in self.out.chars() {
            if ch == '\n' {
                newlines += 1;
                if newlines <= 2 {
                    cleaned.push(ch);
                }
            } else {
                newlines = 0;
                cleaned.push(ch);
            }
        }
        cleaned.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = to_html("**bold** and *italic*");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn renders_strikethrough() {
        let html = to_html("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn soft_breaks_become_br() {
        let html = to_html("line one\nline two");
        assert!(html.contains("line one<br>line two"));
    }

    #[test]
    fn headings_get_slug_anchors() {
        let html = to_html("## Meeting Notes: Q2!");
        assert!(html.contains(r#"<h2 id="meeting-notes-q2">"#), "{}", html);
    }

    #[test]
    fn renders_task_lists_and_tables() {
        let html = to_html("- [x] done\n- [ ] open");
        assert!(html.contains("checkbox"));

        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn slugify_drops_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("Ünïcode Héading"), "ünïcode-héading");
    }

    #[test]
    fn markdown_from_paragraphs() {
        let md = to_markdown("<p>first</p><p>second</p>");
        assert_eq!(md, "first\n\nsecond");
    }

    #[test]
    fn markdown_from_headings() {
        let md = to_markdown("<h1>Title</h1><h3>Sub</h3><p>body</p>");
        assert_eq!(md, "# Title\n\n### Sub\n\nbody");
    }

    #[test]
    fn markdown_from_inline_styles() {
        let md = to_markdown("<p><strong>bold</strong> and <em>soft</em></p>");
        assert_eq!(md, "**bold** and *soft*");
    }

    #[test]
    fn strikethrough_from_all_three_tags() {
        assert_eq!(to_markdown("<p><del>a</del></p>"), "~~a~~");
        assert_eq!(to_markdown("<p><s>b</s></p>"), "~~b~~");
        assert_eq!(to_markdown("<p><strike>c</strike></p>"), "~~c~~");
    }

    #[test]
    fn strikethrough_round_trips() {
        let md = to_markdown(&to_html("some ~~struck~~ text"));
        assert_eq!(md, "some ~~struck~~ text");
    }

    #[test]
    fn markdown_from_lists() {
        let md = to_markdown("<ul><li>one</li><li>two</li></ul>");
        assert_eq!(md, "- one\n- two");

        let md = to_markdown("<ol><li>first</li><li>second</li></ol>");
        assert_eq!(md, "1. first\n2. second");
    }

    #[test]
    fn markdown_from_links_and_images() {
        let md = to_markdown(r#"<p><a href="https://example.com">site</a></p>"#);
        assert_eq!(md, "[site](https://example.com)");

        let md = to_markdown(r#"<p><img src="/uploads/x.png" alt="shot"></p>"#);
        assert_eq!(md, "![shot](/uploads/x.png)");
    }

    #[test]
    fn markdown_from_code_block_with_language() {
        let md = to_markdown(
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>",
        );
        assert_eq!(md, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn markdown_from_inline_code() {
        let md = to_markdown("<p>run <code>cargo doc</code> now</p>");
        assert_eq!(md, "run `cargo doc` now");
    }

    #[test]
    fn markdown_from_blockquote() {
        let md = to_markdown("<blockquote>wise words</blockquote>");
        assert_eq!(md, "> wise words");
    }

    #[test]
    fn unknown_tags_keep_their_text() {
        let md = to_markdown("<p><span style=\"color:red\">warm</span> text</p>");
        assert_eq!(md, "warm text");
    }

    #[test]
    fn entities_decode() {
        let md = to_markdown("<p>a &amp; b &lt;ok&gt;</p>");
        assert_eq!(md, "a & b <ok>");
    }

    #[test]
    fn malformed_html_never_panics() {
        for input in [
            "<p>unclosed",
            "<<<>>>",
            "<p attr=>x</p>",
            "text < 5 and > 2",
            "<a href=\"unterminated>link</a>",
            "&brokenentity text",
        ] {
            let _ = to_markdown(input);
            let _ = plain_text(input);
        }
    }

    #[test]
    fn plain_text_round_trip_preserves_words() {
        let original = "Shopping list\nmilk and eggs";
        let html = to_html(original);
        let md = to_markdown(&html);
        assert_eq!(plain_text(&to_html(&md)), plain_text(&html));
    }

    #[test]
    fn plain_text_strips_tags_and_decodes() {
        assert_eq!(
            plain_text("<h1>Title</h1><p>body &amp; soul</p>"),
            "Title\nbody & soul"
        );
    }

    #[test]
    fn plain_text_of_script_markup_is_inert() {
        assert_eq!(plain_text("<script>alert(1)</script>"), "alert(1)");
    }
}
