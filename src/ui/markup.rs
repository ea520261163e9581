//! Translates the renderer's HTML markup into styled terminal lines.
//! Block tags break lines, `<mark>` becomes a highlight, badges take
//! their server-assigned colors, entities decode to text.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::convert::{decode_entity, parse_tag, ParsedTag};

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

pub fn lines(html: &str) -> Vec<Line<'static>> {
    let chars: Vec<char> = html.chars().collect();
    let mut out: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut styles: Vec<Style> = vec![Style::default()];
    let mut i = 0;

    let flush_text =
        |text: &mut String, current: &mut Vec<Span<'static>>, styles: &[Style]| {
            if !text.is_empty() {
                let style = styles.last().copied().unwrap_or_default();
                current.push(Span::styled(std::mem::take(text), style));
            }
        };
    let break_line = |text: &mut String,
                      current: &mut Vec<Span<'static>>,
                      out: &mut Vec<Line<'static>>,
                      styles: &[Style]| {
        if !text.is_empty() {
            let style = styles.last().copied().unwrap_or_default();
            current.push(Span::styled(std::mem::take(text), style));
        }
        if !current.is_empty() {
            out.push(Line::from(std::mem::take(current)));
        }
    };

    while i < chars.len() {
        match chars[i] {
            '<' => {
                let Some((tag, end)) = parse_tag(&chars, i) else {
                    text.push('<');
                    i += 1;
                    continue;
                };
                i = end;
                handle_tag(
                    &tag,
                    &mut styles,
                    &mut text,
                    &mut current,
                    &mut out,
                    &flush_text,
                    &break_line,
                );
            }
            '&' => {
                let (decoded, end) = decode_entity(&chars, i);
                text.push_str(&decoded);
                i = end;
            }
            '\n' | '\r' => {
                i += 1;
            }
            ch => {
                text.push(ch);
                i += 1;
            }
        }
    }
    break_line(&mut text, &mut current, &mut out, &styles);
    out
}

#[allow(clippy::too_many_arguments)]
fn handle_tag(
    tag: &ParsedTag,
    styles: &mut Vec<Style>,
    text: &mut String,
    current: &mut Vec<Span<'static>>,
    out: &mut Vec<Line<'static>>,
    flush_text: &impl Fn(&mut String, &mut Vec<Span<'static>>, &[Style]),
    break_line: &impl Fn(&mut String, &mut Vec<Span<'static>>, &mut Vec<Line<'static>>, &[Style]),
) {
    let base = *styles.last().unwrap_or(&Style::default());
    let name = tag.name.as_str();

    if tag.closing {
        match name {
            "p" | "div" | "blockquote" | "ul" | "ol" | "li" | "pre" | "table" | "tr" => {
                break_line(text, current, out, styles);
            }
            n if HEADING_TAGS.contains(&n) => {
                break_line(text, current, out, styles);
                if styles.len() > 1 {
                    styles.pop();
                }
            }
            "strong" | "b" | "em" | "i" | "del" | "s" | "strike" | "mark" | "code" | "span"
            | "a" => {
                flush_text(text, current, styles);
                if styles.len() > 1 {
                    styles.pop();
                }
            }
            _ => {}
        }
        return;
    }

    match name {
        "br" => break_line(text, current, out, styles),
        "p" | "div" | "ul" | "ol" | "table" | "tr" | "pre" => {
            break_line(text, current, out, styles)
        }
        "li" => {
            break_line(text, current, out, styles);
            text.push_str("• ");
        }
        "blockquote" => {
            break_line(text, current, out, styles);
            text.push_str("▌ ");
        }
        "hr" => {
            break_line(text, current, out, styles);
            out.push(Line::from("─".repeat(20)));
        }
        n if HEADING_TAGS.contains(&n) => {
            break_line(text, current, out, styles);
            styles.push(base.add_modifier(Modifier::BOLD));
        }
        "strong" | "b" => {
            flush_text(text, current, styles);
            styles.push(base.add_modifier(Modifier::BOLD));
        }
        "em" | "i" => {
            flush_text(text, current, styles);
            styles.push(base.add_modifier(Modifier::ITALIC));
        }
        "del" | "s" | "strike" => {
            flush_text(text, current, styles);
            styles.push(base.add_modifier(Modifier::CROSSED_OUT));
        }
        "code" => {
            flush_text(text, current, styles);
            styles.push(base.fg(Color::Cyan));
        }
        "mark" => {
            flush_text(text, current, styles);
            styles.push(Style::default().fg(Color::Black).bg(Color::Yellow));
        }
        "a" => {
            flush_text(text, current, styles);
            styles.push(base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED));
        }
        "span" => {
            flush_text(text, current, styles);
            let style = match badge_style(tag) {
                Some(style) => style,
                None => base,
            };
            // Swatches carry no text of their own; render the block
            // glyph directly.
            if has_class(tag, "color-swatch") {
                current.push(Span::styled("■ ", style));
            }
            styles.push(style);
        }
        "img" => {
            let alt = tag.attr("alt").unwrap_or("image");
            text.push_str(&format!("[{}]", alt));
        }
        _ => {}
    }
}

fn has_class(tag: &ParsedTag, class: &str) -> bool {
    tag.attr("class")
        .map(|c| c.split_whitespace().any(|part| part == class))
        .unwrap_or(false)
}

/// Badges and swatches carry their color inline:
/// `style="background-color: #rrggbb;"`.
fn badge_style(tag: &ParsedTag) -> Option<Style> {
    let style_attr = tag.attr("style")?;
    let color = parse_style_color(style_attr)?;
    if has_class(tag, "tag-badge") || has_class(tag, "area-badge") {
        Some(Style::default().fg(color).add_modifier(Modifier::BOLD))
    } else if has_class(tag, "color-swatch") {
        Some(Style::default().fg(color))
    } else {
        None
    }
}

fn parse_style_color(style: &str) -> Option<Color> {
    let value = style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(prop, _)| prop.trim() == "background-color")
        .map(|(_, v)| v.trim())?;
    parse_hex_color(value)
}

pub fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn block_tags_break_lines() {
        let ls = lines("<p>first</p><p>second</p>");
        assert_eq!(flat(&ls), vec!["first", "second"]);
    }

    #[test]
    fn mark_gets_highlight_style() {
        let ls = lines("<p>about <mark>rust</mark> here</p>");
        let spans = &ls[0].spans;
        let marked = spans.iter().find(|s| s.content == "rust").unwrap();
        assert_eq!(marked.style.bg, Some(Color::Yellow));
        assert_eq!(marked.style.fg, Some(Color::Black));
    }

    #[test]
    fn badge_color_comes_from_style_attr() {
        let ls = lines(
            r#"<span class="tag-badge" style="background-color: #10b981;">urgent</span>"#,
        );
        let span = ls[0].spans.iter().find(|s| s.content == "urgent").unwrap();
        assert_eq!(span.style.fg, Some(Color::Rgb(0x10, 0xb9, 0x81)));
    }

    #[test]
    fn swatch_renders_a_colored_block() {
        let ls = lines(
            r#"<span class="color-swatch" style="background-color: #ff0000;"></span><span>Work: 3</span>"#,
        );
        let text: String = ls[0].spans.iter().map(|s| s.content.as_ref()).collect::<String>();
        assert!(text.contains('■'));
        assert!(text.contains("Work: 3"));
    }

    #[test]
    fn entities_decode_into_text() {
        let ls = lines("<p>a &amp; b &lt;tag&gt;</p>");
        assert_eq!(flat(&ls), vec!["a & b <tag>"]);
    }

    #[test]
    fn headings_are_bold() {
        let ls = lines("<h2 id=\"x\">Heading</h2><p>body</p>");
        let heading = ls
            .iter()
            .flat_map(|l| &l.spans)
            .find(|s| s.content == "Heading")
            .unwrap();
        assert!(heading.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn list_items_get_bullets() {
        let ls = lines("<ul><li>one</li><li>two</li></ul>");
        let texts = flat(&ls);
        assert!(texts.contains(&"• one".to_string()));
        assert!(texts.contains(&"• two".to_string()));
    }

    #[test]
    fn strikethrough_is_crossed_out() {
        let ls = lines("<p><del>gone</del></p>");
        let span = ls[0].spans.iter().find(|s| s.content == "gone").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn unknown_tags_keep_text() {
        let ls = lines("<p><font face=\"x\">kept</font></p>");
        assert_eq!(flat(&ls), vec!["kept"]);
    }

    #[test]
    fn hex_color_parsing() {
        assert_eq!(parse_hex_color("#3b82f6"), Some(Color::Rgb(0x3b, 0x82, 0xf6)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }
}
