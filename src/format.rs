use chrono::NaiveDateTime;

/// Escapes a user-supplied string for insertion into markup. Every
/// render path goes through this before interpolation.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// "Just now" / "5 minutes ago" / "Yesterday" / "Mar 15, 2024" buckets.
pub fn format_relative(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let diff = now - timestamp;
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        return "Just now".to_string();
    }
    if mins < 60 {
        return format!("{} minute{} ago", mins, plural(mins));
    }
    if hours < 24 {
        return format!("{} hour{} ago", hours, plural(hours));
    }
    if days == 1 {
        return "Yesterday".to_string();
    }
    if days < 7 {
        return format!("{} days ago", days);
    }
    timestamp.format("%b %-d, %Y").to_string()
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

/// Derives a note title from its plain-text content: first non-empty
/// line, capped at 100 characters.
pub fn derive_title(plain: &str) -> String {
    let first_line = plain.trim().lines().next().unwrap_or("").trim();
    let capped: String = first_line.chars().take(100).collect();
    if capped.is_empty() {
        "Untitled Note".to_string()
    } else {
        capped
    }
}

/// Truncates on a char boundary, appending an ellipsis when clipped.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(max_chars).collect();
        format!("{}...", clipped)
    }
}
