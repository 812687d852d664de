use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

const ELLIPSIS: &str = "...";

/// Minutes needed to read `content`, rounded up. Empty content takes 0 minutes.
pub fn estimate_read_time(content: &str, words_per_minute: usize) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(words_per_minute.max(1)) as u32
}

/// First `max_len` characters of `text`, or all of it when shorter.
fn char_prefix(text: &str, max_len: usize) -> &str {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn cut_at_word(prefix: &str) -> String {
    let kept = match prefix.rfind(char::is_whitespace) {
        Some(idx) => prefix[..idx].trim_end(),
        None => "",
    };
    format!("{}{}", kept, ELLIPSIS)
}

/// Short preview of a post body.
///
/// Content that fits is returned as is. Otherwise the longest prefix ending in a
/// period wins; without one the text is cut at the last whitespace and `...` appended.
pub fn extract_excerpt(content: &str, max_len: usize) -> String {
    if content.chars().count() <= max_len {
        return content.to_string();
    }

    let prefix = char_prefix(content, max_len);
    match prefix.rfind('.') {
        Some(idx) if idx > 0 => prefix[..=idx].to_string(),
        _ => cut_at_word(prefix),
    }
}

/// Drops markdown syntax, keeping the text a reader would see on a single line.
pub fn strip_markdown(markdown: &str) -> String {
    lazy_static! {
        static ref HEADING_REGEX: Regex = Regex::new(r"#{1,6}\s+").unwrap();
        static ref IMAGE_REGEX: Regex = Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap();
        static ref LINK_REGEX: Regex = Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap();
        static ref CODE_REGEX: Regex = Regex::new(r"`{1,3}[^`]+`{1,3}").unwrap();
        static ref EMPHASIS_REGEX: Regex = Regex::new(r"\*\*|\*").unwrap();
        // `_` is a word character, so `\b_` only matches at the start of a word
        static ref UNDERSCORE_EMPHASIS_REGEX: Regex = Regex::new(r"\b(__|_)([^_]+)(__|_)\b").unwrap();
        static ref NEWLINES_REGEX: Regex = Regex::new(r"[\r\n]+").unwrap();
    }

    let text = HEADING_REGEX.replace_all(markdown, "");
    let text = IMAGE_REGEX.replace_all(&text, "$1");
    let text = LINK_REGEX.replace_all(&text, "$1");
    let text = CODE_REGEX.replace_all(&text, "");
    let text = EMPHASIS_REGEX.replace_all(&text, "");
    let text = UNDERSCORE_EMPHASIS_REGEX.replace_all(&text, "$2");
    let text = NEWLINES_REGEX.replace_all(&text, " ");

    text.trim().to_string()
}

/// Plain text description for `<meta name="description">`.
///
/// Prefers the first full sentence when it ends within `max_len` characters.
pub fn extract_plain_text_excerpt(markdown: &str, max_len: usize) -> String {
    lazy_static! {
        static ref SENTENCE_END_REGEX: Regex = Regex::new(r"[.!?](\s|$)").unwrap();
    }

    let text = strip_markdown(markdown);

    if let Some(end) = SENTENCE_END_REGEX.find(&text) {
        let end = end.start();
        if text[..end].chars().count() < max_len {
            return text[..=end].to_string();
        }
    }

    if text.chars().count() <= max_len {
        return text;
    }

    cut_at_word(char_prefix(&text, max_len))
}

/// Long US date, e.g. `October 19, 2026`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}
