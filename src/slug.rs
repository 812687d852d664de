use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Turns a post title into the identifier used in `/blog/<slug>/`.
///
/// Accents are decomposed and dropped, whitespace runs become a single hyphen and
/// anything outside `[a-z0-9_-]` is removed. Text with nothing left yields `""`.
pub fn slugify(text: &str) -> String {
    lazy_static! {
        static ref SPACES_REGEX: Regex = Regex::new(r"\s+").unwrap();
        static ref NON_WORD_REGEX: Regex = Regex::new(r"[^a-z0-9_\-]+").unwrap();
        static ref HYPHENS_REGEX: Regex = Regex::new(r"-{2,}").unwrap();
    }

    let stripped: String = text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let lowered = stripped.to_lowercase();

    let slug = SPACES_REGEX.replace_all(lowered.trim(), "-");
    let slug = NON_WORD_REGEX.replace_all(&slug, "");
    let slug = HYPHENS_REGEX.replace_all(&slug, "-");

    slug.trim_matches('-').to_string()
}

/// Hands out unique slugs within one run. The first claim of a slug keeps it,
/// later ones get `-2`, `-3`, ...
#[derive(Default)]
pub struct SlugRegistry {
    taken: HashSet<String>,
    next_suffix: HashMap<String, u32>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn claim(&mut self, slug: &str) -> String {
        if self.taken.insert(slug.to_string()) {
            return slug.to_string();
        }

        let suffix = self.next_suffix.entry(slug.to_string()).or_insert(2);
        loop {
            let candidate = format!("{}-{}", slug, suffix);
            *suffix += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
