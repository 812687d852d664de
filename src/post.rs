use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Blog;
use crate::slug::slugify;
use crate::text_utils::{estimate_read_time, extract_excerpt, extract_plain_text_excerpt};
use crate::util::iso_date::to_iso_string;

const FALLBACK_SLUG: &str = "post";

/// One markdown file after ingestion. Field names follow the JSON feed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub meta_description: String,
    #[serde(with = "crate::util::iso_date")]
    pub date: DateTime<Utc>,
    pub image_url: String,
    pub read_time: u32,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, date={}, read_time={}\ntitle={}\nexcerpt:\n{}",
               self.id,
               to_iso_string(&self.date),
               self.read_time,
               self.title,
               self.excerpt
        )
    }
}

impl Post {
    /// Changes the slug and keeps the id in sync with it.
    pub fn set_slug(&mut self, slug: String) {
        self.id = slug.clone();
        self.slug = slug;
    }
}

/// Example of post
///
/// # Walking by faith
///
/// For we walk by faith, not by sight.
///
/// The first `# ` heading is the title. Without one, the file name is used.
pub struct PostParser<'a, R: Rng> {
    blog: &'a Blog,
    rng: R,
}

impl<'a, R: Rng> PostParser<'a, R> {
    pub fn new(blog: &'a Blog, rng: R) -> Self {
        PostParser { blog, rng }
    }

    pub fn parse(&mut self, text: &str, file_name: &str) -> Post {
        self.parse_at(text, file_name, Utc::now())
    }

    pub fn parse_at(&mut self, text: &str, file_name: &str, date: DateTime<Utc>) -> Post {
        let (title, content) = split_title(text, file_name);
        let slug = post_slug(&title, file_name);
        let image_url = self.pick_image();
        let excerpt = extract_excerpt(&content, self.blog.excerpt_length);
        let meta_description = extract_plain_text_excerpt(&content, self.blog.excerpt_length);
        let read_time = estimate_read_time(&content, self.blog.words_per_minute);

        Post {
            id: slug.clone(),
            slug,
            title,
            content,
            excerpt,
            meta_description,
            date,
            image_url,
            read_time,
        }
    }

    fn pick_image(&mut self) -> String {
        self.blog.feature_images
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }
}

/// Splits a document into its title and the body without the title line.
pub fn split_title(text: &str, file_name: &str) -> (String, String) {
    lazy_static! {
        static ref TITLE_REGEX: Regex = Regex::new(r"(?m)^# (.+)$").unwrap();
    }

    let Some(caps) = TITLE_REGEX.captures(text) else {
        return (title_from_file_name(file_name), text.trim().to_string());
    };

    let title = caps[1].trim().to_string();
    let heading = caps.get(0).map(|m| m.range()).unwrap_or(0..0);

    let mut content = String::with_capacity(text.len());
    content.push_str(&text[..heading.start]);
    content.push_str(&text[heading.end..]);

    (title, content.trim().to_string())
}

/// Slug of the title, else of the file name, else [`FALLBACK_SLUG`].
fn post_slug(title: &str, file_name: &str) -> String {
    [title.to_string(), title_from_file_name(file_name)].iter()
        .map(|text| slugify(text))
        .find(|slug| !slug.is_empty())
        .unwrap_or_else(|| FALLBACK_SLUG.to_string())
}

fn title_from_file_name(file_name: &str) -> String {
    match Path::new(file_name).file_stem() {
        Some(stem) => stem.to_string_lossy().to_string(),
        None => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::test_data::{test_blog, POST_DATA};

    use super::*;

    fn parser(blog: &Blog, seed: u64) -> PostParser<StdRng> {
        PostParser::new(blog, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_round_trip_title() {
        let blog = test_blog();
        let post = parser(&blog, 1).parse("# My Title\n\nBody text.", "my-title.md");
        assert_eq!(post.title, "My Title");
        assert_eq!(post.content, "Body text.");
        assert_eq!(post.slug, "my-title");
        assert_eq!(post.id, "my-title");
        assert_eq!(post.excerpt, "Body text.");
        assert_eq!(post.meta_description, "Body text.");
        assert_eq!(post.read_time, 1);
    }

    #[test]
    fn test_title_fallback_to_file_name() {
        let (title, content) = split_title("\n  Just a body.\n## Not a title\n", "posts/2024/grace-notes.md");
        assert_eq!(title, "grace-notes");
        assert_eq!(content, "Just a body.\n## Not a title");
    }

    #[test]
    fn test_title_not_on_first_line() {
        let text = "Intro line\n# Real Title  \r\nAfter the title";
        let (title, content) = split_title(text, "x.md");
        assert_eq!(title, "Real Title");
        assert_eq!(content, "Intro line\n\nAfter the title");
        assert!(!content.contains("# Real Title"));
    }

    #[test]
    fn test_only_first_heading_is_removed() {
        let text = "# One\n\nbody\n\n# Two\n";
        let (title, content) = split_title(text, "x.md");
        assert_eq!(title, "One");
        assert_eq!(content, "body\n\n# Two");
    }

    #[test]
    fn test_empty_document() {
        let blog = test_blog();
        let post = parser(&blog, 1).parse("", "empty.md");
        assert_eq!(post.title, "empty");
        assert_eq!(post.content, "");
        assert_eq!(post.excerpt, "");
        assert_eq!(post.read_time, 0);
    }

    #[test]
    fn test_slug_never_empty() {
        let blog = test_blog();
        let mut parser = parser(&blog, 1);

        let post = parser.parse("# 你好\n\nbody", "posts/grace-notes.md");
        assert_eq!(post.title, "你好");
        assert_eq!(post.slug, "grace-notes");
        assert_eq!(post.id, "grace-notes");

        let post = parser.parse("# 世界\n\nbody", "posts/世界.md");
        assert_eq!(post.slug, "post");

        let post = parser.parse("# !!!\n", "???.md");
        assert_eq!(post.slug, "post");
    }

    #[test]
    fn test_seeded_image_choice() {
        let blog = test_blog();
        let date = Utc.with_ymd_and_hms(2024, 4, 2, 12, 5, 0).unwrap();
        let first = parser(&blog, 42).parse_at(POST_DATA, "walking.md", date);
        let second = parser(&blog, 42).parse_at(POST_DATA, "walking.md", date);
        assert_eq!(first, second);
        assert!(blog.feature_images.contains(&first.image_url));
        assert_eq!(first.date, date);
    }

    #[test]
    fn test_full_post() {
        let blog = test_blog();
        let post = parser(&blog, 3).parse(POST_DATA, "walking.md");
        println!("{}", post);
        assert_eq!(post.title, "Walking by Faith, Not by Sight");
        assert_eq!(post.slug, "walking-by-faith-not-by-sight");
        assert!(post.content.starts_with("For we walk by faith"));
        assert!(post.excerpt.len() <= 160);
        assert!(post.excerpt.ends_with('.'));
        assert_eq!(post.meta_description, "For we walk by faith, not by sight.");
        assert_eq!(post.read_time, 1);
    }

    #[test]
    fn test_empty_image_pool() {
        let mut blog = test_blog();
        blog.feature_images.clear();
        let post = parser(&blog, 3).parse("# T\nbody", "t.md");
        assert_eq!(post.image_url, "");
    }

    #[test]
    fn test_json_field_names() {
        let blog = test_blog();
        let date = Utc.with_ymd_and_hms(2024, 4, 2, 12, 5, 0).unwrap();
        let post = parser(&blog, 1).parse_at("# A\nb", "a.md", date);
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["metaDescription"], "b");
        assert_eq!(json["readTime"], 1);
        assert_eq!(json["date"], "2024-04-02T12:05:00.000Z");
        assert!(json["imageUrl"].is_string());
    }
}
