use std::io::ErrorKind;
use std::path::Path;
use std::fs;

use anyhow::{Context, Result};
use spdlog::warn;

use crate::post::Post;

/// Newest first. Posts with the same timestamp keep their archive order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The JSON feed consumed by the blog pages: the posts as a pretty-printed array.
pub fn render_feed(posts: &[Post]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(posts)
}

/// Reads a feed written by [`render_feed`]. A missing file is an empty blog.
pub fn load_feed(path: &Path) -> Result<Vec<Post>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Feed {} not found, no posts to show", path.display());
            return Ok(vec![]);
        }
        Err(e) => return Err(e).with_context(|| format!("Error reading feed {}", path.display())),
    };

    serde_json::from_str(&json)
        .with_context(|| format!("Error parsing feed {}", path.display()))
}
