use std::fmt::Write;
use std::process::ExitCode;

use anyhow::{bail, Result};

use verseblog::config::{Config, Site};
use verseblog::feed::load_feed;
use verseblog::paginator::Paginator;
use verseblog::pipeline::Pipeline;
use verseblog::post::Post;
use verseblog::post_query::{find_post, related_posts, search_posts};
use verseblog::text_utils::format_date;

fn get_sample_cfg() -> &'static str {
    include_str!("../../../verseblog.toml")
}

fn render_entry(buf: &mut String, post: &Post) {
    let _ = writeln!(buf, "{} | {} min read", format_date(&post.date), post.read_time);
    let _ = writeln!(buf, "{}", post.title);
    let _ = writeln!(buf, "  /blog/{}/", post.slug);
    let _ = writeln!(buf, "  {}", post.excerpt);
    let _ = writeln!(buf);
}

fn render_site_header(buf: &mut String, site: &Site) {
    let _ = writeln!(buf, "{}", site.title);
    if !site.description.is_empty() {
        let _ = writeln!(buf, "{}", site.description);
    }
    let _ = writeln!(buf);
}

fn render_page(site: &Site, posts: &[Post], page_size: u32, page: u32) -> Result<String> {
    let mut buf = String::new();
    render_site_header(&mut buf, site);

    if posts.is_empty() {
        let _ = writeln!(buf, "No posts yet");
        return Ok(buf);
    }

    let paginator = Paginator::from(posts, page_size);
    let items = paginator.get_page(page).map_err(anyhow::Error::msg)?;

    for post in items {
        render_entry(&mut buf, post);
    }
    let _ = writeln!(buf, "Page {} of {}", page, paginator.page_count());
    Ok(buf)
}

fn render_matches(header: &str, posts: &[&Post]) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "{} ({})", header, posts.len());
    let _ = writeln!(buf);
    for post in posts {
        render_entry(&mut buf, post);
    }
    buf
}

/// Exit code 0 when the archive was processed or there was nothing to do.
/// Failures are logged by the pipeline itself.
pub fn extract_cmd(config: &Config) -> ExitCode {
    let mut pipeline = Pipeline::new(config, rand::rng());
    match pipeline.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

pub fn list_cmd(config: &Config, page: u32) -> Result<()> {
    let posts = load_feed(&config.paths.feed_path())?;
    print!("{}", render_page(&config.site, &posts, config.blog.posts_per_page, page)?);
    Ok(())
}

pub fn search_cmd(config: &Config, term: &str) -> Result<()> {
    let posts = load_feed(&config.paths.feed_path())?;
    let found = search_posts(&posts, term);
    print!("{}", render_matches(&format!("Posts matching \"{}\"", term.trim()), &found));
    Ok(())
}

pub fn related_cmd(config: &Config, slug: &str) -> Result<()> {
    let posts = load_feed(&config.paths.feed_path())?;
    let current = match find_post(&posts, slug) {
        Some(post) => post,
        None => bail!("No post with slug '{}'", slug),
    };

    let related = related_posts(current, &posts, config.blog.related_posts_count, &mut rand::rng());
    print!("{}", render_matches(&format!("Related to \"{}\"", current.title), &related));
    Ok(())
}

pub fn sample_config_cmd() {
    print!("{}", get_sample_cfg());
}
