use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use spdlog::{debug, error, info, warn};

use crate::archive::{ingest_archive, resolve_slug_collisions};
use crate::config::Config;
use crate::feed::{render_feed, sort_newest_first};
use crate::output::{copy_atomic, write_atomic};
use crate::post::PostParser;
use crate::sitemap::{is_part_file_name, SitemapGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    CheckingArchive,
    Ingesting,
    Writing,
    Done,
    Skipped,
    Failed,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// No archive in the build directory. Nothing was written.
    Skipped,
    Done {
        post_count: usize,
        sitemap_files: Vec<String>,
    },
}

/// Zip archive -> posts -> `blog-data.json`, sitemaps and `sitemap.html`.
///
/// Every artifact is rendered before the first file is written, so a failure
/// while ingesting leaves the build directory untouched.
pub struct Pipeline<'a, R: Rng> {
    config: &'a Config,
    rng: R,
    state: PipelineState,
}

impl<'a, R: Rng> Pipeline<'a, R> {
    pub fn new(config: &'a Config, rng: R) -> Self {
        Pipeline {
            config,
            rng,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn run(&mut self) -> Result<PipelineOutcome> {
        match self.run_stages() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Error extracting blog posts: {:#}", e);
                self.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline {} -> {}", self.state, next);
        self.state = next;
    }

    fn run_stages(&mut self) -> Result<PipelineOutcome> {
        let config = self.config;
        let paths = &config.paths;

        info!("Starting blog post extraction...");
        self.transition(PipelineState::CheckingArchive);

        let archive_path = paths.archive_path();
        if !archive_path.is_file() {
            info!("No blog posts zip found, skipping extraction");
            self.transition(PipelineState::Skipped);
            return Ok(PipelineOutcome::Skipped);
        }

        info!("Found {}, extracting...", paths.archive_name);
        self.transition(PipelineState::Ingesting);

        let mut parser = PostParser::new(&config.blog, &mut self.rng);
        let posts = ingest_archive(&archive_path, &mut parser)?;
        let mut posts = resolve_slug_collisions(posts, config.blog.slug_collision);
        sort_newest_first(&mut posts);

        let feed = render_feed(&posts).context("Error encoding blog feed")?;
        let sitemaps = SitemapGenerator::new(&config.site, &config.sitemap, Utc::now().date_naive())
            .generate(&posts)
            .context("Error rendering sitemap")?;

        self.transition(PipelineState::Writing);

        let feed_path = paths.feed_path();
        write_atomic(&feed_path, feed.as_bytes())
            .with_context(|| format!("Error writing {}", feed_path.display()))?;
        info!("Successfully extracted {} blog posts to {}", posts.len(), paths.feed_name);

        let mut sitemap_files = Vec::with_capacity(sitemaps.len());
        for doc in sitemaps {
            let path = paths.dist_dir.join(&doc.file_name);
            write_atomic(&path, &doc.xml)
                .with_context(|| format!("Error writing {}", path.display()))?;
            sitemap_files.push(doc.file_name);
        }
        if sitemap_files.len() == 1 {
            info!("Generated {}", sitemap_files[0]);
        } else {
            info!("Generated sitemap index with {} sitemaps", sitemap_files.len() - 1);
        }
        remove_stale_parts(&paths.dist_dir, &sitemap_files)
            .context("Error removing old sitemaps")?;

        let index_html = paths.dist_dir.join(&paths.index_html);
        if index_html.is_file() {
            let html_sitemap = paths.dist_dir.join(&paths.html_sitemap_name);
            copy_atomic(&index_html, &html_sitemap)
                .with_context(|| format!("Error writing {}", html_sitemap.display()))?;
            info!("Generated {}", paths.html_sitemap_name);
        } else {
            warn!("{} not found, {} not generated", paths.index_html, paths.html_sitemap_name);
        }

        self.transition(PipelineState::Done);
        Ok(PipelineOutcome::Done {
            post_count: posts.len(),
            sitemap_files,
        })
    }
}

/// Numbered sitemaps left by an earlier, larger run.
fn remove_stale_parts(dist_dir: &Path, current: &[String]) -> io::Result<()> {
    for entry in fs::read_dir(dist_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_part_file_name(&name) || current.contains(&name) || !entry.file_type()?.is_file() {
            continue;
        }
        fs::remove_file(entry.path())?;
        info!("Removed old {}", name);
    }
    Ok(())
}
