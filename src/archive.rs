use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use rand::Rng;
use spdlog::{info, warn};
use zip::ZipArchive;

use crate::config::SlugCollision;
use crate::error::IngestError;
use crate::post::{Post, PostParser};
use crate::slug::SlugRegistry;

const MARKDOWN_EXT: &str = ".md";

/// Reads every `.md` entry of the zip at `path` into a post, in archive order.
/// The caller checks that the file exists.
pub fn ingest_archive<R: Rng>(path: &Path, parser: &mut PostParser<R>) -> Result<Vec<Post>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::ArchiveOpen {
        path: path.to_path_buf(),
        source,
    })?;

    ingest_reader(BufReader::new(file), parser)
}

pub fn ingest_reader<Rd: Read + Seek, R: Rng>(reader: Rd, parser: &mut PostParser<R>) -> Result<Vec<Post>, IngestError> {
    let mut archive = ZipArchive::new(reader)?;

    let markdown_entries = list_markdown_entries(&mut archive)?;
    info!("Found {} markdown files", markdown_entries.len());

    let mut posts = Vec::with_capacity(markdown_entries.len());
    for (index, name) in markdown_entries {
        info!("Processing: {}", name);
        let text = read_entry_text(&mut archive, index, &name)?;
        posts.push(parser.parse(&text, &name));
    }

    Ok(posts)
}

fn list_markdown_entries<Rd: Read + Seek>(archive: &mut ZipArchive<Rd>) -> Result<Vec<(usize, String)>, IngestError> {
    let mut entries = vec![];
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() || !entry.name().ends_with(MARKDOWN_EXT) {
            continue;
        }
        entries.push((index, entry.name().to_string()));
    }
    Ok(entries)
}

fn read_entry_text<Rd: Read + Seek>(archive: &mut ZipArchive<Rd>, index: usize, name: &str) -> Result<String, IngestError> {
    let mut entry = archive.by_index(index)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)
        .map_err(|e| IngestError::entry_decode(name, e))?;

    String::from_utf8(strip_bom(&bytes).to_vec())
        .map_err(|e| IngestError::entry_decode(name, e))
}

/// Strip UTF-8 BOM (byte order mark) if present
fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Makes slugs unique within the collection according to `policy`.
pub fn resolve_slug_collisions(posts: Vec<Post>, policy: SlugCollision) -> Vec<Post> {
    match policy {
        SlugCollision::Suffix => {
            let mut registry = SlugRegistry::new();
            posts.into_iter()
                .map(|mut post| {
                    let slug = registry.claim(&post.slug);
                    if slug != post.slug {
                        warn!("Slug '{}' already taken, using '{}' for \"{}\"", post.slug, slug, post.title);
                        post.set_slug(slug);
                    }
                    post
                })
                .collect()
        }
        SlugCollision::Overwrite => {
            let mut last_index: HashMap<String, usize> = HashMap::new();
            for (index, post) in posts.iter().enumerate() {
                if let Some(prev) = last_index.insert(post.slug.clone(), index) {
                    warn!("Slug '{}' of \"{}\" replaced by \"{}\"", post.slug, posts[prev].title, post.title);
                }
            }
            posts.into_iter()
                .enumerate()
                .filter(|(index, post)| last_index.get(&post.slug) == Some(index))
                .map(|(_, post)| post)
                .collect()
        }
    }
}
