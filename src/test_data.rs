#![cfg(test)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::{Blog, Config};

pub const POST_DATA: &str = "
# Walking by Faith, Not by Sight

For we walk by faith, not by sight. These words from 2 Corinthians remind us that the Christian life is not built on what we can measure or prove. Faith looks beyond the present moment.

## Trusting what we cannot see

Abraham left his home without knowing where he was going. He trusted the **promise** more than the map.
Read more in the [daily reading plan](https://randomversegenerator.com/blog/).
";

pub fn test_blog() -> Blog {
    Blog::default()
}

/// Default configuration writing into `dist_dir`
pub fn test_config(dist_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.paths.dist_dir = dist_dir.to_path_buf();
    config.site.base_url = "https://example.com".to_string();
    config
}

pub enum Entry<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
}

/// In-memory zip archive with the given entries, in order
pub fn zip_bytes(entries: &[Entry]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        match entry {
            Entry::File(name, data) => {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            Entry::Dir(name) => {
                zip.add_directory(*name, options).unwrap();
            }
        }
    }

    zip.finish().unwrap().into_inner()
}

/// Markdown document titled `Post <n>`
pub fn numbered_post(n: usize) -> String {
    format!("# Post {}\n\nBody of post number {}.", n, n)
}
