use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://randomversegenerator.com";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Paths {
    /// Build output directory. The archive is read from here and every artifact lands here
    pub dist_dir: PathBuf,
    pub archive_name: String,
    pub feed_name: String,
    pub index_html: String,
    pub html_sitemap_name: String,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            dist_dir: PathBuf::from("dist"),
            archive_name: "blog-posts.zip".to_string(),
            feed_name: "blog-data.json".to_string(),
            index_html: "index.html".to_string(),
            html_sitemap_name: "sitemap.html".to_string(),
        }
    }
}

impl Paths {
    pub fn archive_path(&self) -> PathBuf {
        self.dist_dir.join(&self.archive_name)
    }

    pub fn feed_path(&self) -> PathBuf {
        self.dist_dir.join(&self.feed_name)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Site {
    pub title: String,
    pub description: String,
    pub base_url: String,
    /// Paths relative to `base_url`. The empty string is the root page
    pub static_pages: Vec<String>,
}

impl Default for Site {
    fn default() -> Self {
        Site {
            title: "Random Bible Verse Blog".to_string(),
            description: "Insights, devotionals, and inspiration from God's Word".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            static_pages: ["", "about/", "blog/", "contact/"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlugCollision {
    /// Later posts get `-2`, `-3`, ... appended
    Suffix,
    /// The last post with a given slug replaces the earlier ones
    Overwrite,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Blog {
    pub feature_images: Vec<String>,
    /// Page size of the blog listing. The sitemap has its own, see [`Sitemap::page_size`]
    pub posts_per_page: u32,
    pub related_posts_count: usize,
    pub excerpt_length: usize,
    pub words_per_minute: usize,
    pub slug_collision: SlugCollision,
}

impl Default for Blog {
    fn default() -> Self {
        Blog {
            feature_images: FEATURE_IMAGES.iter().map(|s| s.to_string()).collect(),
            posts_per_page: 18,
            related_posts_count: 3,
            excerpt_length: 160,
            words_per_minute: 200,
            slug_collision: SlugCollision::Suffix,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Sitemap {
    /// Listing page size used to count `/blog/page/N/` urls
    pub page_size: u32,
    pub max_urls_per_sitemap: usize,
}

impl Default for Sitemap {
    fn default() -> Self {
        Sitemap {
            page_size: 6,
            max_urls_per_sitemap: 500,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub site: Site,
    pub blog: Blog,
    pub sitemap: Sitemap,
    pub log: Option<Log>,
}

const FEATURE_IMAGES: [&str; 18] = [
    "https://images.pexels.com/photos/267076/pexels-photo-267076.jpeg",
    "https://images.pexels.com/photos/5752601/pexels-photo-5752601.jpeg",
    "https://images.pexels.com/photos/531321/pexels-photo-531321.jpeg",
    "https://images.pexels.com/photos/266076/pexels-photo-266076.jpeg",
    "https://images.pexels.com/photos/208371/pexels-photo-208371.jpeg",
    "https://images.pexels.com/photos/372326/pexels-photo-372326.jpeg",
    "https://images.pexels.com/photos/415571/pexels-photo-415571.jpeg",
    "https://images.pexels.com/photos/3825011/pexels-photo-3825011.jpeg",
    "https://images.pexels.com/photos/3224232/pexels-photo-3224232.jpeg",
    "https://images.pexels.com/photos/933486/pexels-photo-933486.jpeg",
    "https://images.pexels.com/photos/1701535/pexels-photo-1701535.jpeg",
    "https://images.pexels.com/photos/161060/read-book-open-literature-161060.jpeg",
    "https://images.pexels.com/photos/236326/pexels-photo-236326.jpeg",
    "https://images.pexels.com/photos/2397645/pexels-photo-2397645.jpeg",
    "https://images.pexels.com/photos/3768894/pexels-photo-3768894.jpeg",
    "https://images.pexels.com/photos/3141079/pexels-photo-3141079.jpeg",
    "https://images.pexels.com/photos/2258536/pexels-photo-2258536.jpeg",
    "https://images.pexels.com/photos/33363/prayer-church-light-candle.jpg",
];

/// Expands a leading `${exe_dir}` to the directory of the running executable.
pub fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe()?;
        let exe_dir = cur_exe.parent().unwrap_or(Path::new("."));
        let rest = path.strip_prefix("${exe_dir}").unwrap_or(path.as_path());
        Ok(exe_dir.join(rest))
    } else {
        Ok(path)
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths.dist_dir = parse_path(cfg.paths.dist_dir)?;
    if let Some(ref mut log) = cfg.log {
        if let Some(location) = log.location.take() {
            log.location = Some(parse_path(location)?);
        }
    }

    if cfg.blog.feature_images.is_empty() {
        return Err(io::Error::new(ErrorKind::InvalidData, "blog.feature_images cannot be empty"));
    }
    if cfg.sitemap.page_size == 0 || cfg.blog.posts_per_page == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "page sizes have to be greater than 0"));
    }
    if cfg.sitemap.max_urls_per_sitemap == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "sitemap.max_urls_per_sitemap has to be greater than 0"));
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
