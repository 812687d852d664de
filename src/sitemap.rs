use std::io::Cursor;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use spdlog::debug;

use crate::config::{Site, Sitemap};
use crate::paginator::Paginator;
use crate::post::Post;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://randomversegenerator.com/blog/walking-by-faith/</loc>
    <lastmod>2024-04-02</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.6</priority>
  </url>
</urlset>
*/

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const SITEMAP_FILE: &str = "sitemap.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Weekly,
    Monthly,
}

impl ChangeFreq {
    fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// One file of the sitemap output, relative to the build directory.
#[derive(Debug)]
pub struct SitemapDocument {
    pub file_name: String,
    pub xml: Vec<u8>,
}

pub struct SitemapGenerator<'a> {
    site: &'a Site,
    sitemap: &'a Sitemap,
    today: NaiveDate,
}

impl<'a> SitemapGenerator<'a> {
    pub fn new(site: &'a Site, sitemap: &'a Sitemap, today: NaiveDate) -> Self {
        SitemapGenerator { site, sitemap, today }
    }

    /// `sitemap.xml` alone when every url fits, otherwise `sitemap.xml` as an
    /// index over `sitemap1.xml` (site pages) and `sitemap2.xml`... (posts).
    ///
    /// The index comes last, so writing the documents in order never leaves it
    /// pointing at a part that was not written.
    pub fn generate(&self, posts: &[Post]) -> quick_xml::Result<Vec<SitemapDocument>> {
        let site_urls = self.site_urls(posts);
        let post_urls = self.post_urls(posts);
        let max_urls = self.sitemap.max_urls_per_sitemap.max(1);

        if site_urls.len() + post_urls.len() <= max_urls {
            let mut urls = site_urls;
            urls.extend(post_urls);
            debug!("Single sitemap with {} urls", urls.len());
            return Ok(vec![SitemapDocument {
                file_name: SITEMAP_FILE.to_string(),
                xml: render_urlset(&urls)?,
            }]);
        }

        let mut parts: Vec<&[SitemapUrl]> = site_urls.chunks(max_urls).collect();
        if !post_urls.is_empty() {
            // Spread posts evenly instead of leaving a nearly empty last file
            let part_count = post_urls.len().div_ceil(max_urls);
            let per_part = post_urls.len().div_ceil(part_count);
            parts.extend(post_urls.chunks(per_part));
        }

        let mut documents = Vec::with_capacity(parts.len() + 1);
        let mut locs = Vec::with_capacity(parts.len());
        for (i, urls) in parts.into_iter().enumerate() {
            let file_name = format!("sitemap{}.xml", i + 1);
            debug!("{} with {} urls", file_name, urls.len());
            locs.push(full_url(&self.site.base_url, &file_name));
            documents.push(SitemapDocument {
                file_name,
                xml: render_urlset(urls)?,
            });
        }

        documents.push(SitemapDocument {
            file_name: SITEMAP_FILE.to_string(),
            xml: render_index(&locs, self.today)?,
        });

        Ok(documents)
    }

    /// Static pages followed by the listing pages after the first one.
    fn site_urls(&self, posts: &[Post]) -> Vec<SitemapUrl> {
        let mut urls = vec![];

        for page in self.site.static_pages.iter() {
            let priority = if page.trim_matches('/').is_empty() { 1.0 } else { 0.8 };
            urls.push(SitemapUrl {
                loc: full_url(&self.site.base_url, page),
                lastmod: self.today,
                changefreq: ChangeFreq::Weekly,
                priority,
            });
        }

        // Page 1 is /blog/ itself
        let page_count = Paginator::from(posts, self.sitemap.page_size).page_count();
        for page in 2..=page_count {
            urls.push(SitemapUrl {
                loc: full_url(&self.site.base_url, &format!("blog/page/{}/", page)),
                lastmod: self.today,
                changefreq: ChangeFreq::Weekly,
                priority: 0.7,
            });
        }

        urls
    }

    fn post_urls(&self, posts: &[Post]) -> Vec<SitemapUrl> {
        posts.iter()
            .map(|post| SitemapUrl {
                loc: full_url(&self.site.base_url, &format!("blog/{}/", post.slug)),
                lastmod: post.date.date_naive(),
                changefreq: ChangeFreq::Monthly,
                priority: 0.6,
            })
            .collect()
    }
}

/// `sitemap1.xml`, `sitemap2.xml`, ... as named by [`SitemapGenerator::generate`].
pub fn is_part_file_name(name: &str) -> bool {
    lazy_static! {
        static ref PART_REGEX: Regex = Regex::new(r"^sitemap\d+\.xml$").unwrap();
    }
    PART_REGEX.is_match(name)
}

fn full_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn new_writer() -> quick_xml::Result<Writer<Cursor<Vec<u8>>>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    // <?xml version="1.0" encoding="UTF-8"?>
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

pub fn render_urlset(urls: &[SitemapUrl]) -> quick_xml::Result<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for url in urls {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        push_text(&mut writer, "loc", &url.loc)?;
        push_text(&mut writer, "lastmod", &url.lastmod.format("%Y-%m-%d").to_string())?;
        push_text(&mut writer, "changefreq", url.changefreq.as_str())?;
        push_text(&mut writer, "priority", &format!("{:.1}", url.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    Ok(writer.into_inner().into_inner())
}

pub fn render_index(locs: &[String], lastmod: NaiveDate) -> quick_xml::Result<Vec<u8>> {
    let mut writer = new_writer()?;

    let mut index = BytesStart::new("sitemapindex");
    index.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(index))?;

    let lastmod = lastmod.format("%Y-%m-%d").to_string();
    for loc in locs {
        writer.write_event(Event::Start(BytesStart::new("sitemap")))?;
        push_text(&mut writer, "loc", loc)?;
        push_text(&mut writer, "lastmod", &lastmod)?;
        writer.write_event(Event::End(BytesEnd::new("sitemap")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sitemapindex")))?;

    Ok(writer.into_inner().into_inner())
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str;

    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::post::PostParser;
    use crate::test_data::{numbered_post, test_blog};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn site() -> Site {
        Site {
            base_url: "https://example.com/".to_string(),
            ..Default::default()
        }
    }

    fn posts(count: usize) -> Vec<Post> {
        let blog = test_blog();
        let mut parser = PostParser::new(&blog, StdRng::seed_from_u64(2));
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        (0..count)
            .map(|i| parser.parse_at(&numbered_post(i), "p.md", start + Duration::hours(i as i64)))
            .collect()
    }

    fn generate(post_count: usize) -> Vec<SitemapDocument> {
        let site = site();
        let sitemap = Sitemap::default();
        SitemapGenerator::new(&site, &sitemap, today())
            .generate(&posts(post_count))
            .unwrap()
    }

    fn text(doc: &SitemapDocument) -> &str {
        str::from_utf8(&doc.xml).unwrap()
    }

    fn index_doc(docs: &[SitemapDocument]) -> &SitemapDocument {
        let doc = docs.last().unwrap();
        assert_eq!(doc.file_name, "sitemap.xml");
        doc
    }

    fn url_count(doc: &SitemapDocument) -> usize {
        text(doc).matches("<url>").count()
    }

    #[test]
    fn test_small_site() {
        let docs = generate(3);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "sitemap.xml");

        let xml = text(&docs[0]);
        println!("{}", xml);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.trim_end().ends_with("</urlset>"));
        assert_eq!(url_count(&docs[0]), 7);
        assert!(!xml.contains("blog/page/"));

        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/about/</loc>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert_eq!(xml.matches("<priority>0.8</priority>").count(), 3);
        assert_eq!(xml.matches("<lastmod>2026-10-19</lastmod>").count(), 4);

        assert!(xml.contains("<loc>https://example.com/blog/post-2/</loc>"));
        assert!(xml.contains("<lastmod>2024-03-01</lastmod>"));
        assert_eq!(xml.matches("<changefreq>monthly</changefreq>").count(), 3);
        assert_eq!(xml.matches("<priority>0.6</priority>").count(), 3);
    }

    #[test]
    fn test_pagination_urls() {
        let docs = generate(13);
        let xml = text(&docs[0]);
        assert!(!xml.contains("blog/page/1/"));
        assert!(xml.contains("<loc>https://example.com/blog/page/2/</loc>"));
        assert!(xml.contains("<loc>https://example.com/blog/page/3/</loc>"));
        assert!(!xml.contains("blog/page/4/"));
        assert_eq!(xml.matches("<priority>0.7</priority>").count(), 2);
    }

    #[test]
    fn test_empty_blog() {
        let docs = generate(0);
        assert_eq!(docs.len(), 1);
        assert_eq!(url_count(&docs[0]), 4);
    }

    #[test]
    fn test_exactly_at_threshold() {
        // 4 static pages + 70 listing pages + 426 posts
        let docs = generate(426);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name, "sitemap.xml");
        assert_eq!(url_count(&docs[0]), 500);
        assert!(!text(&docs[0]).contains("sitemapindex"));
    }

    #[test]
    fn test_over_threshold_builds_index() {
        let docs = generate(427);
        let names: Vec<&str> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, ["sitemap1.xml", "sitemap2.xml", "sitemap.xml"]);

        let index = text(index_doc(&docs));
        assert!(index.contains(r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(index.contains("<loc>https://example.com/sitemap1.xml</loc>"));
        assert!(index.contains("<loc>https://example.com/sitemap2.xml</loc>"));
        assert_eq!(index.matches("<sitemap>").count(), 2);
        assert!(!index.contains("<url>"));

        // 4 static pages + 71 listing pages
        assert_eq!(url_count(&docs[0]), 75);
        assert!(!text(&docs[0]).contains("/blog/post-"));
        assert_eq!(url_count(&docs[1]), 427);
    }

    #[test]
    fn test_posts_spread_over_partitions() {
        let docs = generate(1200);
        assert_eq!(docs.len(), 5);
        assert_eq!(text(index_doc(&docs)).matches("<sitemap>").count(), 4);
        for doc in &docs[1..4] {
            assert_eq!(url_count(doc), 400);
        }
        for doc in &docs[..4] {
            assert!(url_count(doc) <= 500);
        }
        assert!(text(&docs[3]).contains("<loc>https://example.com/blog/post-1199/</loc>"));
    }

    #[test]
    fn test_small_threshold_splits_site_pages() {
        let site = site();
        let sitemap = Sitemap {
            page_size: 6,
            max_urls_per_sitemap: 3,
        };
        let docs = SitemapGenerator::new(&site, &sitemap, today()).generate(&posts(5)).unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.file_name.as_str()).collect();
        // 4 static pages in two files, 5 posts in two files of 3 and 2
        assert_eq!(names, ["sitemap1.xml", "sitemap2.xml", "sitemap3.xml", "sitemap4.xml", "sitemap.xml"]);
        let counts: Vec<usize> = docs[..4].iter().map(url_count).collect();
        assert_eq!(counts, [3, 1, 3, 2]);
    }

    #[test]
    fn test_part_file_names() {
        assert!(is_part_file_name("sitemap1.xml"));
        assert!(is_part_file_name("sitemap12.xml"));
        assert!(!is_part_file_name("sitemap.xml"));
        assert!(!is_part_file_name("sitemap-posts.xml"));
        assert!(!is_part_file_name("old-sitemap1.xml"));
        assert!(!is_part_file_name("sitemap1.xml.bak"));
    }

    #[test]
    fn test_full_url() {
        assert_eq!(full_url("https://a.com", ""), "https://a.com/");
        assert_eq!(full_url("https://a.com/", "/blog/"), "https://a.com/blog/");
    }
}
