pub mod config;
pub mod logger;
pub mod slug;
pub mod text_utils;
pub mod post;
pub mod archive;
pub mod feed;
pub mod sitemap;
pub mod paginator;
pub mod post_query;
pub mod output;
pub mod pipeline;
pub mod error;
pub mod util;
mod test_data;
