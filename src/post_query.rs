use rand::seq::SliceRandom;
use rand::Rng;

use crate::post::Post;

/// Case-insensitive match on title or content. A blank term matches everything.
pub fn search_posts<'a>(posts: &'a [Post], term: &str) -> Vec<&'a Post> {
    let term = term.trim();
    if term.is_empty() {
        return posts.iter().collect();
    }

    let term = term.to_lowercase();
    posts.iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&term) || post.content.to_lowercase().contains(&term)
        })
        .collect()
}

pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|post| post.slug == slug)
}

/// Up to `count` other posts in random order.
pub fn related_posts<'a, R: Rng>(current: &Post, posts: &'a [Post], count: usize, rng: &mut R) -> Vec<&'a Post> {
    let mut others: Vec<&Post> = posts.iter()
        .filter(|post| post.id != current.id)
        .collect();
    others.shuffle(rng);
    others.truncate(count);
    others
}
