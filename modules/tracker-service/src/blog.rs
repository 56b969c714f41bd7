//! Blog archive: posts are published once and never edited.
//!
//! List views carry a short excerpt instead of the post body; only
//! `get_by_id` returns `content`.

use crate::activities::non_empty;
use crate::error::{StoreError, StoreResult};
use crate::storage::Storage;
use crate::store::{self, Collection, RecordStore};
use std::sync::Arc;
use tracker_types::{BlogCollection, BlogListing, BlogPost, PostSummary, PublishPostRequest};

pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Characters of content kept in a derived excerpt.
pub const EXCERPT_CHARS: usize = 200;

impl Collection for BlogCollection {
    const NAME: &'static str = "blog";

    fn max_id(&self) -> Option<u64> {
        self.posts.iter().filter_map(|p| store::numeric_id(&p.id)).max()
    }
}

/// First `EXCERPT_CHARS` characters of `content`, newlines turned into
/// spaces, followed by `...`. `\r\n` counts as a single newline.
pub fn derive_excerpt(content: &str) -> String {
    let mut excerpt: String = content
        .replace("\r\n", "\n")
        .chars()
        .take(EXCERPT_CHARS)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    excerpt.push_str("...");
    excerpt
}

fn summarize(post: BlogPost) -> PostSummary {
    let excerpt = match non_empty(post.excerpt) {
        Some(excerpt) => excerpt,
        None => derive_excerpt(&post.content),
    };
    PostSummary {
        id: post.id,
        timestamp: post.timestamp,
        title: post.title,
        excerpt,
        tags: post.tags,
        image: post.image,
    }
}

pub struct BlogArchive {
    store: RecordStore<BlogCollection>,
}

impl BlogArchive {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            store: RecordStore::new(storage),
        }
    }

    pub fn store(&self) -> &RecordStore<BlogCollection> {
        &self.store
    }

    pub fn publish(&self, request: PublishPostRequest) -> StoreResult<BlogPost> {
        let title = non_empty(request.title);
        let content = non_empty(request.content);
        let (title, content) = match (title, content) {
            (Some(title), Some(content)) => (title, content),
            _ => return Err(StoreError::validation("title and content are required")),
        };
        let excerpt = match non_empty(request.excerpt) {
            Some(excerpt) => excerpt,
            None => derive_excerpt(&content),
        };

        self.store.mutate(|state| {
            let now = store::now();
            let post = BlogPost {
                id: store::next_id(state.max_id(), now)?,
                timestamp: now,
                title,
                content,
                excerpt: Some(excerpt),
                tags: request.tags.unwrap_or_default(),
                image: non_empty(request.image),
            };

            state.posts.insert(0, post.clone());
            state.stats.total_posts += 1;
            state.stats.last_update = Some(now);

            Ok(post)
        })
    }

    /// The newest `limit` posts without their bodies.
    pub fn list_summaries(&self, limit: usize) -> StoreResult<BlogListing> {
        let state = self.store.load()?;
        Ok(BlogListing {
            posts: state.posts.into_iter().take(limit).map(summarize).collect(),
            stats: state.stats,
        })
    }

    pub fn get_by_id(&self, id: &str) -> StoreResult<BlogPost> {
        self.store
            .load()?
            .posts
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Post not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use tracker_types::BlogStats;

    fn archive() -> BlogArchive {
        let archive = BlogArchive::new(Arc::new(MemoryStorage::new()));
        archive.store().initialize().unwrap();
        archive
    }

    fn request(title: &str, content: &str) -> PublishPostRequest {
        PublishPostRequest {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_excerpt_is_first_200_chars_with_ellipsis() {
        let line = "x".repeat(99);
        let content = format!("{}\n{}\n{}", line, line, "y".repeat(100));
        assert_eq!(content.chars().count(), 300);

        let post = archive().publish(request("Long", &content)).unwrap();
        let excerpt = post.excerpt.unwrap();

        let expected = format!("{} {} ...", line, line);
        assert_eq!(excerpt, expected);
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
        assert!(!excerpt.contains('\n'));
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let content = "ü".repeat(250);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt, format!("{}...", "ü".repeat(200)));
    }

    #[test]
    fn test_excerpt_collapses_crlf_and_cr() {
        assert_eq!(derive_excerpt("line one\r\nline two"), "line one line two...");
        assert_eq!(derive_excerpt("mac\rstyle"), "mac style...");
    }

    #[test]
    fn test_explicit_excerpt_is_kept() {
        let mut req = request("Short", "body");
        req.excerpt = Some("hand written".to_string());
        let post = archive().publish(req).unwrap();
        assert_eq!(post.excerpt.as_deref(), Some("hand written"));
    }

    #[test]
    fn test_publish_requires_title_and_content() {
        let archive = archive();
        assert!(matches!(
            archive.publish(request("", "body")),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            archive.publish(PublishPostRequest {
                title: Some("title".to_string()),
                ..Default::default()
            }),
            Err(StoreError::Validation(_))
        ));
        assert!(archive.list_summaries(DEFAULT_LIST_LIMIT).unwrap().posts.is_empty());
    }

    #[test]
    fn test_list_hides_content_and_detail_shows_it() {
        let archive = archive();
        let mut req = request("With image", "The body");
        req.tags = Some(vec!["rust".to_string()]);
        req.image = Some("https://example.com/a.png".to_string());
        let post = archive.publish(req).unwrap();

        let listing = archive.list_summaries(DEFAULT_LIST_LIMIT).unwrap();
        let value = serde_json::to_value(&listing).unwrap();
        let first = &value["posts"][0];
        assert!(first.get("content").is_none());
        assert_eq!(first["excerpt"], "The body...");
        assert_eq!(first["image"], "https://example.com/a.png");
        assert_eq!(value["stats"]["totalPosts"], 1);

        let detail = serde_json::to_value(archive.get_by_id(&post.id).unwrap()).unwrap();
        assert_eq!(detail["content"], "The body");
        assert_eq!(detail["tags"][0], "rust");
    }

    #[test]
    fn test_list_respects_limit_newest_first() {
        let archive = archive();
        for i in 0..5 {
            archive.publish(request(&format!("Post {}", i), "body")).unwrap();
        }

        let listing = archive.list_summaries(2).unwrap();
        let titles: Vec<_> = listing.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Post 4", "Post 3"]);
        assert_eq!(listing.stats.total_posts, 5);
    }

    #[test]
    fn test_legacy_post_gets_excerpt_on_read() {
        let archive = archive();
        let legacy = BlogCollection {
            posts: vec![BlogPost {
                id: "1700000000000".to_string(),
                timestamp: store::now(),
                title: "Old".to_string(),
                content: "line one\nline two".to_string(),
                excerpt: None,
                tags: vec![],
                image: None,
            }],
            stats: BlogStats {
                total_posts: 1,
                last_update: None,
            },
            extra: Default::default(),
        };
        archive.store().save(&legacy).unwrap();

        let listing = archive.list_summaries(DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(listing.posts[0].excerpt, "line one line two...");
    }

    #[test]
    fn test_blank_stored_excerpt_is_derived_on_read() {
        let archive = archive();
        let stored = BlogCollection {
            posts: vec![BlogPost {
                id: "1700000000000".to_string(),
                timestamp: store::now(),
                title: "Hand edited".to_string(),
                content: "real body".to_string(),
                excerpt: Some("  ".to_string()),
                tags: vec![],
                image: None,
            }],
            stats: BlogStats {
                total_posts: 1,
                last_update: None,
            },
            extra: Default::default(),
        };
        archive.store().save(&stored).unwrap();

        let listing = archive.list_summaries(DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(listing.posts[0].excerpt, "real body...");
    }

    #[test]
    fn test_get_unknown_post_is_not_found() {
        assert!(matches!(
            archive().get_by_id("nope"),
            Err(StoreError::NotFound(_))
        ));
    }
}
