use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use serde::Deserialize;
use shared::{
    domain::PostId,
    protocol::{NewPost, Post},
};
use tokio::sync::RwLock;

/// Seed file layout: either a json-server style `{"posts": [...]}` document
/// or a bare array of posts.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeedDocument {
    Database { posts: Vec<Post> },
    Posts(Vec<Post>),
}

struct StoreInner {
    posts: Vec<Post>,
    next_id: i64,
}

#[derive(Clone)]
pub struct PostStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl PostStore {
    pub fn new(posts: Vec<Post>) -> Self {
        // Numeric ids continue after the highest seeded one; other ids are left alone.
        let next_id = posts
            .iter()
            .filter_map(|post| post.id.as_str().parse::<i64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            inner: Arc::new(RwLock::new(StoreInner { posts, next_id })),
        }
    }

    pub fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
        let posts = parse_seed(&raw)
            .with_context(|| format!("failed to parse seed file '{}'", path.display()))?;
        Ok(Self::new(posts))
    }

    pub async fn list(&self) -> Vec<Post> {
        self.inner.read().await.posts.clone()
    }

    pub async fn get(&self, id: &PostId) -> Option<Post> {
        let guard = self.inner.read().await;
        guard.posts.iter().find(|post| &post.id == id).cloned()
    }

    pub async fn insert(&self, payload: NewPost) -> Post {
        let mut guard = self.inner.write().await;
        let id = PostId::from(guard.next_id);
        guard.next_id += 1;
        let post = payload.into_post(id);
        guard.posts.push(post.clone());
        post
    }

    pub async fn remove(&self, id: &PostId) -> Option<Post> {
        let mut guard = self.inner.write().await;
        let index = guard.posts.iter().position(|post| &post.id == id)?;
        Some(guard.posts.remove(index))
    }
}

fn parse_seed(raw: &str) -> anyhow::Result<Vec<Post>> {
    let document: SeedDocument = serde_json::from_str(raw)?;
    Ok(match document {
        SeedDocument::Database { posts } => posts,
        SeedDocument::Posts(posts) => posts,
    })
}
