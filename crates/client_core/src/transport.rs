//! Remote posts resource: the trait the orchestrator talks to and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::PostId,
    protocol::{NewPost, Post},
};
use tracing::debug;
use url::Url;

use crate::error::ResourceError;

pub const DEFAULT_API_URL: &str = "http://localhost:3004/posts";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait PostsResource: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>, ResourceError>;
    async fn create_post(&self, payload: &NewPost) -> Result<Post, ResourceError>;
    async fn delete_post(&self, id: &PostId) -> Result<(), ResourceError>;
}

/// CRUD client for a single collection endpoint (`GET`/`POST <base>`,
/// `DELETE <base>/{id}`).
pub struct HttpPostsResource {
    http: Client,
    base: Url,
}

impl HttpPostsResource {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ResourceError> {
        let base = Url::parse(base_url.trim())
            .map_err(|_| ResourceError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ResourceError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ResourceError::Transport(e.to_string()))?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn item_url(&self, id: &PostId) -> Result<Url, ResourceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ResourceError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

fn ensure_success(response: Response) -> Result<Response, ResourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ResourceError::Status(status.as_u16()))
    }
}

#[async_trait]
impl PostsResource for HttpPostsResource {
    async fn list_posts(&self) -> Result<Vec<Post>, ResourceError> {
        let response = self.http.get(self.base.clone()).send().await?;
        let posts: Vec<Post> = ensure_success(response)?.json().await?;
        debug!(count = posts.len(), url = %self.base, "listed posts");
        Ok(posts)
    }

    async fn create_post(&self, payload: &NewPost) -> Result<Post, ResourceError> {
        let response = self
            .http
            .post(self.base.clone())
            .json(payload)
            .send()
            .await?;
        let post: Post = ensure_success(response)?.json().await?;
        debug!(post_id = %post.id, "created post");
        Ok(post)
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), ResourceError> {
        let url = self.item_url(id)?;
        let response = self.http.delete(url).send().await?;
        ensure_success(response)?;
        debug!(post_id = %id, "deleted post");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
