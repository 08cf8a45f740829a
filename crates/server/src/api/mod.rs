use shared::{
    domain::PostId,
    error::{ApiException, ErrorCode},
    protocol::{NewPost, Post},
};

use crate::store::PostStore;

pub const MAX_TITLE_BYTES: usize = 200;
pub const MAX_DESCRIPTION_BYTES: usize = 4_000;
pub const MAX_IMAGE_URL_BYTES: usize = 2_048;

#[derive(Clone)]
pub struct ApiContext {
    pub store: PostStore,
}

pub fn posts_route() -> &'static str {
    "/posts"
}

pub fn post_item_route() -> &'static str {
    "/posts/:post_id"
}

pub async fn list_posts(ctx: &ApiContext) -> Vec<Post> {
    ctx.store.list().await
}

pub async fn get_post(ctx: &ApiContext, post_id: &PostId) -> Result<Post, ApiException> {
    ctx.store.get(post_id).await.ok_or_else(|| not_found(post_id))
}

pub async fn create_post(ctx: &ApiContext, payload: NewPost) -> Result<Post, ApiException> {
    let payload = NewPost::from_form(&payload.image_url, &payload.title, &payload.description);
    if payload.title.is_empty() {
        return Err(ApiException::new(
            ErrorCode::Validation,
            "title cannot be empty",
        ));
    }
    ensure_max_len("title", &payload.title, MAX_TITLE_BYTES)?;
    ensure_max_len("description", &payload.description, MAX_DESCRIPTION_BYTES)?;
    ensure_max_len("imageUrl", &payload.image_url, MAX_IMAGE_URL_BYTES)?;

    Ok(ctx.store.insert(payload).await)
}

pub async fn delete_post(ctx: &ApiContext, post_id: &PostId) -> Result<Post, ApiException> {
    ctx.store
        .remove(post_id)
        .await
        .ok_or_else(|| not_found(post_id))
}

fn ensure_max_len(field: &str, value: &str, max: usize) -> Result<(), ApiException> {
    if value.len() > max {
        return Err(ApiException::new(
            ErrorCode::Validation,
            format!("{field} exceeds {max} bytes"),
        ));
    }
    Ok(())
}

fn not_found(post_id: &PostId) -> ApiException {
    ApiException::new(ErrorCode::NotFound, format!("post {post_id} not found"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
