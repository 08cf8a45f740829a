//! Post card rendering: a pure mapping from [`Post`] to a mountable [`DisplayUnit`].

use std::fmt;

use shared::{domain::PostId, protocol::Post};

use crate::controller::{DeleteOutcome, PostsController};

pub const IMAGE_PLACEHOLDER_GLYPH: &str = "🖼️";

/// Text that adapters must mount as literal text, never as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralText(String);

impl LiteralText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LiteralText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRegion {
    /// The adapter attempts to load `src`.
    Loaded { src: String, alt: LiteralText },
    /// Terminal state after a load failure; never retried.
    FailedWithPlaceholder { glyph: &'static str },
}

/// Delete control bound to one post id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAction {
    post_id: PostId,
}

impl DeleteAction {
    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    pub async fn activate(&self, controller: &PostsController) -> DeleteOutcome {
        controller.delete(&self.post_id).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUnit {
    pub post_id: PostId,
    pub image: ImageRegion,
    pub title: LiteralText,
    pub description: LiteralText,
    pub delete: DeleteAction,
}

impl DisplayUnit {
    /// Handles the adapter's "image load failed" event. Returns `true` only on
    /// the first failure, when the region switches to the placeholder.
    pub fn image_load_failed(&mut self) -> bool {
        match self.image {
            ImageRegion::Loaded { .. } => {
                self.image = ImageRegion::FailedWithPlaceholder {
                    glyph: IMAGE_PLACEHOLDER_GLYPH,
                };
                true
            }
            ImageRegion::FailedWithPlaceholder { .. } => false,
        }
    }
}

pub fn render(post: &Post) -> DisplayUnit {
    DisplayUnit {
        post_id: post.id.clone(),
        image: ImageRegion::Loaded {
            src: post.image_url.clone(),
            alt: LiteralText::new(post.title.clone()),
        },
        title: LiteralText::new(post.title.clone()),
        description: LiteralText::new(post.description.clone()),
        delete: DeleteAction {
            post_id: post.id.clone(),
        },
    }
}
