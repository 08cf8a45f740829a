use serde::{Deserialize, Serialize};

use crate::domain::PostId;

/// A post record as returned by the remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub image_url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `POST <base>`; the resource assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(default)]
    pub image_url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl NewPost {
    /// Builds a payload from raw form fields, trimming surrounding whitespace.
    pub fn from_form(image_url: &str, title: &str, description: &str) -> Self {
        Self {
            image_url: image_url.trim().to_string(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
        }
    }

    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            image_url: self.image_url,
            title: self.title,
            description: self.description,
        }
    }
}
