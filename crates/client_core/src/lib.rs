use async_trait::async_trait;

pub mod controller;
pub mod effects;
pub mod error;
pub mod gate;
pub mod notification;
pub mod render;
pub mod transport;
pub mod view_state;

pub use controller::{
    ControllerOptions, ControllerSnapshot, CreateOutcome, DeleteOutcome, FetchOutcome,
    PostsController,
};
pub use effects::{Panel, UiEffect, UiSurface};
pub use error::{FailureKind, Operation, ResourceError};
pub use render::{render, DisplayUnit, ImageRegion, LiteralText};
pub use transport::{HttpPostsResource, PostsResource};
pub use view_state::{ViewState, ViewStateController};

/// Yes/no gate consulted before destructive operations.
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Accepts every prompt; for non-interactive runs.
pub struct AutoConfirm;

#[async_trait]
impl ConfirmPrompt for AutoConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}
