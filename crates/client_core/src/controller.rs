//! CRUD orchestration: sequences calls against the posts resource and maps
//! every outcome onto view-state transitions or notifications.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::PostId,
    protocol::{NewPost, Post},
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    effects::{Panel, UiEffect, UiSurface},
    error::Operation,
    gate::SubmissionGate,
    notification::{Notification, NotificationEmitter, DEFAULT_NOTIFICATION_DURATION},
    render::{render, DisplayUnit, IMAGE_PLACEHOLDER_GLYPH},
    transport::PostsResource,
    view_state::{ViewState, ViewStateController},
    ConfirmPrompt,
};

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(500);
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this post?";
pub const CREATE_SUCCESS: &str = "Post created successfully!";
pub const DELETE_SUCCESS: &str = "Post deleted successfully!";

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub notification_duration: Duration,
    /// Pause between the create success notification and the list refresh.
    pub refresh_delay: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Empty,
    Content(usize),
    Failed(String),
    /// A newer fetch was issued before this one completed; nothing applied.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Post),
    Failed(String),
    AlreadySubmitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ControllerSnapshot {
    pub view: Option<ViewState>,
    pub cards: Vec<DisplayUnit>,
    pub submitting: bool,
    pub form_visible: bool,
    pub notification: Option<Notification>,
}

struct ControllerState {
    view: ViewStateController,
    cards: Vec<DisplayUnit>,
    latest_generation: u64,
    form_visible: bool,
}

pub struct PostsController {
    resource: Arc<dyn PostsResource>,
    surface: Arc<dyn UiSurface>,
    confirm: Arc<dyn ConfirmPrompt>,
    notifier: NotificationEmitter,
    gate: SubmissionGate,
    refresh_delay: Duration,
    inner: Mutex<ControllerState>,
}

impl PostsController {
    pub fn new(
        resource: Arc<dyn PostsResource>,
        surface: Arc<dyn UiSurface>,
        confirm: Arc<dyn ConfirmPrompt>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            notifier: NotificationEmitter::new(surface.clone(), options.notification_duration),
            gate: SubmissionGate::new(surface.clone()),
            resource,
            surface,
            confirm,
            refresh_delay: options.refresh_delay,
            inner: Mutex::new(ControllerState {
                view: ViewStateController::new(),
                cards: Vec::new(),
                latest_generation: 0,
                form_visible: true,
            }),
        }
    }

    fn apply_all(&self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.surface.apply(effect);
        }
    }

    /// Initial load.
    pub async fn start(&self) -> FetchOutcome {
        info!("loading posts on startup");
        self.fetch_all().await
    }

    pub async fn refresh(&self) -> FetchOutcome {
        self.fetch_all().await
    }

    pub async fn retry(&self) -> FetchOutcome {
        self.fetch_all().await
    }

    /// Replaces the rendered list with the resource's current collection.
    ///
    /// Each call takes a new generation; a completion is applied only if no
    /// later fetch has been issued in the meantime.
    pub async fn fetch_all(&self) -> FetchOutcome {
        let generation = {
            let mut state = self.inner.lock().await;
            state.latest_generation += 1;
            let effects = state.view.enter_loading();
            self.apply_all(effects);
            state.latest_generation
        };

        let result = self.resource.list_posts().await;

        let mut state = self.inner.lock().await;
        if generation != state.latest_generation {
            warn!(
                generation,
                latest = state.latest_generation,
                "discarding superseded posts fetch"
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(posts) if posts.is_empty() => {
                state.cards.clear();
                let effects = state.view.enter_empty();
                self.apply_all(effects);
                self.surface.apply(UiEffect::ReplaceCards(Vec::new()));
                info!(generation, "posts collection is empty");
                FetchOutcome::Empty
            }
            Ok(posts) => {
                let cards: Vec<DisplayUnit> = posts.iter().map(render).collect();
                let count = cards.len();
                state.cards = cards.clone();
                let effects = state.view.enter_content(posts);
                self.apply_all(effects);
                self.surface.apply(UiEffect::ReplaceCards(cards));
                info!(generation, count, "posts loaded");
                FetchOutcome::Content(count)
            }
            Err(err) => {
                error!(generation, kind = ?err.kind(), error = %err, "error fetching posts");
                let message = err.user_message(Operation::Fetch);
                let effects = state.view.enter_error(message.clone());
                self.apply_all(effects);
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Submits a pre-trimmed payload. Only one create may be in flight; the
    /// submission gate stays engaged until the follow-up refresh finishes.
    pub async fn create(&self, payload: NewPost) -> CreateOutcome {
        let Some(_guard) = self.gate.try_enter() else {
            warn!("create ignored; a submission is already in flight");
            return CreateOutcome::AlreadySubmitting;
        };

        match self.resource.create_post(&payload).await {
            Ok(post) => {
                info!(post_id = %post.id, "post created");
                self.notifier.notify(CREATE_SUCCESS, false).await;
                self.surface.apply(UiEffect::ClearForm);
                tokio::time::sleep(self.refresh_delay).await;
                self.surface.apply(UiEffect::ScrollToPosts);
                self.fetch_all().await;
                CreateOutcome::Created(post)
            }
            Err(err) => {
                error!(kind = ?err.kind(), error = %err, "error creating post");
                let message = err.user_message(Operation::Create);
                self.notifier.notify(message.clone(), true).await;
                CreateOutcome::Failed(message)
            }
        }
    }

    /// Deletes `id` after user confirmation; declining contacts nothing.
    pub async fn delete(&self, id: &PostId) -> DeleteOutcome {
        if !self.confirm.confirm(DELETE_CONFIRMATION).await {
            info!(post_id = %id, "delete declined");
            return DeleteOutcome::Declined;
        }

        match self.resource.delete_post(id).await {
            Ok(()) => {
                info!(post_id = %id, "post deleted");
                self.notifier.notify(DELETE_SUCCESS, false).await;
                self.fetch_all().await;
                DeleteOutcome::Deleted
            }
            Err(err) => {
                error!(post_id = %id, kind = ?err.kind(), error = %err, "error deleting post");
                let message = err.user_message(Operation::Delete);
                self.notifier.notify(message.clone(), true).await;
                DeleteOutcome::Failed(message)
            }
        }
    }

    /// Routes an adapter's image load failure to the rendered card.
    pub async fn report_image_failure(&self, id: &PostId) -> bool {
        let mut state = self.inner.lock().await;
        if state.view.mode() != Some(Panel::Content) {
            warn!(post_id = %id, "image failure while posts are not displayed");
            return false;
        }
        let Some(card) = state.cards.iter_mut().find(|card| &card.post_id == id) else {
            warn!(post_id = %id, "image failure for a post that is not rendered");
            return false;
        };
        if !card.image_load_failed() {
            return false;
        }
        self.surface.apply(UiEffect::ImagePlaceholder {
            post_id: id.clone(),
            glyph: IMAGE_PLACEHOLDER_GLYPH,
        });
        true
    }

    pub fn scroll_to_posts(&self) {
        self.surface.apply(UiEffect::ScrollToPosts);
    }

    pub async fn toggle_form(&self) -> bool {
        let mut state = self.inner.lock().await;
        state.form_visible = !state.form_visible;
        self.surface.apply(UiEffect::FormVisible(state.form_visible));
        state.form_visible
    }

    pub fn is_submitting(&self) -> bool {
        self.gate.is_engaged()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let notification = self.notifier.current().await;
        let state = self.inner.lock().await;
        ControllerSnapshot {
            view: state.view.state().cloned(),
            cards: state.cards.clone(),
            submitting: self.gate.is_engaged(),
            form_visible: state.form_visible,
            notification,
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
