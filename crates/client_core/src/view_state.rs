//! Single active display mode of the posts list.

use shared::protocol::Post;

use crate::effects::{Panel, UiEffect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Error(String),
    Empty,
    Content(Vec<Post>),
}

impl ViewState {
    pub fn panel(&self) -> Panel {
        match self {
            ViewState::Loading => Panel::Loading,
            ViewState::Error(_) => Panel::Error,
            ViewState::Empty => Panel::Empty,
            ViewState::Content(_) => Panel::Content,
        }
    }
}

/// Effects that make `state`'s panel the only visible one.
///
/// Every panel gets an explicit visibility effect, hides first, so an adapter
/// applying them in order never shows two panels at once.
pub fn effects_for(state: &ViewState) -> Vec<UiEffect> {
    let active = state.panel();
    let mut effects: Vec<UiEffect> = Panel::ALL
        .into_iter()
        .filter(|panel| *panel != active)
        .map(|panel| UiEffect::SetPanelVisible {
            panel,
            visible: false,
        })
        .collect();
    if let ViewState::Error(message) = state {
        effects.push(UiEffect::ErrorMessage(message.clone()));
    }
    effects.push(UiEffect::SetPanelVisible {
        panel: active,
        visible: true,
    });
    effects
}

#[derive(Debug, Default)]
pub struct ViewStateController {
    state: Option<ViewState>,
}

impl ViewStateController {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first transition.
    pub fn state(&self) -> Option<&ViewState> {
        self.state.as_ref()
    }

    pub fn mode(&self) -> Option<Panel> {
        self.state.as_ref().map(ViewState::panel)
    }

    pub fn visible_panels(&self) -> Vec<Panel> {
        self.mode().into_iter().collect()
    }

    pub fn enter_loading(&mut self) -> Vec<UiEffect> {
        self.transition(ViewState::Loading)
    }

    pub fn enter_error(&mut self, message: impl Into<String>) -> Vec<UiEffect> {
        self.transition(ViewState::Error(message.into()))
    }

    pub fn enter_empty(&mut self) -> Vec<UiEffect> {
        self.transition(ViewState::Empty)
    }

    pub fn enter_content(&mut self, posts: Vec<Post>) -> Vec<UiEffect> {
        self.transition(ViewState::Content(posts))
    }

    fn transition(&mut self, next: ViewState) -> Vec<UiEffect> {
        tracing::debug!(
            from = self.mode().map(Panel::label),
            to = next.panel().label(),
            "view state transition"
        );
        let effects = effects_for(&next);
        self.state = Some(next);
        effects
    }
}
