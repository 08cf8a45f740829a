//! Render effects emitted by the core and the adapter seam that mounts them.

use shared::domain::PostId;

use crate::render::DisplayUnit;

/// The four mutually exclusive list panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Loading,
    Error,
    Empty,
    Content,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Loading, Panel::Error, Panel::Empty, Panel::Content];

    pub fn label(self) -> &'static str {
        match self {
            Panel::Loading => "loading",
            Panel::Error => "error",
            Panel::Empty => "empty",
            Panel::Content => "content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    SetPanelVisible { panel: Panel, visible: bool },
    ErrorMessage(String),
    /// Full replacement of the rendered cards, in server order.
    ReplaceCards(Vec<DisplayUnit>),
    ImagePlaceholder { post_id: PostId, glyph: &'static str },
    /// Submission control: disabled with an in-progress affordance while busy.
    SubmitControl { busy: bool },
    ShowNotification { text: String, is_error: bool },
    HideNotification,
    ClearForm,
    FormVisible(bool),
    ScrollToPosts,
}

impl UiEffect {
    pub fn name(&self) -> &'static str {
        match self {
            UiEffect::SetPanelVisible { .. } => "set_panel_visible",
            UiEffect::ErrorMessage(_) => "error_message",
            UiEffect::ReplaceCards(_) => "replace_cards",
            UiEffect::ImagePlaceholder { .. } => "image_placeholder",
            UiEffect::SubmitControl { .. } => "submit_control",
            UiEffect::ShowNotification { .. } => "show_notification",
            UiEffect::HideNotification => "hide_notification",
            UiEffect::ClearForm => "clear_form",
            UiEffect::FormVisible(_) => "form_visible",
            UiEffect::ScrollToPosts => "scroll_to_posts",
        }
    }
}

/// Presentation adapter. Implementations mount effects on a real surface
/// (terminal, DOM bridge, test recorder) and must not call back into the core.
pub trait UiSurface: Send + Sync {
    fn apply(&self, effect: UiEffect);
}
