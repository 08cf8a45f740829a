//! Text adapter that mounts core effects on a terminal.

use std::{io::Write, sync::Mutex};

use client_core::{DisplayUnit, ImageRegion, Panel, UiEffect, UiSurface};
use shared::protocol::NewPost;

/// The create form's draft. Kept after a failed submit so it can be resent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub image_url: String,
    pub title: String,
    pub description: String,
}

impl FormDraft {
    pub fn is_empty(&self) -> bool {
        self.image_url.is_empty() && self.title.is_empty() && self.description.is_empty()
    }

    pub fn to_payload(&self) -> NewPost {
        NewPost::from_form(&self.image_url, &self.title, &self.description)
    }
}

struct TerminalState<W> {
    out: W,
    visible_panel: Option<Panel>,
    error_message: String,
    form_visible: bool,
    draft: FormDraft,
}

pub struct TerminalSurface<W: Write + Send> {
    state: Mutex<TerminalState<W>>,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                out,
                visible_panel: None,
                error_message: String::new(),
                form_visible: true,
                draft: FormDraft::default(),
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TerminalState<W>) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn form_visible(&self) -> bool {
        self.with_state(|state| state.form_visible)
    }

    pub fn draft(&self) -> FormDraft {
        self.with_state(|state| state.draft.clone())
    }

    pub fn set_draft(&self, draft: FormDraft) {
        self.with_state(|state| state.draft = draft);
    }

    pub fn print(&self, line: &str) {
        self.with_state(|state| {
            let _ = writeln!(state.out, "{line}");
            let _ = state.out.flush();
        });
    }

    /// Prints `text` without a trailing newline, for inline prompts.
    pub fn prompt(&self, text: &str) {
        self.with_state(|state| {
            let _ = write!(state.out, "{text}");
            let _ = state.out.flush();
        });
    }

    pub fn show_cards(&self, cards: &[DisplayUnit]) {
        self.with_state(|state| write_cards(&mut state.out, cards));
    }
}

impl TerminalSurface<Vec<u8>> {
    pub fn take_output(&self) -> String {
        self.with_state(|state| String::from_utf8_lossy(&std::mem::take(&mut state.out)).into_owned())
    }
}

fn write_cards<W: Write>(out: &mut W, cards: &[DisplayUnit]) {
    for card in cards {
        let _ = writeln!(out, "[{}] {}", card.post_id, card.title);
        if !card.description.as_str().is_empty() {
            let _ = writeln!(out, "    {}", card.description);
        }
        match &card.image {
            ImageRegion::Loaded { src, .. } if src.is_empty() => {}
            ImageRegion::Loaded { src, .. } => {
                let _ = writeln!(out, "    image: {src}");
            }
            ImageRegion::FailedWithPlaceholder { glyph } => {
                let _ = writeln!(out, "    image: {glyph}");
            }
        }
    }
    let _ = out.flush();
}

impl<W: Write + Send> UiSurface for TerminalSurface<W> {
    fn apply(&self, effect: UiEffect) {
        tracing::debug!(effect = effect.name(), "terminal effect");
        self.with_state(|state| {
            let out = &mut state.out;
            match effect {
                UiEffect::SetPanelVisible {
                    panel,
                    visible: false,
                } => {
                    if state.visible_panel == Some(panel) {
                        state.visible_panel = None;
                    }
                }
                UiEffect::SetPanelVisible {
                    panel,
                    visible: true,
                } => {
                    state.visible_panel = Some(panel);
                    match panel {
                        Panel::Loading => {
                            let _ = writeln!(out, "Loading posts...");
                        }
                        Panel::Error => {
                            let _ = writeln!(
                                out,
                                "Error: {} (type `retry` to try again)",
                                state.error_message
                            );
                        }
                        Panel::Empty => {
                            let _ = writeln!(out, "No posts yet. Create one with `new`.");
                        }
                        Panel::Content => {}
                    }
                }
                UiEffect::ErrorMessage(message) => state.error_message = message,
                UiEffect::ReplaceCards(cards) => {
                    if state.visible_panel == Some(Panel::Content) {
                        write_cards(out, &cards);
                    }
                }
                UiEffect::ImagePlaceholder { post_id, glyph } => {
                    let _ = writeln!(out, "[{post_id}] image unavailable {glyph}");
                }
                UiEffect::SubmitControl { busy: true } => {
                    let _ = writeln!(out, "Submitting...");
                }
                UiEffect::SubmitControl { busy: false } => {}
                UiEffect::ShowNotification { text, is_error } => {
                    let marker = if is_error { "!!" } else { "ok" };
                    let _ = writeln!(out, "[{marker}] {text}");
                }
                UiEffect::HideNotification => {}
                UiEffect::ClearForm => state.draft = FormDraft::default(),
                UiEffect::FormVisible(visible) => {
                    state.form_visible = visible;
                    let _ = writeln!(
                        out,
                        "Create form {}.",
                        if visible { "shown" } else { "hidden" }
                    );
                }
                UiEffect::ScrollToPosts => {
                    let _ = writeln!(out, "-- posts --");
                }
            }
            let _ = out.flush();
        });
    }
}
