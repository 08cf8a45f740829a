//! Commands typed at the prompt and their dispatch onto the controller.

use std::{io::Write, sync::Arc};

use client_core::{
    ControllerSnapshot, CreateOutcome, DeleteOutcome, DisplayUnit, PostsController, ViewState,
};
use shared::domain::PostId;
use tracing::debug;

use crate::{
    input::LineInput,
    surface::{FormDraft, TerminalSurface},
};

pub const HELP: &str = "\
commands:
  refresh          reload the posts list
  retry            reload after an error
  new              fill in and submit the create form
  submit           resend the kept form draft
  delete <id>      delete a post (asks for confirmation)
  broken <id>      mark a post's image as failed to load
  view             print the rendered posts
  toggle           show or hide the create form
  help             show this text
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Refresh,
    Retry,
    New,
    Submit,
    Delete(PostId),
    BrokenImage(PostId),
    View,
    Toggle,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<UiCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments for `{verb}`"));
    }

    let with_id = |make: fn(PostId) -> UiCommand| match arg {
        Some(id) => Ok(Some(make(PostId::new(id)))),
        None => Err(format!("usage: {verb} <id>")),
    };
    let bare = |command: UiCommand| match arg {
        None => Ok(Some(command)),
        Some(_) => Err(format!("`{verb}` takes no arguments")),
    };

    match verb.to_ascii_lowercase().as_str() {
        "refresh" => bare(UiCommand::Refresh),
        "retry" => bare(UiCommand::Retry),
        "new" => bare(UiCommand::New),
        "submit" => bare(UiCommand::Submit),
        "delete" => with_id(UiCommand::Delete),
        "broken" => with_id(UiCommand::BrokenImage),
        "view" => bare(UiCommand::View),
        "toggle" => bare(UiCommand::Toggle),
        "help" | "?" => bare(UiCommand::Help),
        "quit" | "exit" => bare(UiCommand::Quit),
        other => Err(format!("unknown command `{other}`; type `help`")),
    }
}

pub struct Session<W: Write + Send> {
    controller: Arc<PostsController>,
    surface: Arc<TerminalSurface<W>>,
    input: LineInput,
}

impl<W: Write + Send> Session<W> {
    pub fn new(
        controller: Arc<PostsController>,
        surface: Arc<TerminalSurface<W>>,
        input: LineInput,
    ) -> Self {
        Self {
            controller,
            surface,
            input,
        }
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run(&self) -> std::io::Result<()> {
        loop {
            self.surface.prompt("> ");
            let Some(line) = self.input.next_line().await? else {
                return Ok(());
            };
            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    self.surface.print(&message);
                    continue;
                }
            };
            if self.dispatch(command).await? == Flow::Quit {
                return Ok(());
            }
        }
    }

    pub async fn dispatch(&self, command: UiCommand) -> std::io::Result<Flow> {
        debug!(?command, "dispatching command");
        match command {
            UiCommand::Refresh => {
                self.controller.refresh().await;
            }
            UiCommand::Retry => {
                self.controller.retry().await;
            }
            UiCommand::New => {
                if !self.surface.form_visible() {
                    self.surface
                        .print("The create form is hidden; type `toggle` to show it.");
                    return Ok(Flow::Continue);
                }
                let Some(draft) = self.read_draft().await? else {
                    return Ok(Flow::Quit);
                };
                self.surface.set_draft(draft);
                self.submit().await;
            }
            UiCommand::Submit => {
                if self.surface.draft().is_empty() {
                    self.surface.print("Nothing to submit; use `new` first.");
                } else {
                    self.submit().await;
                }
            }
            UiCommand::Delete(id) => {
                let snapshot = self.controller.snapshot().await;
                let Some(cards) = self.displayed_cards(&snapshot) else {
                    return Ok(Flow::Continue);
                };
                let Some(card) = cards.iter().find(|card| card.delete.post_id() == &id) else {
                    self.surface.print(&format!("No rendered post with id {id}."));
                    return Ok(Flow::Continue);
                };
                if card.delete.activate(&self.controller).await == DeleteOutcome::Declined {
                    self.surface.print("Delete cancelled.");
                }
            }
            UiCommand::BrokenImage(id) => {
                if !self.controller.report_image_failure(&id).await {
                    debug!(post_id = %id, "image failure ignored");
                }
            }
            UiCommand::View => {
                let snapshot = self.controller.snapshot().await;
                if let Some(cards) = self.displayed_cards(&snapshot) {
                    self.controller.scroll_to_posts();
                    self.surface.show_cards(cards);
                }
            }
            UiCommand::Toggle => {
                self.controller.toggle_form().await;
            }
            UiCommand::Help => self.surface.print(HELP),
            UiCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Cards are only actionable while the Content panel is the active one.
    fn displayed_cards<'a>(
        &self,
        snapshot: &'a ControllerSnapshot,
    ) -> Option<&'a [DisplayUnit]> {
        match &snapshot.view {
            Some(ViewState::Content(_)) => Some(&snapshot.cards),
            Some(other) => {
                self.surface.print(&format!(
                    "No posts on screen; the {} panel is active.",
                    other.panel().label()
                ));
                None
            }
            None => {
                self.surface.print("No posts loaded yet; type `refresh`.");
                None
            }
        }
    }

    async fn read_draft(&self) -> std::io::Result<Option<FormDraft>> {
        let mut fields = Vec::with_capacity(3);
        for label in ["Image URL: ", "Title: ", "Description: "] {
            self.surface.prompt(label);
            match self.input.next_line().await? {
                Some(value) => fields.push(value),
                None => return Ok(None),
            }
        }
        let description = fields.pop().unwrap_or_default();
        let title = fields.pop().unwrap_or_default();
        let image_url = fields.pop().unwrap_or_default();
        Ok(Some(FormDraft {
            image_url,
            title,
            description,
        }))
    }

    async fn submit(&self) {
        let payload = self.surface.draft().to_payload();
        match self.controller.create(payload).await {
            CreateOutcome::Created(_) => {}
            CreateOutcome::Failed(_) => {
                self.surface.print("The draft was kept; type `submit` to resend it.")
            }
            CreateOutcome::AlreadySubmitting => {
                self.surface.print("A submission is already in progress.")
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
