//! Session: the per-activation object every command handler receives.
//!
//! Owns the inference gateway (and its cached client), the pending suggestion
//! and the request counter. A command runs as `begin` → model call → `finish`;
//! each `begin` issues a new token, and `finish` drops any answer whose token
//! is no longer the latest.

use tracing::{debug, info, warn};

use crate::commands::Command;
use crate::config::Settings;
use crate::document::{Document, Position};
use crate::editor::{EditorHost, Notice};
use crate::llm::{InferenceGateway, LlmError};
use crate::prompts::system_prompt;
use crate::suggestion::{Phase, SuggestionState};
use crate::target::{self, Target};

/// What a command ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A suggestion is now pending.
    Proposed(Phase),
    /// The model returned nothing new.
    Unchanged,
    /// No usable target text.
    Rejected,
    /// Configuration or provider error; reported to the user.
    Failed,
    /// The answer arrived after a newer command or a conflicting edit.
    Stale,
    Accepted,
    Cleared,
    /// Nothing to do.
    Idle,
}

/// An issued request, handed back to [`Session::finish`] with the model's answer.
#[derive(Debug, Clone)]
pub struct Ticket {
    token: u64,
    command: Command,
    target: Target,
    system_prompt: String,
}

impl Ticket {
    pub fn command(&self) -> Command {
        self.command
    }

    /// Text sent to the model.
    pub fn content(&self) -> &str {
        &self.target.text
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

#[derive(Debug, Default)]
pub struct Session {
    gateway: InferenceGateway,
    state: SuggestionState,
    latest: u64,
}

impl Session {
    pub fn new(gateway: InferenceGateway) -> Self {
        Self {
            gateway,
            state: SuggestionState::new(),
            latest: 0,
        }
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn gateway_mut(&mut self) -> &mut InferenceGateway {
        &mut self.gateway
    }

    /// Run a command end to end.
    pub async fn run(&mut self, host: &mut dyn EditorHost, settings: &Settings, command: Command) -> Outcome {
        info!(%command, "running command");
        match command {
            Command::Accept => {
                return if self.accept(host) {
                    Outcome::Accepted
                } else {
                    Outcome::Idle
                };
            }
            Command::Clear => {
                self.clear(host);
                return Outcome::Cleared;
            }
            _ => {}
        }

        let Some(ticket) = self.begin(host, settings, command) else {
            return Outcome::Rejected;
        };
        let result = self
            .gateway
            .generate(settings, ticket.content(), ticket.system_prompt())
            .await;
        self.finish(host, ticket, result)
    }

    /// Start a text command: drop any pending suggestion, pick the target and
    /// issue a fresh token. `None` when there is nothing to send.
    pub fn begin(&mut self, host: &mut dyn EditorHost, settings: &Settings, command: Command) -> Option<Ticket> {
        let system_prompt = system_prompt(command, settings)?;
        self.sync(host);
        self.state.invalidate(host);
        self.latest += 1;

        let target = if command.is_completion() {
            target::resolve_before_caret(host)?
        } else {
            target::resolve(host)?
        };

        Some(Ticket {
            token: self.latest,
            command,
            target,
            system_prompt,
        })
    }

    /// Apply the model's answer for `ticket`.
    pub fn finish(
        &mut self,
        host: &mut dyn EditorHost,
        ticket: Ticket,
        result: Result<String, LlmError>,
    ) -> Outcome {
        if ticket.token != self.latest {
            debug!(token = ticket.token, latest = self.latest, "discarding superseded response");
            return Outcome::Stale;
        }
        self.sync(host);
        if host.document().text_in(ticket.target.range) != ticket.target.text {
            info!("document changed while waiting for the model; discarding response");
            return Outcome::Stale;
        }
        if !still_in_place(host, &ticket) {
            info!("selection moved while waiting for the model; discarding response");
            return Outcome::Stale;
        }

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "inference failed");
                host.notify(Notice::error(e.to_string()));
                return Outcome::Failed;
            }
        };

        let command = ticket.command;
        let proposed = if command.is_completion() {
            let at = ticket.target.range.end;
            let text = completion_text(host.document(), at, &text);
            self.state.propose_completion(host, at, text)
        } else {
            let replacement = host
                .document()
                .normalize_eol(&keep_padding(&ticket.target.text, &text));
            self.state.propose_correction(host, ticket.target, replacement)
        };

        if proposed {
            Outcome::Proposed(self.state.phase())
        } else {
            host.notify(Notice::info(command.unchanged_message()));
            Outcome::Unchanged
        }
    }

    /// Commit the pending suggestion.
    pub fn accept(&mut self, host: &mut dyn EditorHost) -> bool {
        self.sync(host);
        self.state.accept(host)
    }

    /// Discard the pending suggestion and its decorations.
    pub fn clear(&mut self, host: &mut dyn EditorHost) {
        self.sync(host);
        self.state.invalidate(host);
    }

    /// Drain and deliver all pending host events.
    pub fn sync(&mut self, host: &mut dyn EditorHost) -> bool {
        let mut invalidated = false;
        while let Some(event) = host.poll_event() {
            invalidated |= self.state.handle(host, event);
        }
        invalidated
    }

    /// The credential changed: the next call builds a new client.
    pub fn reset_client(&mut self) {
        self.gateway.invalidate();
    }

    /// Tear down: discard the pending suggestion and drop the client.
    pub fn shutdown(mut self, host: &mut dyn EditorHost) {
        self.clear(host);
        self.gateway.invalidate();
    }
}

/// The selection is still where the command was issued: inside the target
/// for corrections, at the same caret for completions.
fn still_in_place(host: &dyn EditorHost, ticket: &Ticket) -> bool {
    let selection = host.selection();
    let range = ticket.target.range;
    if ticket.command.is_completion() {
        selection.is_empty() && selection.active == range.end
    } else {
        range.contains(selection.anchor) && range.contains(selection.active)
    }
}

/// Wrap the trimmed answer in the original's leading and trailing whitespace.
fn keep_padding(original: &str, answer: &str) -> String {
    let lead = &original[..original.len() - original.trim_start().len()];
    let trail = &original[original.trim_end().len()..];
    format!("{lead}{}{trail}", answer.trim())
}

/// Prefix a space when the caret sits right after a word and the
/// continuation doesn't bring its own whitespace.
fn completion_text(document: &Document, at: Position, text: &str) -> String {
    if text.is_empty() || text.starts_with(char::is_whitespace) || at.column == 0 {
        return text.to_string();
    }
    let before = document.line(at.line).chars().nth(at.column - 1);
    match before {
        Some(c) if !c.is_whitespace() => format!(" {text}"),
        _ => text.to_string(),
    }
}
