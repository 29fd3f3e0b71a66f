use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use juris_stream::{AnswerEvent, AnswerEventStream, AnswerRequest, ChatTransport, StreamCanceller};

use crate::format::format_text;
use crate::message::{Message, MessageBody, MessageId, Role, Transcript};
use crate::settings::ChatSettings;
use crate::surface::ChatSurface;
use crate::turn::{TurnId, TurnPhase, TurnTransition};

/// How one `submit` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank question; nothing happened.
    Ignored,
    /// Another turn was in flight; nothing happened.
    Rejected,
    /// Sentinel seen or body ended; the answer is rendered.
    Completed,
    /// Stopped through [`ChatController::cancel`]; partial text stays.
    Cancelled,
    /// The response had no readable body.
    NoBody,
    /// The request or a chunk read failed.
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct ActiveTurn {
    id: TurnId,
    placeholder: MessageId,
}

struct ControllerState {
    phase: TurnPhase,
    transcript: Transcript,
    sidebar_hidden: bool,
    next_turn_id: u64,
    canceller: Option<StreamCanceller>,
}

/// Drives one question/answer turn at a time and keeps the transcript,
/// submit control and sidebar surfaces in sync with it.
///
/// Every operation takes `&self`, so the controller can sit behind an `Arc`
/// shared by the UI and the task running the current turn.
pub struct ChatController {
    transport: Arc<dyn ChatTransport>,
    surface: Arc<dyn ChatSurface>,
    settings: ChatSettings,
    state: Mutex<ControllerState>,
}

impl ChatController {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        surface: Arc<dyn ChatSurface>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            transport,
            surface,
            settings,
            state: Mutex::new(ControllerState {
                phase: TurnPhase::Idle,
                transcript: Transcript::new(),
                sidebar_hidden: false,
                next_turn_id: 1,
                canceller: None,
            }),
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn phase(&self) -> TurnPhase {
        self.lock_state().phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.lock_state().transcript.messages().to_vec()
    }

    pub fn sidebar_hidden(&self) -> bool {
        self.lock_state().sidebar_hidden
    }

    /// Sends `question` and streams the answer into a new bot entry.
    ///
    /// The busy state is cleared exactly once per admitted turn, including
    /// when the returned future is dropped before completion.
    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        let question = question.trim();
        if question.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let Some(turn) = self.begin_turn(question) else {
            return SubmitOutcome::Rejected;
        };

        let guard = TurnGuard {
            controller: self,
            turn,
        };
        let outcome = self.run_turn(turn, question).await;
        drop(guard);

        tracing::info!(turn = turn.id.0, ?outcome, "turn finished");
        outcome
    }

    /// Empties the transcript. An in-flight turn keeps running, but its
    /// placeholder is gone so nothing more is drawn for it.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.transcript.clear();
        self.surface.clear_transcript();
        tracing::debug!(busy = state.phase.is_busy(), "transcript reset");
    }

    /// Flips sidebar visibility and returns the new `hidden` value.
    pub fn toggle_sidebar(&self) -> bool {
        let mut state = self.lock_state();
        state.sidebar_hidden = !state.sidebar_hidden;
        self.surface.set_sidebar_hidden(state.sidebar_hidden);
        state.sidebar_hidden
    }

    /// Asks the in-flight turn to stop reading. Returns false when there is
    /// nothing to stop.
    pub fn cancel(&self) -> bool {
        let canceller = self.lock_state().canceller.take();
        match canceller {
            Some(canceller) => canceller.cancel(),
            None => false,
        }
    }

    fn begin_turn(&self, question: &str) -> Option<ActiveTurn> {
        let mut state = self.lock_state();
        let id = TurnId::new(state.next_turn_id);

        match state.phase.apply(TurnTransition::Start(id)) {
            Ok(phase) => state.phase = phase,
            Err(rejection) => {
                tracing::warn!(?rejection, "submit rejected while another turn is in flight");
                return None;
            }
        }
        state.next_turn_id = state.next_turn_id.saturating_add(1);

        let user_message = state
            .transcript
            .push(Role::User, MessageBody::Text(question.to_string()));
        self.surface.append_message(&user_message);
        self.surface.clear_question();
        self.surface.set_busy(true, &self.settings.busy_label);

        let placeholder = state.transcript.push(Role::Bot, MessageBody::Typing);
        self.surface.append_message(&placeholder);
        self.surface.scroll_to_end();

        tracing::debug!(turn = id.0, "turn started");
        Some(ActiveTurn {
            id,
            placeholder: placeholder.id,
        })
    }

    async fn run_turn(&self, turn: ActiveTurn, question: &str) -> SubmitOutcome {
        let handle = match self.transport.open_stream(AnswerRequest::new(question)) {
            Ok(handle) => handle,
            Err(error) => {
                tracing::error!(
                    turn = turn.id.0,
                    transport = self.transport.name(),
                    error = %error,
                    "failed to open answer stream"
                );
                self.show_error(turn, &self.settings.connection_error_message);
                return SubmitOutcome::Failed;
            }
        };

        let mut stream = handle.stream;
        self.lock_state().canceller = stream.take_canceller();

        // The worker and the reader share this task; chunks are handled one at a time.
        let (_, outcome) =
            futures::future::join(handle.worker, self.read_answer(turn, &mut stream)).await;
        outcome
    }

    async fn read_answer(&self, turn: ActiveTurn, stream: &mut AnswerEventStream) -> SubmitOutcome {
        let mut accumulator = String::new();

        while let Some(event) = stream.recv().await {
            match event {
                // First chunk arrived: the typing indicator goes even if no text decoded yet.
                AnswerEvent::Started => self.render_answer(turn, &accumulator),
                AnswerEvent::Delta(text) => {
                    accumulator.push_str(&text);
                    self.render_answer(turn, &accumulator);
                }
                AnswerEvent::Done => return SubmitOutcome::Completed,
                AnswerEvent::NoBody => {
                    self.show_error(turn, &self.settings.no_body_message);
                    return SubmitOutcome::NoBody;
                }
                AnswerEvent::Error(message) => {
                    tracing::warn!(turn = turn.id.0, error = %message, "answer stream failed");
                    self.show_error(turn, &self.settings.connection_error_message);
                    return SubmitOutcome::Failed;
                }
            }
        }

        // Channel closed without a terminal event: the worker was cancelled.
        self.render_answer(turn, &accumulator);
        SubmitOutcome::Cancelled
    }

    fn render_answer(&self, turn: ActiveTurn, accumulator: &str) {
        let mut state = self.lock_state();

        if state.phase == TurnPhase::AwaitingFirstChunk(turn.id) {
            match state.phase.apply(TurnTransition::FirstChunk(turn.id)) {
                Ok(phase) => state.phase = phase,
                Err(rejection) => {
                    tracing::warn!(turn = turn.id.0, ?rejection, "unexpected first-chunk transition");
                }
            }
        }

        let body = MessageBody::Text(format_text(accumulator));
        self.replace_placeholder(&mut state, turn, body);
    }

    fn show_error(&self, turn: ActiveTurn, message: &str) {
        let mut state = self.lock_state();
        self.replace_placeholder(&mut state, turn, MessageBody::Error(message.to_string()));
    }

    fn replace_placeholder(&self, state: &mut ControllerState, turn: ActiveTurn, body: MessageBody) {
        if !state.transcript.update(turn.placeholder, body.clone()) {
            tracing::debug!(turn = turn.id.0, "placeholder no longer in transcript; update dropped");
            return;
        }

        self.surface.update_message(turn.placeholder, &body);
        self.surface.scroll_to_end();
    }

    fn end_turn(&self, turn: ActiveTurn) {
        let mut state = self.lock_state();
        state.canceller = None;

        // Empty body or dropped future: never leave the typing indicator behind.
        let still_typing = state
            .transcript
            .get(turn.placeholder)
            .is_some_and(|message| message.body.is_typing());
        if still_typing {
            self.replace_placeholder(&mut state, turn, MessageBody::Text(String::new()));
        }

        state.phase = match state.phase.apply(TurnTransition::Finish(turn.id)) {
            Ok(phase) => phase,
            Err(rejection) => {
                tracing::error!(turn = turn.id.0, ?rejection, "turn finished out of order");
                TurnPhase::Idle
            }
        };

        self.surface.set_busy(false, &self.settings.submit_label);
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs the turn cleanup when dropped, whether the turn finished or its
/// future was dropped mid-flight.
struct TurnGuard<'a> {
    controller: &'a ChatController,
    turn: ActiveTurn,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.controller.end_turn(self.turn);
    }
}
