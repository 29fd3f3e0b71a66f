//! Headless chat controller: owns the transcript and the turn lifecycle and
//! draws on whatever surfaces the host injects.

mod controller;
mod format;
mod message;
mod settings;
mod surface;
mod turn;

pub use controller::{ChatController, SubmitOutcome};
pub use format::{LINE_BREAK, format_text};
pub use message::{Message, MessageBody, MessageId, Role, Transcript};
pub use settings::{
    ChatSettings, DEFAULT_BUSY_LABEL, DEFAULT_CONNECTION_ERROR_MESSAGE, DEFAULT_NO_BODY_MESSAGE,
    DEFAULT_SUBMIT_LABEL, ENV_PREFIX, SettingsError, SettingsResult, SettingsStore,
};
pub use surface::{
    ChannelSurface, ChatSurface, QuestionInput, SidebarSurface, SubmitControl, SurfaceUpdate,
    TranscriptSurface,
};
pub use turn::{TurnId, TurnPhase, TurnRejection, TurnTransition, TurnTransitionResult};
