use tokio::sync::mpsc;

use crate::message::{Message, MessageBody, MessageId};

/// Region that renders the transcript.
pub trait TranscriptSurface: Send + Sync {
    fn append_message(&self, message: &Message);
    fn update_message(&self, id: MessageId, body: &MessageBody);
    fn scroll_to_end(&self);
    fn clear_transcript(&self);
}

/// Field the question is typed into.
pub trait QuestionInput: Send + Sync {
    fn clear_question(&self);
}

/// Submit button; disabled and relabelled while a turn is in flight.
pub trait SubmitControl: Send + Sync {
    fn set_busy(&self, busy: bool, label: &str);
}

/// Collapsible side panel.
pub trait SidebarSurface: Send + Sync {
    fn set_sidebar_hidden(&self, hidden: bool);
}

/// Everything the controller draws on.
///
/// Surface calls are made while the controller holds its state lock, so an
/// implementation must not call back into the controller.
pub trait ChatSurface: TranscriptSurface + QuestionInput + SubmitControl + SidebarSurface {}

impl<T> ChatSurface for T where T: TranscriptSurface + QuestionInput + SubmitControl + SidebarSurface {}

/// One surface call, as forwarded by [`ChannelSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceUpdate {
    AppendMessage(Message),
    UpdateMessage { id: MessageId, body: MessageBody },
    ScrollToEnd,
    ClearTranscript,
    ClearQuestion,
    Busy { busy: bool, label: String },
    SidebarHidden(bool),
}

/// Surface that forwards every call over a channel, letting a UI thread
/// apply the updates in order on its own schedule.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    updates: mpsc::UnboundedSender<SurfaceUpdate>,
}

impl ChannelSurface {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        (Self { updates }, receiver)
    }

    fn send(&self, update: SurfaceUpdate) {
        if self.updates.send(update).is_err() {
            tracing::trace!("surface receiver dropped; update discarded");
        }
    }
}

impl TranscriptSurface for ChannelSurface {
    fn append_message(&self, message: &Message) {
        self.send(SurfaceUpdate::AppendMessage(message.clone()));
    }

    fn update_message(&self, id: MessageId, body: &MessageBody) {
        self.send(SurfaceUpdate::UpdateMessage {
            id,
            body: body.clone(),
        });
    }

    fn scroll_to_end(&self) {
        self.send(SurfaceUpdate::ScrollToEnd);
    }

    fn clear_transcript(&self) {
        self.send(SurfaceUpdate::ClearTranscript);
    }
}

impl QuestionInput for ChannelSurface {
    fn clear_question(&self) {
        self.send(SurfaceUpdate::ClearQuestion);
    }
}

impl SubmitControl for ChannelSurface {
    fn set_busy(&self, busy: bool, label: &str) {
        self.send(SurfaceUpdate::Busy {
            busy,
            label: label.to_string(),
        });
    }
}

impl SidebarSurface for ChannelSurface {
    fn set_sidebar_hidden(&self, hidden: bool) {
        self.send(SurfaceUpdate::SidebarHidden(hidden));
    }
}
