use std::sync::Arc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, label::Label, v_flex};
use gpui_tokio_bridge::Tokio;
use juris_chat::{ChannelSurface, ChatController, SettingsStore, SubmitOutcome, SurfaceUpdate};

use crate::chat::{MessageInput, MessageList, SidebarVisibilityChanged, Stop, Submit};

/// Hosts the chat controller and mirrors its surface updates into the
/// message list and the input.
pub struct ChatView {
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    controller: Option<Arc<ChatController>>,
    startup_error: Option<SharedString>,
    submit_task: Option<Task<()>>,
    _surface_task: Option<Task<()>>,
}

impl EventEmitter<SidebarVisibilityChanged> for ChatView {}

impl ChatView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe(&message_input, |this, _, event: &Submit, cx| {
            this.handle_submit(event, cx);
        })
        .detach();

        cx.subscribe(&message_input, |this, _, _event: &Stop, _cx| {
            this.handle_stop();
        })
        .detach();

        let store = SettingsStore::load();
        let settings = store.settings().clone();
        tracing::info!(
            path = ?store.config_path(),
            endpoint = %settings.transport_config().endpoint(),
            "chat settings loaded"
        );

        let transport = match juris_stream::create_transport(settings.transport_config()) {
            Ok(transport) => transport,
            Err(error) => {
                tracing::error!(error = %error, "failed to create chat transport");
                return Self {
                    message_list,
                    message_input,
                    controller: None,
                    startup_error: Some(error.to_string().into()),
                    submit_task: None,
                    _surface_task: None,
                };
            }
        };

        let (surface, mut updates) = ChannelSurface::new();
        let controller = Arc::new(ChatController::new(
            transport,
            Arc::new(surface),
            settings,
        ));

        let surface_task = cx.spawn_in(window, async move |this, cx| {
            while let Some(update) = updates.recv().await {
                let applied = this.update_in(cx, |this, window, cx| {
                    this.apply_surface_update(update, window, cx);
                });
                if applied.is_err() {
                    break;
                }
            }
        });

        Self {
            message_list,
            message_input,
            controller: Some(controller),
            startup_error: None,
            submit_task: None,
            _surface_task: Some(surface_task),
        }
    }

    pub fn reset(&mut self, _cx: &mut Context<Self>) {
        if let Some(controller) = &self.controller {
            controller.reset();
        }
    }

    pub fn toggle_sidebar(&mut self, _cx: &mut Context<Self>) {
        if let Some(controller) = &self.controller {
            controller.toggle_sidebar();
        }
    }

    pub fn sidebar_hidden(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|controller| controller.sidebar_hidden())
    }

    fn handle_submit(&mut self, event: &Submit, cx: &mut Context<Self>) {
        let Some(controller) = self.controller.clone() else {
            return;
        };

        // Busy reaches the input asynchronously, so a second Enter can still land here.
        if self.submit_task.is_some() || controller.is_busy() {
            tracing::debug!("submit ignored while a turn is in flight");
            return;
        }

        let question = event.question.clone();
        let turn = Tokio::spawn(cx, async move { controller.submit(&question).await });
        self.submit_task = Some(cx.spawn(async move |this, cx| {
            match turn.await {
                Ok(outcome) => log_outcome(outcome),
                Err(error) => tracing::error!(?error, "submit task did not complete"),
            }

            let _ = this.update(cx, |this, _cx| {
                this.submit_task = None;
            });
        }));
    }

    fn handle_stop(&mut self) {
        let cancelled = self
            .controller
            .as_ref()
            .is_some_and(|controller| controller.cancel());
        if !cancelled {
            tracing::debug!("stop requested with no answer streaming");
        }
    }

    fn apply_surface_update(
        &mut self,
        update: SurfaceUpdate,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match update {
            SurfaceUpdate::AppendMessage(message) => {
                self.message_list
                    .update(cx, |list, cx| list.append(message, cx));
            }
            SurfaceUpdate::UpdateMessage { id, body } => {
                self.message_list
                    .update(cx, |list, cx| list.update(id, body, cx));
            }
            SurfaceUpdate::ScrollToEnd => {
                self.message_list.update(cx, |list, cx| list.scroll_to_end(cx));
            }
            SurfaceUpdate::ClearTranscript => {
                self.message_list.update(cx, |list, cx| list.clear(cx));
            }
            SurfaceUpdate::ClearQuestion => {
                self.message_input
                    .update(cx, |input, cx| input.clear(window, cx));
            }
            SurfaceUpdate::Busy { busy, label } => {
                self.message_input
                    .update(cx, |input, cx| input.set_busy(busy, &label, cx));
            }
            SurfaceUpdate::SidebarHidden(hidden) => {
                cx.emit(SidebarVisibilityChanged { hidden });
            }
        }
    }
}

fn log_outcome(outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Ignored | SubmitOutcome::Rejected => {
            tracing::debug!(?outcome, "question not sent");
        }
        SubmitOutcome::Completed | SubmitOutcome::Cancelled => {
            tracing::debug!(?outcome, "answer rendered");
        }
        SubmitOutcome::NoBody | SubmitOutcome::Failed => {
            tracing::warn!(?outcome, "answer could not be read");
        }
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .when_some(self.startup_error.clone(), |view, error| {
                view.child(
                    div()
                        .id("chat-view-startup-error")
                        .w_full()
                        .px_4()
                        .py_2()
                        .border_b_1()
                        .border_color(theme.border)
                        .child(Label::new(error).text_sm().text_color(theme.danger)),
                )
            })
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
