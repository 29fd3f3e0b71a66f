use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, text::TextView, v_flex};
use juris_chat::{Message, MessageBody, MessageId, Role};

const USER_BUBBLE_MAX_WIDTH: Pixels = px(540.);
const USER_BUBBLE_PADDING_X: Pixels = px(14.);
const USER_BUBBLE_PADDING_Y: Pixels = px(10.);
const TYPING_DOT_SIZE: Pixels = px(6.);
const TYPING_DOTS: usize = 3;

/// Scrollable transcript mirror fed by controller surface updates.
pub struct MessageList {
    messages: Vec<Message>,
    scroll_handle: ScrollHandle,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            scroll_handle: ScrollHandle::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append(&mut self, message: Message, cx: &mut Context<Self>) {
        self.messages.push(message);
        cx.notify();
    }

    pub fn update(&mut self, id: MessageId, body: MessageBody, cx: &mut Context<Self>) {
        if let Some(message) = self.messages.iter_mut().find(|message| message.id == id) {
            message.body = body;
            cx.notify();
        }
    }

    pub fn clear(&mut self, cx: &mut Context<Self>) {
        self.messages.clear();
        cx.notify();
    }

    pub fn scroll_to_end(&mut self, cx: &mut Context<Self>) {
        self.scroll_handle.scroll_to_bottom();
        cx.notify();
    }

    fn render_message_row(&self, message: &Message, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        match message.role {
            Role::User => {
                let content = message.body.text().unwrap_or_default().to_string();
                v_flex()
                    .w_full()
                    .items_end()
                    .child(
                        div()
                            .max_w(USER_BUBBLE_MAX_WIDTH)
                            .px(USER_BUBBLE_PADDING_X)
                            .py(USER_BUBBLE_PADDING_Y)
                            .rounded_lg()
                            .bg(theme.accent)
                            .text_color(theme.accent_foreground)
                            .child(Label::new(content).text_sm()),
                    )
                    .into_any_element()
            }
            Role::Bot => {
                let content = match &message.body {
                    MessageBody::Typing => self.render_typing_indicator(cx),
                    // Answers carry markup (`<br>` line breaks, document links).
                    MessageBody::Text(html) => {
                        let html_id = ElementId::Name(SharedString::from(format!(
                            "bot-answer-{}",
                            message.id.0
                        )));
                        TextView::html(html_id, html.clone())
                            .selectable(true)
                            .into_any_element()
                    }
                    MessageBody::Error(error) => Label::new(error.clone())
                        .text_sm()
                        .text_color(theme.danger)
                        .into_any_element(),
                };

                v_flex()
                    .w_full()
                    .gap_2()
                    .child(
                        Label::new("Juris")
                            .text_xs()
                            .text_color(theme.foreground.opacity(0.5)),
                    )
                    .child(content)
                    .into_any_element()
            }
        }
    }

    fn render_typing_indicator(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .id("typing-indicator")
            .gap_1()
            .items_center()
            .children((0..TYPING_DOTS).map(|_| {
                div()
                    .size(TYPING_DOT_SIZE)
                    .rounded_full()
                    .bg(theme.foreground.opacity(0.45))
            }))
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let rows = self
            .messages
            .iter()
            .map(|message| self.render_message_row(message, cx))
            .collect::<Vec<_>>();

        v_flex().size_full().min_h_0().child(
            v_flex()
                .id("message-list")
                .size_full()
                .px_4()
                .py_3()
                .gap_4()
                .overflow_y_scroll()
                .track_scroll(&self.scroll_handle)
                .children(rows),
        )
    }
}
