use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    input::{Input, InputEvent, InputState},
    v_flex,
};
use juris_chat::DEFAULT_SUBMIT_LABEL;

use crate::chat::{Stop, Submit};

/// Question field plus the submit button.
///
/// While a turn is in flight the field is read-only, the button shows the
/// busy label and a stop button is offered.
pub struct MessageInput {
    input_state: Entity<InputState>,
    busy: bool,
    submit_label: SharedString,
    pending_newline: bool,
}

impl EventEmitter<Submit> for MessageInput {}
impl EventEmitter<Stop> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Posez votre question...")
                .auto_grow(1, 8)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { secondary } = event {
                    if *secondary {
                        this.pending_newline = false;
                        return;
                    }

                    if this.pending_newline {
                        // Shift+Enter already inserted the newline; swallow the enter it reports.
                        this.pending_newline = false;
                    } else {
                        this.trim_trailing_newline(window, cx);
                        this.handle_submit(cx);
                    }
                }
            },
        )
        .detach();

        Self {
            input_state,
            busy: false,
            submit_label: DEFAULT_SUBMIT_LABEL.into(),
            pending_newline: false,
        }
    }

    pub fn set_busy(&mut self, busy: bool, label: &str, cx: &mut Context<Self>) {
        self.busy = busy;
        self.submit_label = SharedString::from(label.to_string());
        if !busy {
            self.pending_newline = false;
        }
        cx.notify();
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.pending_newline = false;
    }

    fn handle_shift_enter(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.busy {
            return;
        }

        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
        cx.notify();
    }

    fn trim_trailing_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(trimmed) = value.strip_suffix('\n') {
                state.set_value(trimmed.to_string(), window, cx);
            }
        });
    }

    // The controller trims, ignores blank input and clears the field itself.
    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        if self.busy {
            return;
        }

        let question = self.input_state.read(cx).value().to_string();
        cx.emit(Submit { question });
    }

    fn handle_stop(&mut self, cx: &mut Context<Self>) {
        if self.busy {
            cx.emit(Stop);
        }
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let busy = self.busy;

        let submit = Button::new("submit")
            .small()
            .primary()
            .icon(IconName::ArrowUp)
            .child(self.submit_label.clone())
            .disabled(busy)
            .on_click(cx.listener(|this, _, _window, cx| {
                this.handle_submit(cx);
            }));

        let actions = div()
            .w_full()
            .flex()
            .justify_end()
            .gap_2()
            .when(busy, |row| {
                row.child(
                    Button::new("stop")
                        .small()
                        .danger()
                        .icon(IconName::CircleX)
                        .child("Stop")
                        .on_click(cx.listener(|this, _, _window, cx| {
                            this.handle_stop(cx);
                        })),
                )
            })
            .child(submit);

        v_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .child(
                div()
                    .w_full()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                        if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                            this.handle_shift_enter(window, cx);
                        }
                    }))
                    .child(Input::new(&self.input_state).w_full().disabled(busy)),
            )
            .child(actions)
    }
}
