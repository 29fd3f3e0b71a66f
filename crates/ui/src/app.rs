use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use crate::chat::{ChatView, SidebarVisibilityChanged};

/// Sidebar width when shown.
pub const SIDEBAR_WIDTH: f32 = 260.0;
#[cfg(target_os = "macos")]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 78.0;
#[cfg(not(target_os = "macos"))]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 16.0;

const APP_TITLE: &str = "Juris";

gpui::actions!(shell, [ResetChat, ToggleSidebar, Quit]);

/// Toolbar height scaled with the user's rem size.
fn window_toolbar_height(window: &Window) -> Pixels {
    (1.75 * window.rem_size()).max(px(34.0))
}

/// Width the sidebar occupies for a given visibility.
pub fn sidebar_width(hidden: bool) -> f32 {
    if hidden { 0.0 } else { SIDEBAR_WIDTH }
}

/// Window root: sidebar, chat view and the toolbar around them.
///
/// Sidebar visibility is owned by the chat controller; the shell only
/// mirrors the value the controller reports.
pub struct ChatAppShell {
    chat_view: Entity<ChatView>,
    sidebar_hidden: bool,
    title_bar_should_move: bool,
}

impl ChatAppShell {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(window, cx));
        let sidebar_hidden = chat_view.read(cx).sidebar_hidden();

        cx.subscribe(&chat_view, |this, _, event: &SidebarVisibilityChanged, cx| {
            this.sidebar_hidden = event.hidden;
            cx.notify();
        })
        .detach();

        Self {
            chat_view,
            sidebar_hidden,
            title_bar_should_move: false,
        }
    }

    fn toggle_sidebar(&mut self, cx: &mut Context<Self>) {
        self.chat_view
            .update(cx, |chat_view, cx| chat_view.toggle_sidebar(cx));
    }

    fn reset_chat(&mut self, cx: &mut Context<Self>) {
        self.chat_view
            .update(cx, |chat_view, cx| chat_view.reset(cx));
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let toolbar_height = window_toolbar_height(window);

        div()
            .id("app-shell")
            .key_context("ChatAppShell")
            .on_action(cx.listener(|this, _: &ToggleSidebar, _window, cx| {
                this.toggle_sidebar(cx);
            }))
            .on_action(cx.listener(|this, _: &ResetChat, _window, cx| {
                this.reset_chat(cx);
            }))
            .size_full()
            .relative()
            .bg(theme.background)
            .child(
                h_flex()
                    .id("app-shell-body")
                    .size_full()
                    .min_h_0()
                    .pt(toolbar_height)
                    .overflow_hidden()
                    .when(!self.sidebar_hidden, |body| {
                        body.child(self.render_sidebar(cx))
                    })
                    .child(
                        v_flex()
                            .id("main-content")
                            .flex_1()
                            .h_full()
                            .min_w_0()
                            .min_h_0()
                            .overflow_hidden()
                            .child(self.chat_view.clone()),
                    ),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .child(self.render_top_bar(toolbar_height, cx)),
            )
    }
}

impl ChatAppShell {
    fn render_top_bar(&self, toolbar_height: Pixels, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let sidebar_toggle_icon = if self.sidebar_hidden {
            IconName::PanelLeftOpen
        } else {
            IconName::PanelLeftClose
        };

        h_flex()
            .id("app-top-bar")
            .window_control_area(WindowControlArea::Drag)
            .on_mouse_down_out(cx.listener(|this, _, _window, _cx| {
                this.title_bar_should_move = false;
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = false;
                }),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = true;
                }),
            )
            .on_mouse_move(cx.listener(|this, _, window, _cx| {
                if this.title_bar_should_move {
                    this.title_bar_should_move = false;
                    window.start_window_move();
                }
            }))
            .w_full()
            .h(toolbar_height)
            .flex_shrink_0()
            .pl(px(WINDOW_TOOLBAR_LEFT_SAFE_PADDING))
            .pr_4()
            .gap_2()
            .items_center()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(
                Button::new("sidebar-toggle")
                    .ghost()
                    .small()
                    .icon(sidebar_toggle_icon)
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.toggle_sidebar(cx);
                    })),
            )
            .child(Label::new(APP_TITLE).text_sm())
    }

    fn render_sidebar(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("sidebar-container")
            .h_full()
            .flex_shrink_0()
            .w(px(sidebar_width(self.sidebar_hidden)))
            .gap_3()
            .p_3()
            .overflow_hidden()
            .bg(theme.background)
            .border_r_1()
            .border_color(theme.border)
            .child(
                Label::new("Assistant juridique")
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
            .child(
                Button::new("reset-chat")
                    .ghost()
                    .small()
                    .icon(IconName::Plus)
                    .child("Nouvelle conversation")
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.reset_chat(cx);
                    })),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_sidebar_takes_no_width() {
        assert_eq!(sidebar_width(true), 0.0);
        assert_eq!(sidebar_width(false), SIDEBAR_WIDTH);
    }
}
