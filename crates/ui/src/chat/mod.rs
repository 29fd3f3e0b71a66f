pub mod message_input;
pub mod message_list;
pub mod view;

pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use view::ChatView;

/// Emitted when the user submits the question field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub question: String,
}

/// Emitted when the user asks to stop the answer being streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop;

/// Emitted when the controller shows or hides the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarVisibilityChanged {
    pub hidden: bool,
}
