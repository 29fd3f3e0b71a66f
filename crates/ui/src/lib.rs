#![deny(unsafe_code)]

/// Window shell: toolbar, sidebar and key-bound actions.
pub mod app;
/// Chat view wired to the headless controller.
pub mod chat;
