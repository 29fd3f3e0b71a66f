use gpui::*;
use gpui_component::Root;
use tracing_subscriber::EnvFilter;

use juris_ui::app::{ChatAppShell, Quit, ResetChat, ToggleSidebar};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);

        // Required before any Root is created.
        gpui_component::init(cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-r", ResetChat, None),
            KeyBinding::new("cmd-b", ToggleSidebar, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(960.), px(720.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        appears_transparent: true,
                        traffic_light_position: Some(point(px(9.), px(9.))),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                if let Err(error) = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatAppShell::new(window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                }) {
                    tracing::error!(error = %error, "failed to open main window");
                    cx.quit();
                    return;
                }

                cx.activate(true);
            })
        })
        .detach();
    });
}
