use std::path::PathBuf;
use std::sync::Arc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::notification::NotificationList;
use gpui_component::{
    ActiveTheme, IconName, Root, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};

use crate::chart::ChartPanel;
use crate::chat::events::{
    CityFocusRequested, OpenViewRequested, PanelClosed, QueryCompleted, ViewSwitchRequested,
    WeatherQueryResult,
};
use crate::chat::view::ChatPanel;
use crate::map::MapPanel;
use crate::settings::state::{SettingsChanged, SettingsState};
use crate::settings::view::SettingsView;

/// Returns the default themes directory path.
/// This is a pure function to allow deterministic testing of path resolution.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

/// Default share of the window given to the secondary view.
pub const SPLIT_DEFAULT_PERCENT: f32 = 66.0;
/// Minimum allowed secondary-view share.
pub const SPLIT_MIN_PERCENT: f32 = 20.0;
/// Maximum allowed secondary-view share.
pub const SPLIT_MAX_PERCENT: f32 = 80.0;
/// Below this viewport width the splitter is inert and panes stack vertically.
pub const STACK_BREAKPOINT: f32 = 768.0;

#[cfg(target_os = "macos")]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 78.0;
#[cfg(not(target_os = "macos"))]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 16.0;
#[cfg(target_os = "windows")]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 120.0;
#[cfg(not(target_os = "windows"))]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 16.0;

/// Compile-time validation of split layout constraints.
const _: () = {
    assert!(SPLIT_MIN_PERCENT > 0.0);
    assert!(SPLIT_MIN_PERCENT < SPLIT_DEFAULT_PERCENT);
    assert!(SPLIT_DEFAULT_PERCENT < SPLIT_MAX_PERCENT);
    assert!(SPLIT_MAX_PERCENT < 100.0);
    assert!(STACK_BREAKPOINT > 0.0);
};

/// Computes the top toolbar height using a Zed-style responsive formula.
fn window_toolbar_height(window: &Window) -> Pixels {
    (1.75 * window.rem_size()).max(px(34.0))
}

/// Maps a drag x-position to the secondary pane's share of the container,
/// clamped to [SPLIT_MIN_PERCENT, SPLIT_MAX_PERCENT].
pub fn compute_split_percent(pointer_x: f32, container_width: f32) -> f32 {
    if container_width <= 0.0 {
        return SPLIT_DEFAULT_PERCENT;
    }

    (pointer_x / container_width * 100.0).clamp(SPLIT_MIN_PERCENT, SPLIT_MAX_PERCENT)
}

/// True when the viewport is too narrow for side-by-side panes.
pub fn is_stacked(viewport_width: f32) -> bool {
    viewport_width < STACK_BREAKPOINT
}

gpui::actions!(shell, [NewSession, Quit,]);

/// Which secondary view sits beside the chat panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Map,
    Chart,
}

/// Marker type for splitter drag operations.
#[derive(Clone)]
struct SplitterDrag;

/// Empty drag visual used during splitter drags.
/// The drag preview itself is invisible; only the cursor changes.
struct EmptyDragView;

impl Render for EmptyDragView {
    fn render(&mut self, _: &mut Window, _: &mut Context<Self>) -> impl IntoElement {
        div()
    }
}

/// Main application shell and view coordinator.
///
/// Holds which secondary view is open and how the window is split, forwards
/// each completed query to the active view, and routes chart city clicks back
/// to the map.
pub struct WeatherAppShell {
    notification_list: Entity<NotificationList>,
    chat_panel: Entity<ChatPanel>,
    map_panel: Entity<MapPanel>,
    chart_panel: Entity<ChartPanel>,
    settings_state: Entity<SettingsState>,
    settings_window: Option<WindowHandle<Root>>,
    active_view: Option<ViewKind>,
    split_percent: f32,
    latest_result: Option<Arc<WeatherQueryResult>>,
    title_bar_should_move: bool,
}

impl WeatherAppShell {
    pub fn new(
        notification_list: Entity<NotificationList>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let settings_state = SettingsState::new(cx);
        let chat_panel = cx.new(|cx| ChatPanel::new(&settings_state, window, cx));
        let map_panel = cx.new(MapPanel::new);
        let chart_panel = cx.new(ChartPanel::new);

        cx.subscribe(&chat_panel, |this, _, event: &QueryCompleted, cx| {
            this.handle_query_completed(event, cx);
        })
        .detach();

        cx.subscribe(&chat_panel, |this, _, event: &OpenViewRequested, cx| {
            this.open_view(event.kind, cx);
        })
        .detach();

        cx.subscribe(&map_panel, |this, _, _event: &PanelClosed, cx| {
            this.close_view(cx);
        })
        .detach();

        cx.subscribe(&chart_panel, |this, _, _event: &PanelClosed, cx| {
            this.close_view(cx);
        })
        .detach();

        cx.subscribe(&chart_panel, |this, _, event: &ViewSwitchRequested, cx| {
            this.open_view(event.kind, cx);
        })
        .detach();

        cx.subscribe(&chart_panel, |this, _, event: &CityFocusRequested, cx| {
            this.handle_city_focus(event.clone(), cx);
        })
        .detach();

        cx.subscribe(&settings_state, |_, _, event: &SettingsChanged, cx| {
            event.settings.apply_theme(None, cx);
            cx.refresh_windows();
        })
        .detach();

        Self {
            notification_list,
            chat_panel,
            map_panel,
            chart_panel,
            settings_state,
            settings_window: None,
            active_view: None,
            split_percent: SPLIT_DEFAULT_PERCENT,
            latest_result: None,
            title_bar_should_move: false,
        }
    }

    fn handle_query_completed(&mut self, event: &QueryCompleted, cx: &mut Context<Self>) {
        self.latest_result = Some(event.result.clone());
        self.map_panel.update(cx, |map, cx| {
            map.apply_result(&event.result, cx);
        });

        // A completed query always surfaces a secondary view; default to map.
        if self.active_view.is_none() {
            self.set_active_view(Some(ViewKind::Map), cx);
        }
        cx.notify();
    }

    fn handle_city_focus(&mut self, event: CityFocusRequested, cx: &mut Context<Self>) {
        self.set_active_view(Some(ViewKind::Map), cx);
        self.map_panel.update(cx, |map, cx| {
            map.focus_city(event.name, event.coordinates, event.population, cx);
        });
        cx.notify();
    }

    fn open_view(&mut self, kind: ViewKind, cx: &mut Context<Self>) {
        self.set_active_view(Some(kind), cx);

        // Opening the map replays the latest result so the camera matches the
        // most recent exchange.
        if kind == ViewKind::Map
            && let Some(result) = self.latest_result.clone()
        {
            self.map_panel.update(cx, |map, cx| {
                map.apply_result(&result, cx);
            });
        }
        cx.notify();
    }

    fn close_view(&mut self, cx: &mut Context<Self>) {
        self.set_active_view(None, cx);
        cx.notify();
    }

    fn set_active_view(&mut self, active_view: Option<ViewKind>, cx: &mut Context<Self>) {
        self.active_view = active_view;
        self.chat_panel.update(cx, |chat, cx| {
            chat.set_active_view(active_view, cx);
        });
    }

    fn resize_split(&mut self, pointer_x: f32, container_width: f32, cx: &mut Context<Self>) {
        self.split_percent = compute_split_percent(pointer_x, container_width);
        cx.notify();
    }

    fn open_settings(&mut self, cx: &mut Context<Self>) {
        if let Some(settings_window) = self.settings_window.as_ref()
            && settings_window
                .update(cx, |_, window, _| {
                    window.activate_window();
                })
                .is_ok()
        {
            return;
        }

        self.settings_window = None;

        let settings_state = self.settings_state.clone();
        let settings_bounds = Bounds::centered(None, size(px(460.), px(640.)), cx);
        let settings_window = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(settings_bounds)),
                titlebar: Some(TitlebarOptions {
                    appears_transparent: true,
                    traffic_light_position: Some(point(px(14.), px(14.))),
                    ..Default::default()
                }),
                ..Default::default()
            },
            move |window, cx| {
                let settings_view = cx.new(|cx| SettingsView::new(&settings_state, window, cx));
                cx.new(|cx| Root::new(settings_view, window, cx))
            },
        );

        match settings_window {
            Ok(settings_window) => {
                self.settings_window = Some(settings_window);
            }
            Err(error) => {
                tracing::error!("failed to open settings window: {}", error);
            }
        }
    }

    fn render_secondary_view(&self) -> Option<AnyElement> {
        self.active_view.map(|kind| match kind {
            ViewKind::Map => self.map_panel.clone().into_any_element(),
            ViewKind::Chart => self.chart_panel.clone().into_any_element(),
        })
    }

    /// Renders the splitter between the secondary view and the chat pane.
    fn render_resize_handle(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("split-resize-handle")
            .w(px(5.0))
            .h_full()
            .flex_shrink_0()
            .cursor(CursorStyle::ResizeLeftRight)
            .bg(theme.border)
            .hover(|el| el.bg(theme.primary))
            .on_drag(SplitterDrag, |_, _, _, cx| cx.new(|_| EmptyDragView))
            .on_drag_move::<SplitterDrag>(cx.listener(
                |this, event: &DragMoveEvent<SplitterDrag>, window, cx| {
                    let pointer_x: f32 = event.event.position.x.into();
                    let container_width: f32 = window.viewport_size().width.into();
                    this.resize_split(pointer_x, container_width, cx);
                },
            ))
    }

    fn render_top_bar(
        &self,
        window: &Window,
        toolbar_height: Pixels,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();

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
            .pr(px(WINDOW_TOOLBAR_RIGHT_SAFE_PADDING))
            .items_center()
            .justify_between()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(
                div()
                    .text_sm()
                    .text_color(theme.muted_foreground)
                    .child("Skycast"),
            )
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .child(
                        Button::new("top-bar-settings")
                            .ghost()
                            .small()
                            .icon(IconName::Settings)
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.open_settings(cx);
                            })),
                    )
                    .child(self.render_linux_window_controls(window, cx)),
            )
            .when(
                cfg!(target_os = "linux") && window.window_controls().window_menu,
                |title_bar| {
                    title_bar.on_mouse_down(MouseButton::Right, |event, window, _| {
                        window.show_window_menu(event.position);
                    })
                },
            )
    }

    fn render_linux_window_controls(&self, window: &Window, cx: &Context<Self>) -> AnyElement {
        #[cfg(target_os = "linux")]
        {
            let maximize_icon = if window.is_maximized() {
                IconName::WindowRestore
            } else {
                IconName::WindowMaximize
            };

            h_flex()
                .id("linux-window-controls")
                .items_center()
                // Prevent clicks on window controls from bubbling into title bar gestures
                // (e.g. double-click maximize), which can cause double-toggle behavior.
                .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                .on_mouse_down(MouseButton::Right, |_, _, cx| cx.stop_propagation())
                .gap_2()
                .ml_2()
                .child(
                    Button::new("linux-window-minimize")
                        .ghost()
                        .small()
                        .icon(IconName::WindowMinimize)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.minimize_window();
                        })),
                )
                .child(
                    Button::new("linux-window-maximize")
                        .ghost()
                        .small()
                        .icon(maximize_icon)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.zoom_window();
                        })),
                )
                .child(
                    Button::new("linux-window-close")
                        .ghost()
                        .small()
                        .icon(IconName::WindowClose)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.remove_window();
                        })),
                )
                .into_any_element()
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = (window, cx);
            div().into_any_element()
        }
    }

    fn render_body(&self, stacked: bool, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let secondary = self.render_secondary_view();

        if stacked {
            // Narrow layout: the secondary view stacks on top at half height
            // and the splitter is inert.
            v_flex()
                .id("app-shell-panes")
                .flex_1()
                .min_h_0()
                .overflow_hidden()
                .when_some(secondary, |el, secondary| {
                    el.child(
                        div()
                            .h(relative(0.5))
                            .w_full()
                            .min_h_0()
                            .overflow_hidden()
                            .border_b_1()
                            .border_color(theme.border)
                            .child(secondary),
                    )
                })
                .child(
                    div()
                        .flex_1()
                        .w_full()
                        .min_h_0()
                        .overflow_hidden()
                        .child(self.chat_panel.clone()),
                )
                .into_any_element()
        } else {
            h_flex()
                .id("app-shell-panes")
                .flex_1()
                .min_w_0()
                .min_h_0()
                .overflow_hidden()
                .when_some(secondary, |el, secondary| {
                    el.child(
                        div()
                            .h_full()
                            .w(relative(self.split_percent / 100.0))
                            .min_w_0()
                            .overflow_hidden()
                            .child(secondary),
                    )
                    .child(self.render_resize_handle(cx))
                })
                .child(
                    div()
                        .flex_1()
                        .h_full()
                        .min_w_0()
                        .overflow_hidden()
                        .child(self.chat_panel.clone()),
                )
                .into_any_element()
        }
    }
}

impl Render for WeatherAppShell {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let toolbar_height = window_toolbar_height(window);
        let viewport_width: f32 = window.viewport_size().width.into();
        let stacked = is_stacked(viewport_width);

        div()
            .id("app-shell")
            .size_full()
            .relative()
            .bg(theme.background)
            .on_action(cx.listener(|this, _: &NewSession, _window, cx| {
                this.chat_panel.update(cx, |chat, cx| {
                    chat.start_new_session(cx);
                });
            }))
            .child(
                v_flex()
                    .size_full()
                    .pt(toolbar_height)
                    .child(self.render_body(stacked, cx)),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .child(self.render_top_bar(window, toolbar_height, cx)),
            )
            .child(self.notification_list.clone())
    }
}
