use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IndexPath, Sizable, ThemeMode, ThemeRegistry,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputState},
    select::{Select, SelectState},
    v_flex,
};

use crate::settings::state::{AppSettings, SettingsState};

pub struct SettingsView {
    state: Entity<SettingsState>,
    agent_url_input: Entity<InputState>,
    app_name_input: Entity<InputState>,
    geocoding_url_input: Entity<InputState>,
    extraction_key_input: Entity<InputState>,
    extraction_model_input: Entity<InputState>,
    theme_preset_select: Entity<SelectState<Vec<SharedString>>>,
    theme_mode: ThemeMode,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsClose;

impl EventEmitter<SettingsClose> for SettingsView {}

impl SettingsView {
    fn theme_names(cx: &App) -> Vec<SharedString> {
        ThemeRegistry::global(cx)
            .sorted_themes()
            .iter()
            .map(|theme| theme.name.clone())
            .collect()
    }

    fn selected_theme_index(
        theme_names: &[SharedString],
        selected_theme_name: &str,
    ) -> Option<IndexPath> {
        if selected_theme_name.trim().is_empty() {
            return None;
        }

        theme_names
            .iter()
            .position(|theme_name| theme_name.as_ref() == selected_theme_name.trim())
            .map(|index| IndexPath::default().row(index))
    }

    pub fn new(state: &Entity<SettingsState>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings = state.read(cx).settings().clone();

        let agent_url_input = cx.new(|cx| {
            InputState::new(window, cx).placeholder("Agent URL (e.g., http://localhost:8000)")
        });
        agent_url_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.agent_base_url.clone(), window, cx);
        });

        let app_name_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Agent app name"));
        app_name_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.app_name.clone(), window, cx);
        });

        let geocoding_url_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Geocoding URL"));
        geocoding_url_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.geocoding_base_url.clone(), window, cx);
        });

        let extraction_key_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Extraction API key (optional)"));
        extraction_key_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.extraction_api_key.clone(), window, cx);
        });

        let extraction_model_input = cx.new(|cx| {
            InputState::new(window, cx).placeholder("Extraction model (e.g., gemini-1.5-flash)")
        });
        extraction_model_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.extraction_model.clone(), window, cx);
        });

        let theme_names = Self::theme_names(cx);
        let selected_theme_index = Self::selected_theme_index(&theme_names, &settings.theme_name);
        let theme_preset_select = cx.new(|cx| {
            SelectState::new(theme_names, selected_theme_index, window, cx).searchable(true)
        });

        Self {
            state: state.clone(),
            agent_url_input,
            app_name_input,
            geocoding_url_input,
            extraction_key_input,
            extraction_model_input,
            theme_preset_select,
            theme_mode: settings.theme_mode,
            error_message: None,
        }
    }

    fn select_light_mode(
        &mut self,
        _event: &gpui::ClickEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.theme_mode = ThemeMode::Light;
        cx.notify();
    }

    fn select_dark_mode(
        &mut self,
        _event: &gpui::ClickEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.theme_mode = ThemeMode::Dark;
        cx.notify();
    }

    fn save_settings(
        &mut self,
        _event: &gpui::ClickEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let theme_name = self
            .theme_preset_select
            .read(cx)
            .selected_value()
            .map(|theme_name| theme_name.to_string())
            .unwrap_or_default();

        let new_settings = AppSettings {
            agent_base_url: self.agent_url_input.read(cx).value().to_string(),
            app_name: self.app_name_input.read(cx).value().to_string(),
            geocoding_base_url: self.geocoding_url_input.read(cx).value().to_string(),
            extraction_api_key: self.extraction_key_input.read(cx).value().to_string(),
            extraction_model: self.extraction_model_input.read(cx).value().to_string(),
            theme_mode: self.theme_mode,
            theme_name,
        };

        match self
            .state
            .update(cx, |state, cx| state.update_settings(new_settings, cx))
        {
            Ok(()) => {
                self.error_message = None;
                cx.emit(SettingsClose);
                window.remove_window();
            }
            Err(e) => {
                self.error_message = Some(format!("Failed to save settings: {e}"));
                cx.notify();
            }
        }
    }

    fn cancel(&mut self, _event: &gpui::ClickEvent, window: &mut Window, cx: &mut Context<Self>) {
        self.error_message = None;
        cx.emit(SettingsClose);
        window.remove_window();
    }

    fn labeled_input(
        label: &'static str,
        input: &Entity<InputState>,
        cx: &Context<Self>,
    ) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .gap_1()
            .child(div().text_sm().text_color(theme.foreground).child(label))
            .child(Input::new(input).w_full())
            .into_any_element()
    }
}

impl Render for SettingsView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("settings-view")
            .w(px(420.))
            .gap_4()
            .p_4()
            .bg(theme.popover)
            .rounded_lg()
            .shadow_lg()
            .child(
                div()
                    .text_lg()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child("Skycast Settings"),
            )
            .child(
                v_flex()
                    .gap_3()
                    .child(Self::labeled_input("Agent URL", &self.agent_url_input, cx))
                    .child(Self::labeled_input("App Name", &self.app_name_input, cx))
                    .child(Self::labeled_input(
                        "Geocoding URL",
                        &self.geocoding_url_input,
                        cx,
                    ))
                    .child(Self::labeled_input(
                        "Extraction API Key",
                        &self.extraction_key_input,
                        cx,
                    ))
                    .child(Self::labeled_input(
                        "Extraction Model",
                        &self.extraction_model_input,
                        cx,
                    ))
                    .child(
                        v_flex()
                            .gap_1()
                            .child(
                                div()
                                    .text_sm()
                                    .text_color(theme.foreground)
                                    .child("Theme Mode"),
                            )
                            .child(
                                h_flex()
                                    .gap_2()
                                    .child(
                                        Button::new("settings-theme-light")
                                            .small()
                                            .when(self.theme_mode == ThemeMode::Light, |button| {
                                                button.primary()
                                            })
                                            .when(self.theme_mode != ThemeMode::Light, |button| {
                                                button.ghost()
                                            })
                                            .child("Light")
                                            .on_click(cx.listener(Self::select_light_mode)),
                                    )
                                    .child(
                                        Button::new("settings-theme-dark")
                                            .small()
                                            .when(self.theme_mode == ThemeMode::Dark, |button| {
                                                button.primary()
                                            })
                                            .when(self.theme_mode != ThemeMode::Dark, |button| {
                                                button.ghost()
                                            })
                                            .child("Dark")
                                            .on_click(cx.listener(Self::select_dark_mode)),
                                    ),
                            ),
                    )
                    .child(
                        v_flex()
                            .gap_1()
                            .child(
                                div()
                                    .text_sm()
                                    .text_color(theme.foreground)
                                    .child("Theme Preset"),
                            )
                            .child(
                                Select::new(&self.theme_preset_select)
                                    .w_full()
                                    .placeholder("Follow mode")
                                    .search_placeholder("Search theme preset")
                                    .cleanable(true),
                            ),
                    ),
            )
            .when_some(self.error_message.clone(), |el, error| {
                el.child(div().text_sm().text_color(theme.danger).child(error))
            })
            .child(
                h_flex()
                    .gap_2()
                    .justify_end()
                    .child(
                        Button::new("settings-cancel")
                            .ghost()
                            .small()
                            .child("Cancel")
                            .on_click(cx.listener(Self::cancel)),
                    )
                    .child(
                        Button::new("settings-save")
                            .primary()
                            .small()
                            .child("Save")
                            .on_click(cx.listener(Self::save_settings)),
                    ),
            )
    }
}
