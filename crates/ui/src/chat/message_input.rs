use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    input::{Input, InputEvent, InputState},
    v_flex,
};
use rand::seq::SliceRandom;

use crate::chat::events::Submit;

/// Cities rotated into the decorative input placeholder.
const PLACEHOLDER_CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Chennai", "Kolkata", "Ahmedabad", "Pune",
    "Jaipur", "Lucknow", "Kanpur", "Nagpur", "Indore", "Thane", "Bhopal", "Visakhapatnam",
    "Surat", "Agra", "Varanasi", "Kochi",
];

/// Weather phrases rotated into the decorative input placeholder.
const PLACEHOLDER_PHRASES: &[&str] = &[
    "thunderstorms",
    "rain",
    "sunny weather",
    "cloud cover",
    "wind speed",
    "humidity",
    "temperature",
    "air quality",
    "fog",
    "snowfall",
    "heat wave",
    "cold front",
];

/// Builds one decorative placeholder suggestion.
fn random_placeholder() -> String {
    let mut rng = rand::thread_rng();
    let city = PLACEHOLDER_CITIES
        .choose(&mut rng)
        .copied()
        .unwrap_or("Mumbai");
    let phrase = PLACEHOLDER_PHRASES
        .choose(&mut rng)
        .copied()
        .unwrap_or("the weather");
    format!("Ask about {phrase} near {city}")
}

/// Returns the trimmed submission, or `None` for whitespace-only input.
/// Empty submissions are a no-op: no message appended, no network call.
pub fn sanitize_submission(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub struct MessageInput {
    input_state: Entity<InputState>,
    is_processing: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder(random_placeholder())
                .clean_on_escape()
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(window, cx);
                }
            },
        )
        .detach();

        Self {
            input_state,
            is_processing: false,
        }
    }

    /// Disables the input while one query is in flight so two sends never race.
    pub fn set_processing(&mut self, processing: bool, cx: &mut Context<Self>) {
        self.is_processing = processing;
        cx.notify();
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.is_processing {
            return;
        }

        let Some(content) = sanitize_submission(&self.input_state.read(cx).value()) else {
            return;
        };

        cx.emit(Submit::new(content));
        self.clear(window, cx);
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let is_processing = self.is_processing;

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
                    .child(
                        Input::new(&self.input_state)
                            .w_full()
                            .disabled(is_processing),
                    ),
            )
            .child(
                div().w_full().flex().justify_end().child(
                    Button::new("send")
                        .small()
                        .primary()
                        .icon(IconName::ArrowUp)
                        .child(if is_processing { "Thinking..." } else { "Send" })
                        .disabled(is_processing)
                        .on_click(cx.listener(|this, _, window, cx| {
                            this.handle_submit(window, cx);
                        })),
                ),
            )
    }
}
