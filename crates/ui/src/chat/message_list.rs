use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, v_flex};

use crate::chat::message::{ChatMessage, MessageStatus, Role};
use crate::chat::scroll_manager::ScrollManager;

/// Pulse period for the thinking placeholder and alert badges.
const PULSE_PERIOD_MS: u64 = 900;

/// Scrollable transcript with role-styled bubbles.
pub struct MessageList {
    messages: Vec<ChatMessage>,
    scroll_manager: ScrollManager,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            scroll_manager: ScrollManager::new(),
        }
    }

    /// Replaces the rendered messages, keeping the tail in view while the
    /// user has not scrolled away.
    pub fn set_messages(&mut self, messages: Vec<ChatMessage>, cx: &mut Context<Self>) {
        self.messages = messages;
        self.scroll_manager.request_scroll_to_bottom_if_following();
        cx.notify();
    }

    /// Clears scroll history, e.g. after a session reset.
    pub fn reset_scroll_tracking(&mut self, cx: &mut Context<Self>) {
        self.scroll_manager.reset();
        cx.notify();
    }

    fn render_message(&self, message: &ChatMessage, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let is_user = message.role == Role::User;

        let bubble = if message.status == MessageStatus::Thinking {
            self.render_thinking_bubble(message, cx)
        } else if message.is_emergency_alert() {
            self.render_alert_bubble(message, cx)
        } else {
            div()
                .max_w(relative(0.8))
                .p_3()
                .rounded_lg()
                .when(is_user, |el| {
                    el.bg(theme.primary)
                        .text_color(theme.primary_foreground)
                        .rounded_tr(px(0.))
                })
                .when(!is_user, |el| {
                    el.bg(theme.muted)
                        .text_color(theme.foreground)
                        .rounded_tl(px(0.))
                })
                .child(message.content.clone())
                .into_any_element()
        };

        h_flex()
            .w_full()
            .when(is_user, |el| el.justify_end())
            .when(!is_user, |el| el.justify_start())
            .child(bubble)
            .into_any_element()
    }

    fn render_thinking_bubble(&self, message: &ChatMessage, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .p_3()
            .gap_1()
            .rounded_lg()
            .rounded_tl(px(0.))
            .bg(theme.muted)
            .children((0..3usize).map(|index| {
                div()
                    .size(px(8.))
                    .rounded_full()
                    .bg(theme.muted_foreground)
                    .with_animation(
                        ("thinking-dot", message.id.0 as usize * 3 + index),
                        Animation::new(Duration::from_millis(PULSE_PERIOD_MS))
                            .repeat()
                            .with_easing(pulsating_between(0.2, 0.9)),
                        |el, delta| el.opacity(delta),
                    )
            }))
            .into_any_element()
    }

    fn render_alert_bubble(&self, message: &ChatMessage, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let body = message.content.replace("EMERGENCY ALERT:", "");

        v_flex()
            .max_w(relative(0.8))
            .p_3()
            .gap_2()
            .rounded_lg()
            .rounded_tl(px(0.))
            .bg(theme.muted)
            .child(
                h_flex()
                    .items_center()
                    .gap_2()
                    .child(
                        div()
                            .size(px(10.))
                            .rounded_full()
                            .bg(theme.danger)
                            .with_animation(
                                ("alert-pulse", message.id.0 as usize),
                                Animation::new(Duration::from_millis(PULSE_PERIOD_MS))
                                    .repeat()
                                    .with_easing(pulsating_between(0.3, 1.0)),
                                |el, delta| el.opacity(delta),
                            ),
                    )
                    .child(
                        div()
                            .text_color(theme.danger)
                            .font_weight(FontWeight::BOLD)
                            .child("EMERGENCY ALERT"),
                    ),
            )
            .child(
                div()
                    .p_2()
                    .rounded_md()
                    .border_1()
                    .border_color(theme.danger)
                    .text_color(theme.foreground)
                    .child(body.trim().to_string()),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        let rows = self
            .messages
            .iter()
            .map(|message| self.render_message(message, cx))
            .collect::<Vec<_>>();

        div()
            .id("message-list")
            .size_full()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .child(v_flex().w_full().gap_4().px_6().py_6().children(rows))
    }
}
