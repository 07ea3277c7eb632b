use std::sync::Arc;

use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use gpui_tokio_bridge::Tokio;

use skycast_agent::{
    AgentApi, AgentResult, AgentSession, CityExtractor, Geocoder, OpenMeteoGeocoder,
    RestAgentClient, mint_user_id,
};

use crate::app::ViewKind;
use crate::chat::events::{OpenViewRequested, QueryCompleted, Submit};
use crate::chat::message::{ERROR_REPLY, MessageId, Transcript};
use crate::chat::message_input::MessageInput;
use crate::chat::message_list::MessageList;
use crate::chat::pipeline::{QueryOutcome, run_query};
use crate::settings::state::{AppSettings, SettingsChanged, SettingsState};

const NEW_SESSION_FAILED: &str = "Failed to create new session. Please try again.";

/// Backend seams used by the per-query pipeline, rebuilt on settings changes.
#[derive(Clone)]
struct QueryClients {
    agent: Arc<dyn AgentApi>,
    geocoder: Arc<dyn Geocoder>,
    extractor: Option<Arc<CityExtractor>>,
}

impl QueryClients {
    fn from_settings(settings: &AppSettings) -> Self {
        let agent = Arc::new(RestAgentClient::new(
            settings.effective_agent_base_url(),
            settings.effective_app_name(),
        ));
        let geocoder = Arc::new(OpenMeteoGeocoder::new(&settings.geocoding_base_url));

        let extractor = match settings.effective_extraction_api_key() {
            Some(api_key) => {
                match CityExtractor::new(api_key, settings.extraction_model.clone()) {
                    Ok(extractor) => Some(Arc::new(extractor)),
                    Err(error) => {
                        tracing::warn!(error = %error, "city extraction disabled");
                        None
                    }
                }
            }
            None => {
                tracing::info!("no extraction API key configured; city extraction disabled");
                None
            }
        };

        Self {
            agent,
            geocoder,
            extractor,
        }
    }
}

/// Chat panel: transcript, input, and the submit pipeline.
///
/// Owns the agent session explicitly; there is no module-level session state.
pub struct ChatPanel {
    transcript: Transcript,
    message_input: Entity<MessageInput>,
    message_list: Entity<MessageList>,
    clients: QueryClients,
    session: Option<AgentSession>,
    is_processing: bool,
    query_task: Option<Task<()>>,
    active_view: Option<ViewKind>,
}

impl EventEmitter<QueryCompleted> for ChatPanel {}
impl EventEmitter<OpenViewRequested> for ChatPanel {}

impl ChatPanel {
    pub fn new(
        settings_state: &Entity<SettingsState>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let settings = settings_state.read(cx).settings();
        let clients = QueryClients::from_settings(&settings);

        let message_input = cx.new(|cx| MessageInput::new(window, cx));
        let message_list = cx.new(MessageList::new);

        cx.subscribe(&message_input, |this, _, event: &Submit, cx| {
            this.handle_submit(event.clone(), cx);
        })
        .detach();

        cx.subscribe(settings_state, |this, _, event: &SettingsChanged, cx| {
            this.handle_settings_changed(event, cx);
        })
        .detach();

        let mut this = Self {
            transcript: Transcript::with_greeting(),
            message_input,
            message_list,
            clients,
            session: None,
            is_processing: false,
            query_task: None,
            active_view: None,
        };
        this.sync_messages(true, cx);
        this
    }

    /// Shell pushes the currently open secondary view so the quick-action
    /// buttons can flip between "Open" and "Switch" labels.
    pub fn set_active_view(&mut self, active_view: Option<ViewKind>, cx: &mut Context<Self>) {
        if self.active_view != active_view {
            self.active_view = active_view;
            cx.notify();
        }
    }

    /// Creates a fresh server-side session and resets the transcript.
    pub fn start_new_session(&mut self, cx: &mut Context<Self>) {
        if self.is_processing || self.query_task.is_some() {
            return;
        }

        self.set_processing(true, cx);

        let agent = self.clients.agent.clone();
        let user_id = self
            .session
            .as_ref()
            .map(|session| session.user_id.clone())
            .unwrap_or_else(mint_user_id);

        let network_task = Tokio::spawn(cx, async move {
            let session_id = agent.create_session(&user_id).await?;
            Ok::<_, skycast_agent::AgentError>(AgentSession::new(user_id, session_id))
        });

        self.query_task = Some(cx.spawn(async move |this, cx| {
            let outcome = network_task.await;
            let _ = this.update(cx, |this, cx| {
                this.finish_new_session(outcome, cx);
            });
        }));
        cx.notify();
    }

    fn handle_submit(&mut self, event: Submit, cx: &mut Context<Self>) {
        if self.is_processing || self.query_task.is_some() || event.content.trim().is_empty() {
            return;
        }

        let query = event.content;
        self.transcript.push_user(query.clone());
        let placeholder = self.transcript.push_thinking();
        self.set_processing(true, cx);
        self.sync_messages(false, cx);

        let clients = self.clients.clone();
        let session = self.session.clone();
        let network_task = Tokio::spawn(cx, async move {
            run_query(
                clients.agent.as_ref(),
                clients.geocoder.as_ref(),
                clients.extractor.as_deref(),
                session,
                &query,
            )
            .await
        });

        self.query_task = Some(cx.spawn(async move |this, cx| {
            let outcome = network_task.await;
            let _ = this.update(cx, |this, cx| {
                this.finish_query(placeholder, outcome, cx);
            });
        }));
        cx.notify();
    }

    fn finish_query(
        &mut self,
        placeholder: MessageId,
        outcome: Result<QueryOutcome, gpui_tokio_bridge::JoinError>,
        cx: &mut Context<Self>,
    ) {
        self.query_task = None;
        self.set_processing(false, cx);

        match outcome {
            Ok(outcome) => {
                self.session = outcome.session;
                self.transcript
                    .resolve_thinking(placeholder, outcome.result.response.clone());
                self.sync_messages(false, cx);
                cx.emit(QueryCompleted {
                    result: Arc::new(outcome.result),
                });
            }
            Err(error) => {
                tracing::error!(error = %error, "query pipeline task failed");
                self.transcript.resolve_thinking(placeholder, ERROR_REPLY);
                self.sync_messages(false, cx);
            }
        }

        cx.notify();
    }

    fn finish_new_session(
        &mut self,
        outcome: Result<AgentResult<AgentSession>, gpui_tokio_bridge::JoinError>,
        cx: &mut Context<Self>,
    ) {
        self.query_task = None;
        self.set_processing(false, cx);

        match outcome {
            Ok(Ok(session)) => {
                tracing::info!(session_id = %session.session_id, "started new agent session");
                self.session = Some(session);
                self.transcript.reset();
                self.message_list
                    .update(cx, |list, cx| list.reset_scroll_tracking(cx));
                self.sync_messages(true, cx);
            }
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "new session creation failed");
                self.transcript.push_system(NEW_SESSION_FAILED);
                self.sync_messages(false, cx);
            }
            Err(error) => {
                tracing::error!(error = %error, "new session task failed");
                self.transcript.push_system(NEW_SESSION_FAILED);
                self.sync_messages(false, cx);
            }
        }

        cx.notify();
    }

    fn handle_settings_changed(&mut self, event: &SettingsChanged, cx: &mut Context<Self>) {
        self.clients = QueryClients::from_settings(&event.settings);
        // Endpoints may have moved; the old server-side session id is stale now.
        self.session = None;
        tracing::info!("rebuilt backend clients from new settings");
        cx.notify();
    }

    fn set_processing(&mut self, processing: bool, cx: &mut Context<Self>) {
        self.is_processing = processing;
        self.message_input.update(cx, |input, cx| {
            input.set_processing(processing, cx);
        });
    }

    fn sync_messages(&mut self, reset_scroll: bool, cx: &mut Context<Self>) {
        let messages = self.transcript.messages().to_vec();
        self.message_list.update(cx, |list, cx| {
            if reset_scroll {
                list.reset_scroll_tracking(cx);
            }
            list.set_messages(messages, cx);
        });
    }

    fn render_view_buttons(&self, cx: &Context<Self>) -> Vec<AnyElement> {
        let mut buttons = Vec::new();
        let is_processing = self.is_processing;

        let view_button = |id: &'static str, label: &'static str, kind: ViewKind| {
            Button::new(id)
                .ghost()
                .small()
                .child(label)
                .disabled(is_processing)
                .on_click(cx.listener(move |_, _, _window, cx| {
                    cx.emit(OpenViewRequested { kind });
                }))
                .into_any_element()
        };

        match self.active_view {
            None => {
                buttons.push(view_button("open-map", "Open Map", ViewKind::Map));
                buttons.push(view_button("open-chart", "Open Chart", ViewKind::Chart));
            }
            Some(ViewKind::Map) => {
                buttons.push(view_button("switch-chart", "Switch to Chart", ViewKind::Chart));
            }
            Some(ViewKind::Chart) => {
                buttons.push(view_button("switch-map", "Switch to Map", ViewKind::Map));
            }
        }

        buttons
    }
}

impl Render for ChatPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-panel")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                h_flex()
                    .id("chat-panel-header")
                    .flex_shrink_0()
                    .items_center()
                    .justify_between()
                    .p_3()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .text_lg()
                            .font_weight(FontWeight::BOLD)
                            .text_color(theme.primary)
                            .child("Skycast"),
                    )
                    .child(
                        Button::new("new-session")
                            .ghost()
                            .small()
                            .icon(IconName::Plus)
                            .child("New Session")
                            .disabled(self.is_processing)
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.start_new_session(cx);
                            })),
                    ),
            )
            .child(
                div()
                    .id("chat-panel-messages")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                v_flex()
                    .id("chat-panel-composer")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(
                        h_flex()
                            .px_3()
                            .pt_2()
                            .gap_2()
                            .children(self.render_view_buttons(cx)),
                    )
                    .child(self.message_input.clone()),
            )
    }
}
