use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu};

use crate::BoxFuture;
use crate::session::{AgentSession, mint_user_id};

pub const DEFAULT_AGENT_URL: &str = "http://localhost:8000";
pub const DEFAULT_APP_NAME: &str = "weatheragent";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AgentError {
    #[snafu(display("agent transport failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("agent endpoint returned status {status} on `{stage}`: {body}"))]
    UnexpectedStatus {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("agent session was not found on `{stage}`"))]
    SessionNotFound { stage: &'static str },
    #[snafu(display("agent produced no reply text on `{stage}`"))]
    EmptyReply { stage: &'static str },
}

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Debug, Serialize)]
struct CreateSessionBody {
    state: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    id: String,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    app_name: &'a str,
    user_id: &'a str,
    session_id: &'a str,
    new_message: NewMessage<'a>,
}

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

/// One event from the agent's `/run` response array.
///
/// Only the text content matters to this client; unknown fields are ignored
/// and every known field is optional so partial events never fail the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentEvent {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<EventContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventContent {
    #[serde(default)]
    pub parts: Vec<EventPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl AgentEvent {
    /// First non-empty text part carried by this event.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .find(|text| !text.trim().is_empty())
    }
}

/// Picks the reply out of a `/run` event array: the LAST event carrying
/// non-empty text content wins.
pub fn extract_reply(events: &[AgentEvent]) -> Option<String> {
    events
        .iter()
        .rev()
        .find_map(|event| event.text())
        .map(|text| text.to_string())
}

/// Object-safe seam over the agent backend so orchestration and retry logic
/// can be exercised against scripted doubles.
pub trait AgentApi: Send + Sync {
    /// Creates a server-side session for `user_id`, returning its id.
    fn create_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, AgentResult<String>>;

    /// Sends one user message into the session, returning the event array.
    fn run<'a>(
        &'a self,
        session: &'a AgentSession,
        message: &'a str,
    ) -> BoxFuture<'a, AgentResult<Vec<AgentEvent>>>;
}

/// reqwest-backed implementation of the agent REST protocol.
pub struct RestAgentClient {
    http: reqwest::Client,
    base_url: String,
    app_name: String,
}

impl RestAgentClient {
    pub fn new(base_url: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            app_name: app_name.into().trim().to_string(),
        }
    }

    async fn create_session_inner(&self, user_id: &str) -> AgentResult<String> {
        let url = format!(
            "{}/apps/{}/users/{}/sessions",
            self.base_url, self.app_name, user_id
        );

        let response = self
            .http
            .post(url)
            .json(&CreateSessionBody {
                state: serde_json::json!({}),
            })
            .send()
            .await
            .context(TransportSnafu {
                stage: "create-session-send",
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return UnexpectedStatusSnafu {
                stage: "create-session-status",
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let created: SessionCreated = response.json().await.context(TransportSnafu {
            stage: "create-session-decode",
        })?;

        tracing::info!(session_id = %created.id, "created agent session");
        Ok(created.id)
    }

    async fn run_inner(
        &self,
        session: &AgentSession,
        message: &str,
    ) -> AgentResult<Vec<AgentEvent>> {
        let url = format!("{}/run", self.base_url);
        let body = RunRequest {
            app_name: &self.app_name,
            user_id: &session.user_id,
            session_id: &session.session_id,
            new_message: NewMessage {
                role: "user",
                parts: vec![TextPart { text: message }],
            },
        };

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .context(TransportSnafu { stage: "run-send" })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return SessionNotFoundSnafu { stage: "run-status" }.fail();
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return UnexpectedStatusSnafu {
                stage: "run-status",
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        response
            .json()
            .await
            .context(TransportSnafu { stage: "run-decode" })
    }
}

impl AgentApi for RestAgentClient {
    fn create_session<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, AgentResult<String>> {
        Box::pin(self.create_session_inner(user_id))
    }

    fn run<'a>(
        &'a self,
        session: &'a AgentSession,
        message: &'a str,
    ) -> BoxFuture<'a, AgentResult<Vec<AgentEvent>>> {
        Box::pin(self.run_inner(session, message))
    }
}

/// Returns the existing session unchanged, or mints ids and creates one.
pub async fn ensure_session(
    api: &dyn AgentApi,
    existing: Option<AgentSession>,
) -> AgentResult<AgentSession> {
    if let Some(session) = existing {
        return Ok(session);
    }

    let user_id = mint_user_id();
    let session_id = api.create_session(&user_id).await?;
    Ok(AgentSession::new(user_id, session_id))
}

/// Sends one message into the session and returns the reply text.
///
/// Session-not-found triggers exactly one session re-creation and one resend;
/// a second not-found (or any other failure) propagates to the caller.
pub async fn send_message(
    api: &dyn AgentApi,
    session: &mut AgentSession,
    message: &str,
) -> AgentResult<String> {
    match api.run(session, message).await {
        Ok(events) => reply_from_events(&events),
        Err(AgentError::SessionNotFound { .. }) => {
            tracing::warn!(
                user_id = %session.user_id,
                "agent session not found; recreating and retrying once"
            );
            session.session_id = api.create_session(&session.user_id).await?;
            let events = api.run(session, message).await?;
            reply_from_events(&events)
        }
        Err(error) => Err(error),
    }
}

fn reply_from_events(events: &[AgentEvent]) -> AgentResult<String> {
    extract_reply(events).context(EmptyReplySnafu {
        stage: "reply-selection",
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn text_event(text: &str) -> AgentEvent {
        AgentEvent {
            author: Some("meteorologist".to_string()),
            content: Some(EventContent {
                parts: vec![EventPart {
                    text: Some(text.to_string()),
                }],
            }),
        }
    }

    fn empty_event() -> AgentEvent {
        AgentEvent {
            author: Some("planner".to_string()),
            content: Some(EventContent {
                parts: vec![EventPart {
                    text: Some("  ".to_string()),
                }],
            }),
        }
    }

    struct ScriptedAgent {
        run_responses: Mutex<VecDeque<AgentResult<Vec<AgentEvent>>>>,
        sessions_created: AtomicUsize,
        runs: AtomicUsize,
    }

    impl ScriptedAgent {
        fn new(run_responses: Vec<AgentResult<Vec<AgentEvent>>>) -> Self {
            Self {
                run_responses: Mutex::new(run_responses.into()),
                sessions_created: AtomicUsize::new(0),
                runs: AtomicUsize::new(0),
            }
        }

        fn sessions_created(&self) -> usize {
            self.sessions_created.load(Ordering::SeqCst)
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    impl AgentApi for ScriptedAgent {
        fn create_session<'a>(&'a self, _user_id: &'a str) -> BoxFuture<'a, AgentResult<String>> {
            Box::pin(async move {
                let ordinal = self.sessions_created.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("session-{ordinal}"))
            })
        }

        fn run<'a>(
            &'a self,
            _session: &'a AgentSession,
            _message: &'a str,
        ) -> BoxFuture<'a, AgentResult<Vec<AgentEvent>>> {
            Box::pin(async move {
                self.runs.fetch_add(1, Ordering::SeqCst);
                self.run_responses
                    .lock()
                    .expect("scripted responses poisoned")
                    .pop_front()
                    .unwrap_or_else(|| Ok(Vec::new()))
            })
        }
    }

    #[test]
    fn reply_selection_takes_the_last_non_empty_text() {
        let events = vec![
            text_event("Working on it..."),
            empty_event(),
            text_event("Severe flooding is expected near Chennai."),
            AgentEvent::default(),
        ];

        assert_eq!(
            extract_reply(&events).as_deref(),
            Some("Severe flooding is expected near Chennai.")
        );
    }

    #[test]
    fn reply_selection_yields_none_without_text_content() {
        assert_eq!(extract_reply(&[]), None);
        assert_eq!(extract_reply(&[empty_event(), AgentEvent::default()]), None);
    }

    #[tokio::test]
    async fn successful_send_does_not_touch_session_creation() {
        let agent = ScriptedAgent::new(vec![Ok(vec![text_event("Sunny in Pune.")])]);
        let mut session = AgentSession::new("user_a", "session-0");

        let reply = send_message(&agent, &mut session, "weather in Pune")
            .await
            .expect("reply");

        assert_eq!(reply, "Sunny in Pune.");
        assert_eq!(agent.runs(), 1);
        assert_eq!(agent.sessions_created(), 0);
        assert_eq!(session.session_id, "session-0");
    }

    #[tokio::test]
    async fn session_not_found_recreates_and_retries_exactly_once() {
        let agent = ScriptedAgent::new(vec![
            Err(AgentError::SessionNotFound { stage: "run-status" }),
            Ok(vec![text_event("Flood warning issued for Chennai.")]),
        ]);
        let mut session = AgentSession::new("user_a", "session-stale");

        let reply = send_message(&agent, &mut session, "flood near Chennai?")
            .await
            .expect("reply after retry");

        assert_eq!(reply, "Flood warning issued for Chennai.");
        assert_eq!(agent.runs(), 2);
        assert_eq!(agent.sessions_created(), 1);
        assert_eq!(session.session_id, "session-1");
    }

    #[tokio::test]
    async fn a_second_not_found_propagates_instead_of_looping() {
        let agent = ScriptedAgent::new(vec![
            Err(AgentError::SessionNotFound { stage: "run-status" }),
            Err(AgentError::SessionNotFound { stage: "run-status" }),
        ]);
        let mut session = AgentSession::new("user_a", "session-stale");

        let error = send_message(&agent, &mut session, "flood near Chennai?")
            .await
            .expect_err("second 404 must fail");

        assert!(matches!(error, AgentError::SessionNotFound { .. }));
        assert_eq!(agent.runs(), 2);
        assert_eq!(agent.sessions_created(), 1);
    }

    #[tokio::test]
    async fn non_session_errors_do_not_trigger_a_retry() {
        let agent = ScriptedAgent::new(vec![Err(AgentError::UnexpectedStatus {
            stage: "run-status",
            status: 500,
            body: "internal".to_string(),
        })]);
        let mut session = AgentSession::new("user_a", "session-0");

        let error = send_message(&agent, &mut session, "hello")
            .await
            .expect_err("500 must fail");

        assert!(matches!(error, AgentError::UnexpectedStatus { status: 500, .. }));
        assert_eq!(agent.runs(), 1);
        assert_eq!(agent.sessions_created(), 0);
    }

    #[tokio::test]
    async fn an_event_array_without_text_is_an_empty_reply_error() {
        let agent = ScriptedAgent::new(vec![Ok(vec![empty_event()])]);
        let mut session = AgentSession::new("user_a", "session-0");

        let error = send_message(&agent, &mut session, "hello")
            .await
            .expect_err("no text content");

        assert!(matches!(error, AgentError::EmptyReply { .. }));
    }

    #[tokio::test]
    async fn ensure_session_reuses_an_existing_session() {
        let agent = ScriptedAgent::new(Vec::new());
        let existing = AgentSession::new("user_a", "session-7");

        let session = ensure_session(&agent, Some(existing.clone()))
            .await
            .expect("existing session");

        assert_eq!(session, existing);
        assert_eq!(agent.sessions_created(), 0);
    }

    #[tokio::test]
    async fn ensure_session_mints_ids_when_absent() {
        let agent = ScriptedAgent::new(Vec::new());

        let session = ensure_session(&agent, None).await.expect("fresh session");

        assert!(session.user_id.starts_with("user_"));
        assert_eq!(session.session_id, "session-1");
        assert_eq!(agent.sessions_created(), 1);
    }
}
