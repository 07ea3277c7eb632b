/// Event contracts for chat module wiring.
pub mod events;
/// Domain entities for the transcript.
pub mod message;
pub mod message_input;
pub mod message_list;
/// Per-query orchestration: agent send, classification, resolution, extraction.
pub mod pipeline;
pub mod scroll_manager;
pub mod view;

pub use events::{
    CityFocusRequested, OpenViewRequested, PanelClosed, QueryCompleted, Submit,
    ViewSwitchRequested, WeatherQueryResult,
};
pub use message::{ChatMessage, MessageId, MessageStatus, Role, Transcript};
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use pipeline::{QueryOutcome, run_query};
pub use scroll_manager::ScrollManager;
pub use view::ChatPanel;
