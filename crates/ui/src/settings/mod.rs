pub mod state;
pub mod view;

pub use state::{AppSettings, SettingsChanged, SettingsError, SettingsState, SettingsStore};
pub use view::{SettingsClose, SettingsView};
