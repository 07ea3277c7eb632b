use std::sync::Arc;

use skycast_agent::ResolvedLocation;
use skycast_weather::{CityRecord, LonLat, WeatherPattern};

use crate::app::ViewKind;

/// Emitted when the user submits a query from the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Everything one completed query produced for the secondary views.
///
/// Replaces the prior result wholesale; the transcript is the only history.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQueryResult {
    pub query: String,
    pub response: String,
    pub pattern: WeatherPattern,
    pub location: ResolvedLocation,
    pub cities: Vec<CityRecord>,
}

/// Emitted by the chat panel once the pipeline finished for one submit.
#[derive(Debug, Clone)]
pub struct QueryCompleted {
    pub result: Arc<WeatherQueryResult>,
}

/// Emitted when the user asks to open a secondary view from the chat panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenViewRequested {
    pub kind: ViewKind,
}

/// Emitted by a secondary view's Close action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelClosed;

/// Emitted by a secondary view asking to swap to its sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSwitchRequested {
    pub kind: ViewKind,
}

/// Emitted when a chart bar is clicked so the map can recenter on that city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityFocusRequested {
    pub name: String,
    pub coordinates: LonLat,
    pub population: Option<u64>,
}
