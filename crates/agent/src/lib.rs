#![deny(unsafe_code)]

//! Backend plumbing for the weather chat client.
//!
//! Three concerns live here, each behind its own seam: the agent backend
//! session/run protocol, Open-Meteo geocoding lookups, and city-record
//! extraction from reply text through a generative completion. The UI crate
//! only ever sees the traits and the typed results.

use std::future::Future;
use std::pin::Pin;

pub mod client;
pub mod extract;
pub mod geocode;
pub mod session;

/// Boxed future used by the object-safe client traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use client::{
    AgentApi, AgentError, AgentEvent, AgentResult, DEFAULT_AGENT_URL, DEFAULT_APP_NAME,
    RestAgentClient, ensure_session, extract_reply, send_message,
};
pub use extract::{CityExtractor, DEFAULT_EXTRACTION_MODEL, ExtractError, ExtractResult};
pub use geocode::{
    DEFAULT_GEOCODING_URL, GeocodeError, GeocodeResult, GeocodedPlace, Geocoder,
    OpenMeteoGeocoder, ResolvedLocation, resolve_coordinates,
};
pub use session::{AgentSession, mint_user_id};
