/// Decorative overlay configuration and rendering.
pub mod overlay;
/// Web Mercator projection math for markers, overlays, and the graticule.
pub mod projection;
pub mod view;

pub use view::{MapCamera, MapPanel};
