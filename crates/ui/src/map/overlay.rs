use std::time::Duration;

use gpui::*;

use skycast_weather::WeatherPattern;

/// Overlay geometry/timing is plain configuration; the render functions below
/// only interpret it. No overlay state survives a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySpec {
    pub kind: OverlayKind,
    pub glyph: &'static str,
    pub pulse_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Single pulsing glyph anchored at the focus point.
    Glyph,
    /// Warning disc with a ray burst, anchored at the focus point.
    Earthquake,
    /// Rippling ellipse, anchored at the focus point.
    Flood,
    /// Full-panel field of drifting streaks.
    WindField,
}

/// Rays drawn around the earthquake disc.
const EARTHQUAKE_RAY_COUNT: usize = 8;
/// Streaks drawn across the wind field.
const WIND_STREAK_COUNT: usize = 36;

/// Category-to-overlay configuration. `Default` draws nothing.
pub fn overlay_spec(pattern: WeatherPattern) -> Option<OverlaySpec> {
    let spec = |kind, glyph: &'static str, pulse_ms| OverlaySpec {
        kind,
        glyph,
        pulse_ms,
    };

    Some(match pattern {
        WeatherPattern::Sunny => spec(OverlayKind::Glyph, "☀️", 2400),
        WeatherPattern::Cloudy => spec(OverlayKind::Glyph, "☁️", 2800),
        WeatherPattern::Rain => spec(OverlayKind::Glyph, "🌧️", 1400),
        WeatherPattern::Thunderstorm => spec(OverlayKind::Glyph, "⛈️", 700),
        WeatherPattern::Snow => spec(OverlayKind::Glyph, "🌨️", 2200),
        WeatherPattern::Fog => spec(OverlayKind::Glyph, "🌫️", 3200),
        WeatherPattern::Hot => spec(OverlayKind::Glyph, "🌡️", 1800),
        WeatherPattern::Cold => spec(OverlayKind::Glyph, "❄️", 2200),
        WeatherPattern::Fire => spec(OverlayKind::Glyph, "🔥", 900),
        WeatherPattern::Hurricane => spec(OverlayKind::Glyph, "🌀", 1100),
        WeatherPattern::Tsunami => spec(OverlayKind::Glyph, "🌊", 1300),
        WeatherPattern::Drought => spec(OverlayKind::Glyph, "🏜️", 3000),
        WeatherPattern::Earthquake => spec(OverlayKind::Earthquake, "⚠", 800),
        WeatherPattern::Flood => spec(OverlayKind::Flood, "", 1600),
        WeatherPattern::Wind => spec(OverlayKind::WindField, "", 2000),
        WeatherPattern::Default => return None,
    })
}

/// Points on a circle of `radius`, starting straight up, clockwise.
pub fn ray_offsets(count: usize, radius: f32) -> Vec<(f32, f32)> {
    (0..count)
        .map(|index| {
            let angle = std::f32::consts::TAU * index as f32 / count as f32;
            (radius * angle.sin(), -radius * angle.cos())
        })
        .collect()
}

/// Deterministic per-index fraction used to scatter wind streaks. Golden-ratio
/// stepping keeps neighbors visually far apart without randomness.
fn scatter_fraction(index: usize) -> f32 {
    (index as f32 * 0.618_034) % 1.0
}

/// Builds the decorative overlay for a category, or `None` for the sentinel.
///
/// `offset` is the focus point in pixels relative to the panel center; `size`
/// comes from the zoom-derived overlay scale.
pub fn render_overlay(
    pattern: WeatherPattern,
    offset: (f32, f32),
    size: f32,
) -> Option<AnyElement> {
    let spec = overlay_spec(pattern)?;

    let element = match spec.kind {
        OverlayKind::Glyph => render_glyph(&spec, offset, size),
        OverlayKind::Earthquake => render_earthquake(&spec, offset, size),
        OverlayKind::Flood => render_flood(&spec, offset, size),
        OverlayKind::WindField => render_wind_field(&spec),
    };

    Some(element)
}

fn anchored(offset: (f32, f32), width: f32, height: f32) -> Div {
    div()
        .absolute()
        .left(relative(0.5))
        .top(relative(0.5))
        .ml(px(offset.0 - width / 2.0))
        .mt(px(offset.1 - height / 2.0))
        .w(px(width))
        .h(px(height))
}

fn render_glyph(spec: &OverlaySpec, offset: (f32, f32), size: f32) -> AnyElement {
    anchored(offset, size * 1.4, size * 1.4)
        .flex()
        .items_center()
        .justify_center()
        .text_size(px(size))
        .child(spec.glyph)
        .with_animation(
            ("overlay-glyph", 0usize),
            Animation::new(Duration::from_millis(spec.pulse_ms))
                .repeat()
                .with_easing(pulsating_between(0.55, 1.0)),
            |el, delta| el.opacity(delta),
        )
        .into_any_element()
}

fn render_earthquake(spec: &OverlaySpec, offset: (f32, f32), size: f32) -> AnyElement {
    let ray_length = size * 0.5;
    let ray_thickness = (size * 0.08).max(2.0);
    let field = size * 4.0;

    let rays = ray_offsets(EARTHQUAKE_RAY_COUNT, size * 1.4)
        .into_iter()
        .enumerate()
        .map(|(index, (dx, dy))| {
            div()
                .absolute()
                .left(relative(0.5))
                .top(relative(0.5))
                .ml(px(dx - ray_thickness / 2.0))
                .mt(px(dy - ray_length / 2.0))
                .w(px(ray_thickness))
                .h(px(ray_length))
                .rounded_full()
                .bg(rgba(0xef444466))
                .with_animation(
                    ("earthquake-ray", index),
                    Animation::new(Duration::from_millis(spec.pulse_ms))
                        .repeat()
                        .with_easing(pulsating_between(0.2, 0.9)),
                    |el, delta| el.opacity(delta),
                )
                .into_any_element()
        })
        .collect::<Vec<_>>();

    anchored(offset, field, field)
        .children(rays)
        .child(
            div()
                .absolute()
                .left(relative(0.5))
                .top(relative(0.5))
                .ml(px(-size / 2.0))
                .mt(px(-size / 2.0))
                .size(px(size))
                .rounded_full()
                .border_2()
                .border_color(rgba(0xef4444cc))
                .bg(rgba(0xef444433))
                .flex()
                .items_center()
                .justify_center()
                .text_size(px(size * 0.6))
                .text_color(rgb(0xfbbf24))
                .child(spec.glyph)
                .with_animation(
                    ("earthquake-disc", 0usize),
                    Animation::new(Duration::from_millis(spec.pulse_ms))
                        .repeat()
                        .with_easing(pulsating_between(0.6, 1.0)),
                    |el, delta| el.opacity(delta),
                ),
        )
        .into_any_element()
}

fn render_flood(spec: &OverlaySpec, offset: (f32, f32), size: f32) -> AnyElement {
    let width = size * 2.0;
    let height = size * 1.5;

    anchored(offset, width, height)
        .child(
            div()
                .absolute()
                .inset_0()
                .rounded_full()
                .bg(rgba(0x3b82f655))
                .with_animation(
                    ("flood-area", 0usize),
                    Animation::new(Duration::from_millis(spec.pulse_ms))
                        .repeat()
                        .with_easing(pulsating_between(0.4, 0.8)),
                    |el, delta| el.opacity(delta),
                ),
        )
        .child(
            div()
                .absolute()
                .left(relative(0.5))
                .top(relative(0.5))
                .ml(px(-width / 4.0))
                .mt(px(-height / 4.0))
                .w(px(width / 2.0))
                .h(px(height / 2.0))
                .rounded_full()
                .border_2()
                .border_color(rgba(0x60a5facc))
                .with_animation(
                    ("flood-ripple", 0usize),
                    Animation::new(Duration::from_millis(spec.pulse_ms / 2))
                        .repeat()
                        .with_easing(pulsating_between(0.2, 1.0)),
                    |el, delta| el.opacity(delta),
                ),
        )
        .into_any_element()
}

fn render_wind_field(spec: &OverlaySpec) -> AnyElement {
    let streaks = (0..WIND_STREAK_COUNT)
        .map(|index| {
            let top = scatter_fraction(index);
            let thickness = 2.0 + scatter_fraction(index * 7 + 3) * 3.0;
            let duration_ms = spec.pulse_ms + (index % 5) as u64 * 700;

            div()
                .absolute()
                .top(relative(top))
                .w(px(180.))
                .h(px(thickness))
                .rounded_full()
                .bg(rgba(0xffffffb0))
                .with_animation(
                    ("wind-streak", index),
                    Animation::new(Duration::from_millis(duration_ms)).repeat(),
                    |el, delta| el.left(relative(delta * 1.3 - 0.15)),
                )
                .into_any_element()
        })
        .collect::<Vec<_>>();

    div()
        .absolute()
        .inset_0()
        .overflow_hidden()
        .children(streaks)
        .into_any_element()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_sentinel_draws_nothing() {
        assert!(overlay_spec(WeatherPattern::Default).is_none());
        assert!(render_overlay(WeatherPattern::Default, (0.0, 0.0), 64.0).is_none());
    }

    #[test]
    fn every_non_sentinel_category_has_a_spec() {
        let categories = [
            WeatherPattern::Fire,
            WeatherPattern::Earthquake,
            WeatherPattern::Flood,
            WeatherPattern::Tsunami,
            WeatherPattern::Hurricane,
            WeatherPattern::Drought,
            WeatherPattern::Thunderstorm,
            WeatherPattern::Rain,
            WeatherPattern::Snow,
            WeatherPattern::Fog,
            WeatherPattern::Wind,
            WeatherPattern::Sunny,
            WeatherPattern::Cloudy,
            WeatherPattern::Hot,
            WeatherPattern::Cold,
        ];

        for pattern in categories {
            assert!(overlay_spec(pattern).is_some(), "missing spec for {pattern:?}");
        }
    }

    #[test]
    fn special_geometries_map_to_their_kinds() {
        assert_eq!(
            overlay_spec(WeatherPattern::Earthquake).map(|spec| spec.kind),
            Some(OverlayKind::Earthquake)
        );
        assert_eq!(
            overlay_spec(WeatherPattern::Flood).map(|spec| spec.kind),
            Some(OverlayKind::Flood)
        );
        assert_eq!(
            overlay_spec(WeatherPattern::Wind).map(|spec| spec.kind),
            Some(OverlayKind::WindField)
        );
        assert_eq!(
            overlay_spec(WeatherPattern::Rain).map(|spec| spec.kind),
            Some(OverlayKind::Glyph)
        );
    }

    #[test]
    fn ray_offsets_start_up_and_stay_on_the_circle() {
        let rays = ray_offsets(8, 100.0);
        assert_eq!(rays.len(), 8);

        // First ray points straight up, third points due east.
        assert!((rays[0].0 - 0.0).abs() < 1e-4);
        assert!((rays[0].1 + 100.0).abs() < 1e-4);
        assert!((rays[2].0 - 100.0).abs() < 1e-4);
        assert!((rays[2].1 - 0.0).abs() < 1e-4);

        for (dx, dy) in rays {
            let radius = (dx * dx + dy * dy).sqrt();
            assert!((radius - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn scatter_fractions_stay_in_unit_range_and_vary() {
        let fractions: Vec<f32> = (0..WIND_STREAK_COUNT).map(scatter_fraction).collect();
        assert!(fractions.iter().all(|f| (0.0..1.0).contains(f)));
        assert!(fractions.windows(2).any(|pair| pair[0] != pair[1]));
    }
}
