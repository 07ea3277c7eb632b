use std::time::Duration;

use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};

use skycast_weather::{
    CityRecord, DEFAULT_CENTER, DEFAULT_ZOOM, LonLat, WeatherPattern, format_population,
    icon_glyph,
};

use crate::chat::events::{PanelClosed, WeatherQueryResult};
use crate::map::overlay::render_overlay;
use crate::map::projection::{
    CITY_FOCUS_ZOOM, graticule_step, offset_from, overlay_size, zoom_for_population,
};

/// Camera tween duration, matching the original view's 1s ease.
const TWEEN_DURATION_MS: u64 = 1000;
const TWEEN_STEPS: u32 = 30;
/// Graticule lines drawn on each side of the camera center.
const GRATICULE_LINES: i32 = 12;

/// Map camera: center coordinate plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCamera {
    pub center: LonLat,
    pub zoom: f64,
}

impl MapCamera {
    pub const fn new(center: LonLat, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Default region view used on start and after Reset View.
    pub const fn default_view() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

/// Cubic ease-in-out over `t` in [0, 1].
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Linear camera interpolation; pair with [`ease_in_out`] for the tween.
/// Endpoints are exact so a finished tween lands on the target precisely.
pub fn lerp_camera(from: MapCamera, to: MapCamera, t: f64) -> MapCamera {
    if t <= 0.0 {
        return from;
    }
    if t >= 1.0 {
        return to;
    }

    MapCamera::new(
        LonLat::new(
            from.center.lon + (to.center.lon - from.center.lon) * t,
            from.center.lat + (to.center.lat - from.center.lat) * t,
        ),
        from.zoom + (to.zoom - from.zoom) * t,
    )
}

/// Map panel: camera state, city markers, and the decorative overlay.
///
/// No tiles are fetched; the backdrop is a graticule drawn from the same
/// projection that anchors markers and overlays.
pub struct MapPanel {
    camera: MapCamera,
    pattern: WeatherPattern,
    focus: Option<LonLat>,
    location_name: Option<String>,
    cities: Vec<CityRecord>,
    tween_task: Option<Task<()>>,
}

impl EventEmitter<PanelClosed> for MapPanel {}

impl MapPanel {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            camera: MapCamera::default_view(),
            pattern: WeatherPattern::Default,
            focus: None,
            location_name: None,
            cities: Vec::new(),
            tween_task: None,
        }
    }

    /// Applies a completed query: recenters, swaps markers, keys the overlay.
    pub fn apply_result(&mut self, result: &WeatherQueryResult, cx: &mut Context<Self>) {
        self.cities = result
            .cities
            .iter()
            .filter(|city| city.is_plottable())
            .cloned()
            .collect();

        let target = if let Some(city) = self.cities.first() {
            MapCamera::new(
                LonLat::new(city.coord.lon, city.coord.lat),
                zoom_for_population(city.population),
            )
        } else if result.location.name.is_some() {
            MapCamera::new(result.location.coordinates, CITY_FOCUS_ZOOM)
        } else {
            // Nothing resolved: fall back to the default region view.
            self.pattern = WeatherPattern::Default;
            self.focus = None;
            self.location_name = None;
            self.animate_to(MapCamera::default_view(), cx);
            return;
        };

        self.pattern = result.pattern;
        self.focus = (result.pattern != WeatherPattern::Default).then_some(target.center);
        self.location_name = result.location.name.clone();
        self.animate_to(target, cx);
    }

    /// Recenters on a chart-selected city.
    pub fn focus_city(
        &mut self,
        name: String,
        coordinates: LonLat,
        population: Option<u64>,
        cx: &mut Context<Self>,
    ) {
        self.location_name = Some(name);
        self.animate_to(
            MapCamera::new(coordinates, zoom_for_population(population)),
            cx,
        );
    }

    /// Returns to the default view and clears the overlay. Markers stay.
    pub fn reset_view(&mut self, cx: &mut Context<Self>) {
        self.pattern = WeatherPattern::Default;
        self.focus = None;
        self.location_name = None;
        self.animate_to(MapCamera::default_view(), cx);
    }

    fn animate_to(&mut self, target: MapCamera, cx: &mut Context<Self>) {
        // Dropping an in-flight tween cancels it; the new one starts from the
        // current camera, so interrupted animations stay smooth.
        drop(self.tween_task.take());

        let from = self.camera;
        if from == target {
            cx.notify();
            return;
        }

        self.tween_task = Some(cx.spawn(async move |this, cx| {
            let step_delay = Duration::from_millis(TWEEN_DURATION_MS / u64::from(TWEEN_STEPS));
            for step in 1..=TWEEN_STEPS {
                cx.background_executor().timer(step_delay).await;
                let eased = ease_in_out(f64::from(step) / f64::from(TWEEN_STEPS));
                let camera = lerp_camera(from, target, eased);
                if this
                    .update(cx, |this, cx| {
                        this.camera = camera;
                        cx.notify();
                    })
                    .is_err()
                {
                    return;
                }
            }
        }));
        cx.notify();
    }

    fn render_graticule(&self) -> Vec<AnyElement> {
        let step = graticule_step(self.camera.zoom);
        let center = self.camera.center;
        let zoom = self.camera.zoom;
        let mut lines = Vec::new();

        // Snap to step multiples so lines stay put while the camera pans.
        let base_lon = (center.lon / step).round() * step;
        let base_lat = (center.lat / step).round() * step;

        for index in -GRATICULE_LINES..=GRATICULE_LINES {
            let lon = base_lon + f64::from(index) * step;
            let (dx, _) = offset_from(center, LonLat::new(lon, center.lat), zoom);
            lines.push(
                div()
                    .absolute()
                    .left(relative(0.5))
                    .ml(px(dx))
                    .top_0()
                    .bottom_0()
                    .w(px(1.))
                    .bg(rgba(0x64748b33))
                    .into_any_element(),
            );

            let lat = (base_lat + f64::from(index) * step).clamp(-85.0, 85.0);
            let (_, dy) = offset_from(center, LonLat::new(center.lon, lat), zoom);
            lines.push(
                div()
                    .absolute()
                    .top(relative(0.5))
                    .mt(px(dy))
                    .left_0()
                    .right_0()
                    .h(px(1.))
                    .bg(rgba(0x64748b33))
                    .into_any_element(),
            );
        }

        lines
    }

    fn render_city_marker(&self, index: usize, city: &CityRecord) -> AnyElement {
        let (dx, dy) = offset_from(
            self.camera.center,
            LonLat::new(city.coord.lon, city.coord.lat),
            self.camera.zoom,
        );

        let mut card = v_flex()
            .mt_1()
            .p_2()
            .gap_0p5()
            .rounded_md()
            .bg(rgba(0x0f172ae6))
            .border_1()
            .border_color(rgba(0x475569aa))
            .text_xs()
            .text_color(rgb(0xcbd5e1))
            .child(
                div()
                    .text_color(rgb(0xffffff))
                    .child(city.tooltip.clone().unwrap_or_else(|| {
                        "Current weather conditions".to_string()
                    })),
            );

        if let Some(population) = city.population {
            card = card.child(format!("Population: {}", format_population(population)));
        }
        if let Some(area) = &city.area {
            card = card.child(format!("Area: {area}"));
        }
        if let Some(state) = &city.state {
            card = card.child(format!("State: {state}"));
        }
        if let Some(climate) = &city.climate {
            card = card.child(format!("Climate: {climate}"));
        }
        card = card.child(format!("{:.4}, {:.4}", city.coord.lat, city.coord.lon));

        div()
            .absolute()
            .left(relative(0.5))
            .top(relative(0.5))
            .ml(px(dx - 90.))
            .mt(px(dy - 16.))
            .w(px(180.))
            .child(
                v_flex()
                    .id(("city-marker", index))
                    .items_center()
                    .child(div().text_2xl().child(icon_glyph(city.icon.as_deref())))
                    .child(
                        div()
                            .px_1p5()
                            .rounded_sm()
                            .bg(rgba(0x0f172acc))
                            .text_sm()
                            .font_weight(FontWeight::BOLD)
                            .text_color(rgb(0xffffff))
                            .child(city.city.clone()),
                    )
                    .child(card),
            )
            .into_any_element()
    }

    fn render_readout(&self) -> AnyElement {
        let camera = self.camera;
        let label = match &self.location_name {
            Some(name) => format!(
                "{name} · {:.4}, {:.4} · z{:.1}",
                camera.center.lat, camera.center.lon, camera.zoom
            ),
            None => format!(
                "{:.4}, {:.4} · z{:.1}",
                camera.center.lat, camera.center.lon, camera.zoom
            ),
        };

        div()
            .absolute()
            .bottom_2()
            .left_2()
            .px_2()
            .py_1()
            .rounded_md()
            .bg(rgba(0x0f172acc))
            .text_xs()
            .text_color(rgb(0x94a3b8))
            .child(label)
            .into_any_element()
    }

    fn render_crosshair(&self) -> AnyElement {
        div()
            .absolute()
            .left(relative(0.5))
            .top(relative(0.5))
            .child(
                div()
                    .absolute()
                    .ml(px(-8.))
                    .mt(px(-1.))
                    .w(px(16.))
                    .h(px(2.))
                    .bg(rgba(0x94a3b888)),
            )
            .child(
                div()
                    .absolute()
                    .ml(px(-1.))
                    .mt(px(-8.))
                    .w(px(2.))
                    .h(px(16.))
                    .bg(rgba(0x94a3b888)),
            )
            .into_any_element()
    }
}

impl Render for MapPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let overlay = self.focus.and_then(|focus| {
            let offset = offset_from(self.camera.center, focus, self.camera.zoom);
            render_overlay(self.pattern, offset, overlay_size(self.camera.zoom))
        });

        let markers = self
            .cities
            .iter()
            .enumerate()
            .map(|(index, city)| self.render_city_marker(index, city))
            .collect::<Vec<_>>();

        v_flex()
            .id("map-panel")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                h_flex()
                    .id("map-panel-header")
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
                            .child(if self.location_name.is_some() {
                                "Weather Map"
                            } else {
                                "Map View"
                            }),
                    )
                    .child(
                        h_flex()
                            .gap_2()
                            .child(
                                Button::new("map-reset-view")
                                    .ghost()
                                    .small()
                                    .child("Reset View")
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.reset_view(cx);
                                    })),
                            )
                            .child(
                                Button::new("map-close")
                                    .ghost()
                                    .small()
                                    .child("Close")
                                    .on_click(cx.listener(|_, _, _window, cx| {
                                        cx.emit(PanelClosed);
                                    })),
                            ),
                    ),
            )
            .child(
                div()
                    .id("map-panel-canvas")
                    .relative()
                    .flex_1()
                    .min_h_0()
                    .m_3()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .overflow_hidden()
                    .bg(rgb(0x111827))
                    .children(self.render_graticule())
                    .child(self.render_crosshair())
                    .children(markers)
                    .children(overlay)
                    .child(self.render_readout()),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_both_endpoints_and_the_midpoint() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn easing_is_monotonic() {
        let mut last = 0.0;
        for step in 0..=100 {
            let value = ease_in_out(f64::from(step) / 100.0);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn camera_interpolation_moves_center_and_zoom_together() {
        let from = MapCamera::default_view();
        let to = MapCamera::new(LonLat::new(80.2707, 13.0827), 9.0);

        let start = lerp_camera(from, to, 0.0);
        assert_eq!(start, from);

        let end = lerp_camera(from, to, 1.0);
        assert_eq!(end, to);

        let mid = lerp_camera(from, to, 0.5);
        assert!((mid.center.lon - (from.center.lon + to.center.lon) / 2.0).abs() < 1e-9);
        assert!((mid.zoom - (from.zoom + to.zoom) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn interpolation_clamps_out_of_range_time() {
        let from = MapCamera::default_view();
        let to = MapCamera::new(LonLat::new(0.0, 0.0), 10.0);
        assert_eq!(lerp_camera(from, to, -1.0), from);
        assert_eq!(lerp_camera(from, to, 2.0), to);
    }
}
