use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};

use skycast_weather::LonLat;

use crate::app::ViewKind;
use crate::chat::events::{CityFocusRequested, PanelClosed, ViewSwitchRequested};

/// Demo population binding: city, inhabitants in millions, lon, lat.
const CITY_POPULATION: &[(&str, f64, f64, f64)] = &[
    ("Mumbai", 12.5, 72.8777, 19.0760),
    ("Delhi", 11.0, 77.1025, 28.7041),
    ("Bangalore", 8.4, 77.5946, 12.9716),
    ("Hyderabad", 6.9, 78.4867, 17.3850),
    ("Chennai", 4.7, 80.2707, 13.0827),
    ("Kolkata", 4.5, 88.3639, 22.5726),
    ("Pune", 3.1, 73.8567, 18.5204),
    ("Ahmedabad", 5.6, 72.5714, 23.0225),
];

/// Demo temperature binding: monthly average and maximum, January first.
const MONTHLY_AVG_TEMPERATURE: &[f64] = &[15., 18., 22., 28., 34., 38., 35., 33., 29., 24., 19., 16.];
const MONTHLY_MAX_TEMPERATURE: &[f64] = &[8., 10., 15., 22., 28., 32., 30., 28., 24., 18., 12., 9.];
const MONTH_LABELS: &[&str] = &["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"];

/// Tallest bar height in pixels.
const MAX_BAR_HEIGHT: f32 = 220.0;

/// Which demo chart is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Population,
    Temperature,
}

/// Scales a value into bar pixels against the series maximum.
pub fn bar_height(value: f64, max: f64, max_px: f32) -> f32 {
    if max <= 0.0 || value <= 0.0 {
        return 0.0;
    }
    ((value / max) * f64::from(max_px)) as f32
}

/// Series maximum used as the 100% bar.
pub fn series_max(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, f64::max)
}

/// Chart panel: two static demo bindings rendered as flex bars.
///
/// Clicking a population bar recenters the map on that city.
pub struct ChartPanel {
    active_chart: ChartKind,
}

impl EventEmitter<PanelClosed> for ChartPanel {}
impl EventEmitter<ViewSwitchRequested> for ChartPanel {}
impl EventEmitter<CityFocusRequested> for ChartPanel {}

impl ChartPanel {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            active_chart: ChartKind::Population,
        }
    }

    fn select_chart(&mut self, kind: ChartKind, cx: &mut Context<Self>) {
        if self.active_chart != kind {
            self.active_chart = kind;
            cx.notify();
        }
    }

    fn render_population_chart(&self, cx: &Context<Self>) -> AnyElement {
        let max = series_max(CITY_POPULATION.iter().map(|(_, value, ..)| *value));

        let bars = CITY_POPULATION
            .iter()
            .enumerate()
            .map(|(index, (name, population, lon, lat))| {
                let height = bar_height(*population, max, MAX_BAR_HEIGHT);
                let name = (*name).to_string();
                let coordinates = LonLat::new(*lon, *lat);
                let population_count = (*population * 1_000_000.0) as u64;

                v_flex()
                    .id(("population-bar", index))
                    .items_center()
                    .gap_1()
                    .cursor_pointer()
                    .on_click(cx.listener(move |_, _, _window, cx| {
                        cx.emit(CityFocusRequested {
                            name: name.clone(),
                            coordinates,
                            population: Some(population_count),
                        });
                    }))
                    .child(
                        div()
                            .text_xs()
                            .text_color(rgb(0xc4b5fd))
                            .child(format!("{population:.1}")),
                    )
                    .child(
                        div()
                            .w(px(34.))
                            .h(px(height))
                            .rounded_t_md()
                            .bg(rgb(0x8b5cf6))
                            .hover(|el| el.bg(rgb(0xa78bfa))),
                    )
                    .child(
                        div()
                            .text_xs()
                            .text_color(rgb(0x94a3b8))
                            .child(CITY_POPULATION[index].0),
                    )
                    .into_any_element()
            })
            .collect::<Vec<_>>();

        v_flex()
            .gap_3()
            .child(
                div()
                    .text_color(rgb(0xc4b5fd))
                    .child("City population in millions (click a bar to zoom the map)"),
            )
            .child(h_flex().items_end().gap_3().children(bars))
            .into_any_element()
    }

    fn render_temperature_chart(&self) -> AnyElement {
        let max = series_max(
            MONTHLY_AVG_TEMPERATURE
                .iter()
                .chain(MONTHLY_MAX_TEMPERATURE.iter())
                .copied(),
        );

        let bars = MONTH_LABELS
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let average = MONTHLY_AVG_TEMPERATURE[index];
                let maximum = MONTHLY_MAX_TEMPERATURE[index];

                v_flex()
                    .items_center()
                    .gap_1()
                    .child(
                        h_flex()
                            .items_end()
                            .gap_0p5()
                            .child(
                                div()
                                    .w(px(10.))
                                    .h(px(bar_height(average, max, MAX_BAR_HEIGHT)))
                                    .rounded_t_sm()
                                    .bg(rgb(0x06b6d4)),
                            )
                            .child(
                                div()
                                    .w(px(10.))
                                    .h(px(bar_height(maximum, max, MAX_BAR_HEIGHT)))
                                    .rounded_t_sm()
                                    .bg(rgb(0xf59e0b)),
                            ),
                    )
                    .child(div().text_xs().text_color(rgb(0x94a3b8)).child(*label))
                    .into_any_element()
            })
            .collect::<Vec<_>>();

        v_flex()
            .gap_3()
            .child(
                h_flex()
                    .gap_4()
                    .child(legend_swatch(rgb(0x06b6d4), "Avg temperature (°C)"))
                    .child(legend_swatch(rgb(0xf59e0b), "Max temperature (°C)")),
            )
            .child(h_flex().items_end().gap_2().children(bars))
            .into_any_element()
    }
}

fn legend_swatch(color: Rgba, label: &'static str) -> AnyElement {
    h_flex()
        .items_center()
        .gap_1p5()
        .child(div().size(px(10.)).rounded_sm().bg(color))
        .child(div().text_xs().text_color(rgb(0xcbd5e1)).child(label))
        .into_any_element()
}

impl Render for ChartPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let active_chart = self.active_chart;

        let chart = match active_chart {
            ChartKind::Population => self.render_population_chart(cx),
            ChartKind::Temperature => self.render_temperature_chart(),
        };

        v_flex()
            .id("chart-panel")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                h_flex()
                    .id("chart-panel-header")
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
                            .child("Weather Analytics"),
                    )
                    .child(
                        h_flex()
                            .gap_2()
                            .child(
                                Button::new("chart-population")
                                    .small()
                                    .when(active_chart == ChartKind::Population, |button| {
                                        button.primary()
                                    })
                                    .when(active_chart != ChartKind::Population, |button| {
                                        button.ghost()
                                    })
                                    .child("Population")
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.select_chart(ChartKind::Population, cx);
                                    })),
                            )
                            .child(
                                Button::new("chart-temperature")
                                    .small()
                                    .when(active_chart == ChartKind::Temperature, |button| {
                                        button.primary()
                                    })
                                    .when(active_chart != ChartKind::Temperature, |button| {
                                        button.ghost()
                                    })
                                    .child("Temperature")
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.select_chart(ChartKind::Temperature, cx);
                                    })),
                            )
                            .child(
                                Button::new("chart-switch-map")
                                    .ghost()
                                    .small()
                                    .child("Switch to Map")
                                    .on_click(cx.listener(|_, _, _window, cx| {
                                        cx.emit(ViewSwitchRequested {
                                            kind: ViewKind::Map,
                                        });
                                    })),
                            )
                            .child(
                                Button::new("chart-close")
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
                    .id("chart-panel-body")
                    .flex_1()
                    .min_h_0()
                    .overflow_y_scroll()
                    .m_3()
                    .p_4()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .child(chart),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_heights_scale_against_the_series_maximum() {
        let max = series_max(CITY_POPULATION.iter().map(|(_, value, ..)| *value));
        assert_eq!(max, 12.5);

        assert_eq!(bar_height(max, max, MAX_BAR_HEIGHT), MAX_BAR_HEIGHT);
        let half = bar_height(max / 2.0, max, MAX_BAR_HEIGHT);
        assert!((half - MAX_BAR_HEIGHT / 2.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_series_produce_zero_height() {
        assert_eq!(bar_height(5.0, 0.0, MAX_BAR_HEIGHT), 0.0);
        assert_eq!(bar_height(0.0, 10.0, MAX_BAR_HEIGHT), 0.0);
        assert_eq!(bar_height(-1.0, 10.0, MAX_BAR_HEIGHT), 0.0);
    }

    #[test]
    fn demo_bindings_stay_aligned() {
        assert_eq!(MONTHLY_AVG_TEMPERATURE.len(), 12);
        assert_eq!(MONTHLY_MAX_TEMPERATURE.len(), 12);
        assert_eq!(MONTH_LABELS.len(), 12);
        assert_eq!(CITY_POPULATION.len(), 8);
    }

    #[test]
    fn population_counts_convert_to_inhabitants() {
        let (_, millions, ..) = CITY_POPULATION[0];
        assert_eq!((millions * 1_000_000.0) as u64, 12_500_000);
    }
}
