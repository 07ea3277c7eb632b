use skycast_weather::LonLat;

/// Web Mercator world-tile edge at zoom 0.
const TILE_SIZE: f64 = 256.0;
/// Latitude clamp keeping the Mercator projection finite.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Zoom applied when a location resolves without city records.
pub const CITY_FOCUS_ZOOM: f64 = 9.0;

/// Decorative overlay sizing: base glyph size at [`OVERLAY_BASE_ZOOM`].
const OVERLAY_BASE_SIZE: f32 = 64.0;
const OVERLAY_MIN_SIZE: f32 = 32.0;
const OVERLAY_MAX_SIZE: f32 = 128.0;
const OVERLAY_BASE_ZOOM: f64 = 12.0;

/// World-pixel edge length of the projected map at `zoom`.
fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Projects a coordinate into absolute Web Mercator world pixels at `zoom`.
pub fn project(point: LonLat, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let x = (point.lon + 180.0) / 360.0 * size;

    let latitude = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (1.0 - (latitude.tan() + 1.0 / latitude.cos()).ln() / std::f64::consts::PI) / 2.0
        * size;

    (x, y)
}

/// Pixel offset of `point` relative to the camera `center` at `zoom`.
///
/// Positive x is east of center, positive y is south; the panel anchors these
/// offsets at its own midpoint, so no viewport size is needed.
pub fn offset_from(center: LonLat, point: LonLat, zoom: f64) -> (f32, f32) {
    let (center_x, center_y) = project(center, zoom);
    let (point_x, point_y) = project(point, zoom);
    ((point_x - center_x) as f32, (point_y - center_y) as f32)
}

/// Camera zoom for a city, scaled by population the way the original view
/// picked tiers: mega cities zoom out, small cities zoom in.
pub fn zoom_for_population(population: Option<u64>) -> f64 {
    match population {
        Some(population) if population > 10_000_000 => 8.0,
        Some(population) if population > 5_000_000 => 9.0,
        Some(population) if population > 1_000_000 => 10.0,
        Some(_) => 11.0,
        None => CITY_FOCUS_ZOOM,
    }
}

/// Decorative overlay size derived from zoom: 1.2x per zoom level around the
/// base, clamped to a readable range.
pub fn overlay_size(zoom: f64) -> f32 {
    let scale = 1.2f64.powf(zoom - OVERLAY_BASE_ZOOM);
    ((OVERLAY_BASE_SIZE as f64 * scale) as f32).clamp(OVERLAY_MIN_SIZE, OVERLAY_MAX_SIZE)
}

/// Longitude/latitude spacing of graticule lines at a zoom level.
pub fn graticule_step(zoom: f64) -> f64 {
    if zoom >= 10.0 {
        0.25
    } else if zoom >= 8.0 {
        1.0
    } else if zoom >= 6.0 {
        2.0
    } else {
        5.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHENNAI: LonLat = LonLat::new(80.2707, 13.0827);
    const MUMBAI: LonLat = LonLat::new(72.8777, 19.0760);

    #[test]
    fn the_center_projects_to_zero_offset() {
        let (dx, dy) = offset_from(CHENNAI, CHENNAI, 9.0);
        assert_eq!(dx, 0.0);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn east_is_positive_x_and_north_is_negative_y() {
        // Chennai is east and south of Mumbai.
        let (dx, dy) = offset_from(MUMBAI, CHENNAI, 6.0);
        assert!(dx > 0.0);
        assert!(dy > 0.0);

        let (dx, dy) = offset_from(CHENNAI, MUMBAI, 6.0);
        assert!(dx < 0.0);
        assert!(dy < 0.0);
    }

    #[test]
    fn raising_zoom_by_one_doubles_offsets() {
        let (dx1, dy1) = offset_from(MUMBAI, CHENNAI, 5.0);
        let (dx2, dy2) = offset_from(MUMBAI, CHENNAI, 6.0);
        assert!((dx2 - dx1 * 2.0).abs() < 1e-3);
        assert!((dy2 - dy1 * 2.0).abs() < 1e-3);
    }

    #[test]
    fn equator_and_meridian_land_in_the_world_middle() {
        let (x, y) = project(LonLat::new(0.0, 0.0), 0.0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn extreme_latitudes_stay_finite() {
        let (_, y) = project(LonLat::new(0.0, 90.0), 4.0);
        assert!(y.is_finite());
        let (_, y) = project(LonLat::new(0.0, -90.0), 4.0);
        assert!(y.is_finite());
    }

    #[test]
    fn population_tiers_match_the_zoom_table() {
        assert_eq!(zoom_for_population(Some(12_500_000)), 8.0);
        assert_eq!(zoom_for_population(Some(7_088_000)), 9.0);
        assert_eq!(zoom_for_population(Some(2_100_000)), 10.0);
        assert_eq!(zoom_for_population(Some(400_000)), 11.0);
        assert_eq!(zoom_for_population(None), CITY_FOCUS_ZOOM);
    }

    #[test]
    fn overlay_size_scales_with_zoom_and_clamps() {
        assert_eq!(overlay_size(OVERLAY_BASE_ZOOM), OVERLAY_BASE_SIZE);
        assert!(overlay_size(13.0) > OVERLAY_BASE_SIZE);
        assert!(overlay_size(9.0) < OVERLAY_BASE_SIZE);
        assert_eq!(overlay_size(2.0), OVERLAY_MIN_SIZE);
        assert_eq!(overlay_size(19.0), OVERLAY_MAX_SIZE);
    }
}
