use s1footprint::core::map_view::{CoastlineResolution, MapView, MapViewParams};
use s1footprint::types::{GeoError, GeoPoint};
use approx::assert_relative_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn biscay_view() -> MapView {
    MapView::initialize(&[44.0, 45.2, 46.0], &[-4.0, -2.0, -1.0], MapViewParams::default())
        .expect("Failed to build map view")
}

#[test]
fn test_extent_includes_margin() {
    init_logging();
    let view = biscay_view();

    assert_relative_eq!(view.data_bounds.min_lat, 44.0);
    assert_relative_eq!(view.data_bounds.max_lon, -1.0);

    assert_relative_eq!(view.extent.min_lat, 43.5, epsilon = 1e-12);
    assert_relative_eq!(view.extent.max_lat, 46.5, epsilon = 1e-12);
    assert_relative_eq!(view.extent.min_lon, -4.75, epsilon = 1e-12);
    assert_relative_eq!(view.extent.max_lon, -0.25, epsilon = 1e-12);
}

#[test]
fn test_projection_is_centered_on_data() {
    init_logging();
    let view = biscay_view();

    assert_relative_eq!(view.center.lat, 45.0);
    assert_relative_eq!(view.center.lon, -2.5);
    assert_relative_eq!(view.standard_parallel, 46.5, epsilon = 1e-12);
    assert_eq!(view.params.resolution, CoastlineResolution::Intermediate);
    assert!(view.params.draw_coastlines);
    assert!(view.params.draw_boundary);
}

#[test]
fn test_graticule() {
    init_logging();
    let view = biscay_view();

    let parallels: Vec<f64> = view.parallels.iter().map(|line| line.value).collect();
    let meridians: Vec<f64> = view.meridians.iter().map(|line| line.value).collect();
    assert_eq!(parallels, vec![43.0, 44.0, 45.0, 46.0]);
    assert_eq!(meridians, vec![-5.0, -4.0, -3.0, -2.0, -1.0]);

    let parallel = view.parallels[0].labels;
    assert!(parallel.right && parallel.top && !parallel.left && !parallel.bottom);
    let meridian = view.meridians[0].labels;
    assert!(meridian.left && meridian.bottom && !meridian.right && !meridian.top);
}

#[test]
fn test_label_flags_follow_basemap_order() {
    let view = biscay_view();
    for line in &view.parallels {
        assert_eq!(line.labels.as_flags(), [false, true, true, false]);
    }
    for line in &view.meridians {
        assert_eq!(line.labels.as_flags(), [true, false, false, true]);
    }
}

#[test]
fn test_project_and_contains() {
    init_logging();
    let view = biscay_view();
    let (width, height) = view.size();
    assert!(width > 0.0 && height > 0.0);

    let center = GeoPoint::new(45.0, -2.5);
    assert!(view.contains(center));
    assert!(!view.contains(GeoPoint::new(50.0, -2.5)));
    assert!(!view.contains(GeoPoint::new(45.0, 3.0)));

    let (x, y) = view.project(center);
    let back = view.unproject(x, y);
    assert_relative_eq!(back.lat, center.lat, epsilon = 1e-9);
    assert_relative_eq!(back.lon, center.lon, epsilon = 1e-9);
}

#[test]
fn test_custom_params() {
    let params = MapViewParams {
        margin: 0.0,
        graticule_stride: 0.5,
        resolution: CoastlineResolution::High,
        ..MapViewParams::default()
    };
    let view = MapView::initialize(&[44.0, 46.0], &[-4.0, -1.0], params).unwrap();
    assert_eq!(view.extent, view.data_bounds);
    assert_eq!(view.parallels.len(), 5);
    assert_eq!(view.params.resolution.code(), 'h');
}

#[test]
fn test_equatorial_data() {
    init_logging();
    let view = MapView::initialize(&[-0.02, 0.02], &[10.0, 11.0], MapViewParams::default()).unwrap();
    assert!(view.standard_parallel.abs() >= 0.1);
    assert!(view.contains(GeoPoint::new(0.0, 10.5)));
}

#[test]
fn test_single_point() {
    let view = MapView::initialize(&[45.0], &[-2.0], MapViewParams::default()).unwrap();
    assert_eq!(view.extent, view.data_bounds);
    assert_eq!(view.parallels.len(), 1);
}

#[test]
fn test_invalid_inputs() {
    let params = MapViewParams::default;
    assert!(matches!(
        MapView::initialize(&[], &[], params()),
        Err(GeoError::InvalidInput(_))
    ));
    assert!(matches!(
        MapView::initialize(&[1.0, 2.0], &[1.0], params()),
        Err(GeoError::InvalidInput(_))
    ));
    assert!(matches!(
        MapView::initialize(&[1.0, f64::NAN], &[1.0, 2.0], params()),
        Err(GeoError::InvalidInput(_))
    ));
    assert!(matches!(
        MapView::initialize(
            &[1.0, 2.0],
            &[1.0, 2.0],
            MapViewParams {
                graticule_stride: 0.0,
                ..MapViewParams::default()
            }
        ),
        Err(GeoError::InvalidParameter(_))
    ));
}
