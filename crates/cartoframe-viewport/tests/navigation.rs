//! End-to-end navigation scenarios against an offscreen surface.

use cartoframe_core::{CrsDescriptor, EngineConfig, Extent, GeoPoint};
use cartoframe_viewport::{
    ActionMode, MapLayer, OffscreenSurface, PassthroughProjection, PointFeature, SilentPrompt,
    ViewportController,
};

fn plain_config() -> EngineConfig {
    EngineConfig {
        extend_buffer: false,
        ..Default::default()
    }
}

fn viewport(width: u32, height: u32) -> ViewportController<OffscreenSurface> {
    ViewportController::new(OffscreenSurface::new(width, height), plain_config())
}

#[test]
fn pan_zoom_history_walk() {
    let mut vp = viewport(100, 100);
    vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();

    vp.pan(10, 0).unwrap();
    vp.zoom_in().unwrap();
    vp.pan(0, -20).unwrap();
    let final_extent = *vp.extent();

    // Walk all the way back.
    let mut steps = 0;
    while vp.can_zoom_to_previous() {
        vp.zoom_to_previous().unwrap();
        steps += 1;
    }
    assert_eq!(steps, 3);
    assert!(vp.extent().approx_eq(&Extent::new(0.0, 0.0, 100.0, 100.0)));

    // And all the way forward again.
    while vp.can_zoom_to_next() {
        vp.zoom_to_next().unwrap();
    }
    assert!(vp.extent().approx_eq(&final_extent));
}

#[test]
fn history_capacity_is_bounded() {
    let config = EngineConfig {
        extend_buffer: false,
        history_capacity: 4,
        ..Default::default()
    };
    let mut vp = ViewportController::new(OffscreenSurface::new(100, 100), config);
    vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();

    for _ in 0..20 {
        vp.pan(10, 0).unwrap();
    }
    let mut steps = 0;
    while vp.can_zoom_to_previous() {
        vp.zoom_to_previous().unwrap();
        steps += 1;
    }
    assert_eq!(steps, 4, "oldest entries were evicted");
}

#[test]
fn back_navigation_survives_its_own_notification() {
    // Replaying an extent must not clear the redo branch, otherwise a
    // single zoom-to-previous would strand the user.
    let mut vp = viewport(100, 100);
    vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    vp.zoom_in().unwrap();
    vp.zoom_in().unwrap();

    vp.zoom_to_previous().unwrap();
    assert!(vp.can_zoom_to_next());
    vp.zoom_to_previous().unwrap();
    assert!(vp.can_zoom_to_next());
    assert!(!vp.can_zoom_to_previous());
}

#[test]
fn resize_round_trip_is_lossless() {
    let mut vp = viewport(400, 300);
    vp.set_extent(Extent::new(0.0, 0.0, 400.0, 300.0)).unwrap();
    let original = *vp.extent();

    for (w, h) in [(500, 300), (640, 480), (123, 457), (400, 300)] {
        vp.host().set_size(w, h);
        vp.resize().unwrap();
    }
    assert!(
        vp.extent().approx_eq(&original),
        "returning to the original client size restores the original extent"
    );
    // Resizes never enter navigation history.
    assert!(!vp.can_zoom_to_previous());
}

#[test]
fn fresh_navigation_after_back_clears_forward() {
    let mut vp = viewport(100, 100);
    vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    vp.zoom_in().unwrap();
    vp.zoom_to_previous().unwrap();
    assert!(vp.can_zoom_to_next());

    vp.set_extent(Extent::new(500.0, 500.0, 600.0, 600.0)).unwrap();
    assert!(!vp.can_zoom_to_next());
    assert!(vp.can_zoom_to_previous());
}

#[test]
fn add_layer_auto_fit_and_projection_adoption() {
    let mut vp = viewport(100, 100);
    let mut layer = MapLayer::points(
        "cities",
        vec![
            PointFeature::new(10.0, 10.0),
            PointFeature {
                position: GeoPoint::new(90.0, 90.0),
                label: None,
            },
        ],
    );
    layer.crs = Some(CrsDescriptor("EPSG:4326".into()));

    vp.add_layer(layer, &PassthroughProjection, &mut SilentPrompt)
        .unwrap();

    // The map adopted the first layer's projection and fitted the view.
    assert_eq!(
        vp.projection().map(|c| c.0.as_str()),
        Some("EPSG:4326")
    );
    assert!(vp.extent().contains(GeoPoint::new(10.0, 10.0)));
    assert!(vp.extent().contains(GeoPoint::new(90.0, 90.0)));
    assert!(vp.buffers().front().is_some(), "auto-fit rendered");

    // A second, mismatched layer is converted to the map's projection; the
    // first layer's system stays in charge.
    vp.policy_mut().reproject_mode = ActionMode::Always;
    let mut second = MapLayer::points("towns", vec![PointFeature::new(50.0, 50.0)]);
    second.crs = Some(CrsDescriptor("EPSG:3857".into()));
    let id = vp
        .add_layer(second, &PassthroughProjection, &mut SilentPrompt)
        .unwrap();
    assert_eq!(vp.projection().map(|c| c.0.as_str()), Some("EPSG:4326"));
    assert_eq!(
        vp.layers()
            .get(id)
            .and_then(|l| l.crs.as_ref())
            .map(|c| c.0.as_str()),
        Some("EPSG:4326")
    );
}
