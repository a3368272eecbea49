use engine::events::{PointerEvent, PointerPhase};
use engine::surface::{LayoutProperty, MapSurface, RenderedFeature, SurfaceError};
use foundation::geo::{LngLat, geodesic_distance_km};
use foundation::math::{Vec2, stable_total_cmp_f64};
use tracing::{debug, warn};

/// Snap radius (km): the farthest a drop may land from a candidate point and
/// still count as a match.
pub const SNAP_RADIUS_KM: f64 = 0.0107109;

/// Vertical nudge so the drag visual's apparent anchor sits at the cursor tip.
pub const VISUAL_NUDGE_PX: f64 = 10.0;

/// External panorama view. Receives one opaque point identifier.
pub trait PanoramaViewer {
    fn open(&mut self, panorama_id: &str);
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Matched { panorama_id: String, distance_km: f64 },
    /// Dropped beyond the snap radius, onto an empty pool, or without a
    /// usable pointer position.
    Miss,
    /// No drag session was active.
    Inactive,
}

#[derive(Debug, Copy, Clone)]
struct DragSession {
    start: Vec2,
    offset: Vec2,
}

/// Drag lifecycle for the panorama handle, mouse and touch alike.
///
/// One session at a time: a pointer-down while a session is active is
/// ignored, so two sessions can never fight over the drag visual.
#[derive(Debug)]
pub struct DragController {
    points_layer_id: String,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(points_layer_id: impl Into<String>) -> Self {
        Self {
            points_layer_id: points_layer_id.into(),
            session: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Pointer-down on the drag handle.
    ///
    /// Records the pointer/handle offset, reveals the candidate point layer
    /// so the match pool is renderable during the drag, and opens the
    /// session. Returns whether a session started.
    pub fn pointer_down(
        &mut self,
        surface: &mut dyn MapSurface,
        event: &PointerEvent,
        handle_origin: Vec2,
    ) -> Result<bool, SurfaceError> {
        if self.session.is_some() {
            debug!("ignoring pointer-down during an active drag");
            return Ok(false);
        }
        let Some(position) = event.position(PointerPhase::Down) else {
            return Ok(false);
        };

        surface.set_layout_property(&self.points_layer_id, LayoutProperty::Visibility(true))?;
        self.session = Some(DragSession {
            start: position,
            offset: position - handle_origin,
        });
        Ok(true)
    }

    /// Where the drag visual's top-left belongs for this pointer position,
    /// or `None` when no session is active.
    pub fn pointer_move(&self, event: &PointerEvent) -> Option<Vec2> {
        let session = self.session.as_ref()?;
        let position = event.position(PointerPhase::Move)?;
        Some(Vec2::new(
            position.x - session.offset.x,
            position.y + VISUAL_NUDGE_PX,
        ))
    }

    pub fn start_position(&self) -> Option<Vec2> {
        self.session.map(|s| s.start)
    }

    /// Drop: resolve the pointer position to the nearest candidate point.
    ///
    /// The candidate pool is read before the point layer goes back to
    /// hidden. The drop's document-space position becomes canvas-relative
    /// via `container_origin`, then geographic via the surface unprojection.
    /// A match within the snap radius opens the viewer; anything else is a
    /// reported no-op.
    pub fn pointer_up(
        &mut self,
        surface: &mut dyn MapSurface,
        event: &PointerEvent,
        container_origin: Vec2,
        viewer: &mut dyn PanoramaViewer,
    ) -> Result<DropOutcome, SurfaceError> {
        if self.session.take().is_none() {
            return Ok(DropOutcome::Inactive);
        }

        let candidates = surface.query_rendered_features(&self.points_layer_id);
        surface.set_layout_property(&self.points_layer_id, LayoutProperty::Visibility(false))?;

        let Some(position) = event.position(PointerPhase::Up) else {
            return Ok(DropOutcome::Miss);
        };
        let drop = surface.unproject(position - container_origin);

        let Some((feature, distance_km)) = nearest_candidate(drop, &candidates) else {
            debug!("drop with no candidate points");
            return Ok(DropOutcome::Miss);
        };
        if distance_km > SNAP_RADIUS_KM {
            debug!(distance_km, "drop outside the snap radius");
            return Ok(DropOutcome::Miss);
        }
        let Some(panorama_id) = feature.property_str("panorama_id") else {
            warn!("nearest candidate point has no panorama id");
            return Ok(DropOutcome::Miss);
        };

        viewer.open(panorama_id);
        Ok(DropOutcome::Matched {
            panorama_id: panorama_id.to_string(),
            distance_km,
        })
    }
}

/// Nearest candidate by geodesic distance to `drop`.
///
/// Ordering contract: the first feature in iteration order with the strictly
/// smallest distance wins; an equal distance keeps the earlier feature.
/// Candidates without a point anchor are skipped; an empty pool is `None`.
pub fn nearest_candidate(
    drop: LngLat,
    candidates: &[RenderedFeature],
) -> Option<(&RenderedFeature, f64)> {
    let mut best: Option<(&RenderedFeature, f64)> = None;
    for feature in candidates {
        let Some(position) = feature.position else {
            continue;
        };
        let distance = geodesic_distance_km(drop, position);
        best = match best {
            None => Some((feature, distance)),
            Some((_, best_distance)) if stable_total_cmp_f64(distance, best_distance).is_lt() => {
                Some((feature, distance))
            }
            keep => keep,
        };
    }
    best
}

/// Escape / explicit close: tears the viewer down from any point,
/// independent of drag state.
pub fn close_viewer(viewer: &mut dyn PanoramaViewer) {
    if viewer.is_open() {
        viewer.close();
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DragController, DropOutcome, PanoramaViewer, SNAP_RADIUS_KM, VISUAL_NUDGE_PX,
        close_viewer, nearest_candidate,
    };
    use engine::events::PointerEvent;
    use engine::headless::{HeadlessSurface, Viewport};
    use engine::layer::{LayerSpec, LayerType};
    use engine::symbology::Paint;
    use engine::surface::{MapSurface, RenderedFeature};
    use foundation::geo::LngLat;
    use foundation::math::Vec2;
    use geodata::geojson::FeatureCollection;

    #[derive(Default)]
    struct RecordingViewer {
        open: bool,
        opened_ids: Vec<String>,
    }

    impl PanoramaViewer for RecordingViewer {
        fn open(&mut self, panorama_id: &str) {
            self.open = true;
            self.opened_ids.push(panorama_id.to_string());
        }

        fn close(&mut self) {
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    fn candidate(id: &str, lng: f64, lat: f64) -> RenderedFeature {
        let mut properties = serde_json::Map::new();
        properties.insert(
            "panorama_id".to_string(),
            serde_json::Value::String(id.to_string()),
        );
        RenderedFeature {
            id: None,
            properties,
            position: Some(LngLat::new(lng, lat)),
        }
    }

    /// Surface with a hidden candidate point layer over two panorama points.
    fn surface_with_points() -> HeadlessSurface {
        let mut surface = HeadlessSurface::new(
            Viewport::new(LngLat::new(0.0, 0.0), 0.0001, 100.0, 100.0),
            18.0,
        );
        let collection = FeatureCollection::from_geojson_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": { "panorama_id": "p1" },
                        "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
                    },
                    {
                        "type": "Feature",
                        "properties": { "panorama_id": "p2" },
                        "geometry": { "type": "Point", "coordinates": [0.01, 0.01] }
                    }
                ]
            }"#,
        )
        .expect("parse points");
        surface
            .add_source("panoramas", collection)
            .expect("add source");

        let mut spec = LayerSpec::new(LayerType::Circle, Paint::constant("#d9534a", 1.0));
        spec.id = "panoramas.points".to_string();
        spec.source = "panoramas".to_string();
        spec.layout.visible = false;
        surface.add_layer(spec).expect("add layer");
        surface
    }

    #[test]
    fn nearest_match_picks_the_minimum_distance() {
        let candidates = vec![candidate("p1", 0.0, 0.0), candidate("p2", 0.01, 0.01)];
        let (hit, distance) =
            nearest_candidate(LngLat::new(0.0, 0.0), &candidates).expect("match");
        assert_eq!(hit.property_str("panorama_id"), Some("p1"));
        assert!(distance <= SNAP_RADIUS_KM);
    }

    #[test]
    fn nearest_match_is_idempotent() {
        let candidates = vec![candidate("p1", 0.0, 0.0), candidate("p2", 0.01, 0.01)];
        let drop = LngLat::new(0.002, 0.003);
        let first = nearest_candidate(drop, &candidates).map(|(f, d)| (f.clone(), d));
        let second = nearest_candidate(drop, &candidates).map(|(f, d)| (f.clone(), d));
        assert_eq!(first, second);
    }

    #[test]
    fn equal_distances_keep_the_first_candidate() {
        let candidates = vec![candidate("first", 0.001, 0.001), candidate("second", 0.001, 0.001)];
        let (hit, _) = nearest_candidate(LngLat::new(0.0, 0.0), &candidates).expect("match");
        assert_eq!(hit.property_str("panorama_id"), Some("first"));
    }

    #[test]
    fn empty_pool_and_anchorless_candidates_yield_none() {
        assert!(nearest_candidate(LngLat::new(0.0, 0.0), &[]).is_none());

        let anchorless = RenderedFeature {
            id: None,
            properties: serde_json::Map::new(),
            position: None,
        };
        assert!(nearest_candidate(LngLat::new(0.0, 0.0), &[anchorless]).is_none());
    }

    #[test]
    fn drop_at_center_matches_the_origin_point() {
        let mut surface = surface_with_points();
        let mut drag = DragController::new("panoramas.points");
        let mut viewer = RecordingViewer::default();

        let started = drag
            .pointer_down(&mut surface, &PointerEvent::mouse(10.0, 10.0), Vec2::new(8.0, 8.0))
            .expect("pointer down");
        assert!(started);
        assert!(drag.is_active());
        assert_eq!(surface.visible_layer_ids(), vec!["panoramas.points"]);

        // Viewport center (pixel 50,50) unprojects to (0, 0), right on p1.
        let outcome = drag
            .pointer_up(
                &mut surface,
                &PointerEvent::mouse(50.0, 50.0),
                Vec2::new(0.0, 0.0),
                &mut viewer,
            )
            .expect("pointer up");

        match outcome {
            DropOutcome::Matched {
                panorama_id,
                distance_km,
            } => {
                assert_eq!(panorama_id, "p1");
                assert!(distance_km <= SNAP_RADIUS_KM);
            }
            other => panic!("expected a match, got {other:?}"),
        }
        assert!(viewer.is_open());
        assert_eq!(viewer.opened_ids, vec!["p1".to_string()]);
        assert!(!drag.is_active());
        // The candidate layer is hidden again after the drop.
        assert!(surface.visible_layer_ids().is_empty());
    }

    #[test]
    fn far_drop_is_a_miss_and_opens_nothing() {
        let mut surface = surface_with_points();
        let mut drag = DragController::new("panoramas.points");
        let mut viewer = RecordingViewer::default();

        drag.pointer_down(&mut surface, &PointerEvent::mouse(10.0, 10.0), Vec2::new(8.0, 8.0))
            .expect("pointer down");

        // Unprojects to roughly (10, -10) degrees, far beyond both points.
        let outcome = drag
            .pointer_up(
                &mut surface,
                &PointerEvent::mouse(100_000.0, 100_000.0),
                Vec2::new(0.0, 0.0),
                &mut viewer,
            )
            .expect("pointer up");

        assert_eq!(outcome, DropOutcome::Miss);
        assert!(!viewer.is_open());
        assert!(surface.visible_layer_ids().is_empty());
    }

    #[test]
    fn second_pointer_down_is_ignored() {
        let mut surface = surface_with_points();
        let mut drag = DragController::new("panoramas.points");

        assert!(
            drag.pointer_down(&mut surface, &PointerEvent::mouse(10.0, 10.0), Vec2::new(4.0, 4.0))
                .expect("first down")
        );
        let start_before = drag.start_position();
        let offset_before = drag.pointer_move(&PointerEvent::mouse(20.0, 20.0));

        assert!(
            !drag
                .pointer_down(&mut surface, &PointerEvent::mouse(90.0, 90.0), Vec2::new(0.0, 0.0))
                .expect("second down")
        );
        // The original session still owns the visual.
        assert_eq!(drag.start_position(), start_before);
        assert_eq!(drag.pointer_move(&PointerEvent::mouse(20.0, 20.0)), offset_before);
    }

    #[test]
    fn visual_tracks_pointer_minus_offset_with_nudge() {
        let mut surface = surface_with_points();
        let mut drag = DragController::new("panoramas.points");

        drag.pointer_down(&mut surface, &PointerEvent::mouse(30.0, 40.0), Vec2::new(25.0, 36.0))
            .expect("pointer down");

        let visual = drag
            .pointer_move(&PointerEvent::mouse(50.0, 60.0))
            .expect("active session");
        assert_eq!(visual, Vec2::new(45.0, 60.0 + VISUAL_NUDGE_PX));
    }

    #[test]
    fn touch_lifecycle_uses_changed_points_on_drop() {
        let mut surface = surface_with_points();
        let mut drag = DragController::new("panoramas.points");
        let mut viewer = RecordingViewer::default();

        let down = PointerEvent::touch(vec![Vec2::new(10.0, 10.0)], vec![]);
        drag.pointer_down(&mut surface, &down, Vec2::new(8.0, 8.0))
            .expect("touch down");

        let up = PointerEvent::touch(vec![], vec![Vec2::new(50.0, 50.0)]);
        let outcome = drag
            .pointer_up(&mut surface, &up, Vec2::new(0.0, 0.0), &mut viewer)
            .expect("touch up");

        assert!(matches!(outcome, DropOutcome::Matched { .. }));
    }

    #[test]
    fn drop_without_a_session_is_inactive() {
        let mut surface = surface_with_points();
        let mut drag = DragController::new("panoramas.points");
        let mut viewer = RecordingViewer::default();

        let outcome = drag
            .pointer_up(
                &mut surface,
                &PointerEvent::mouse(50.0, 50.0),
                Vec2::new(0.0, 0.0),
                &mut viewer,
            )
            .expect("pointer up");
        assert_eq!(outcome, DropOutcome::Inactive);
    }

    #[test]
    fn close_viewer_is_independent_of_drag_state() {
        let mut viewer = RecordingViewer::default();
        viewer.open("p1");

        close_viewer(&mut viewer);
        assert!(!viewer.is_open());

        // Closing an already-closed viewer stays quiet.
        close_viewer(&mut viewer);
        assert!(!viewer.is_open());
    }
}
