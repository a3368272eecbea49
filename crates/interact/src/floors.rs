use engine::layer::{LayerSpec, LayerType};
use engine::symbology::{ColorExpr, Paint};
use engine::surface::{MapSurface, RenderedFeature, SurfaceError};
use foundation::geo::LngLat;
use geodata::merge::AmbientIndex;
use geodata::records::{Assignment, format_slot, is_teaching_space};
use geodata::registry::{RegistryError, SourceRegistry};
use tracing::{debug, info, warn};

use crate::group::{GroupError, LayerGroup};
use crate::hover::HoverCache;

/// Zoom applied when the camera flies to a single room.
pub const AMBIENT_FOCUS_ZOOM: f64 = 19.0;

/// Paint configuration shared by every floor group.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorStyle {
    pub category_colors: Vec<(String, String)>,
    pub default_color: String,
    pub fill_opacity: f64,
    pub outline_color: String,
    pub label_color: String,
    /// Property key symbol layers render as the room label.
    pub label_property: String,
}

impl Default for FloorStyle {
    fn default() -> Self {
        Self {
            category_colors: vec![
                ("classroom".to_string(), "#4a90d9".to_string()),
                ("laboratory".to_string(), "#7bc67b".to_string()),
                ("office".to_string(), "#e8b84b".to_string()),
                ("auditorium".to_string(), "#b07bd6".to_string()),
            ],
            default_color: "#d6d6d6".to_string(),
            fill_opacity: 0.75,
            outline_color: "#3b3b3b".to_string(),
            label_color: "#1a1a1a".to_string(),
            label_property: "name".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum FloorError {
    NotLoaded,
    AlreadyLoaded,
    UnknownInitialFloor(String),
    Source(RegistryError),
    Group(GroupError),
    Surface(SurfaceError),
}

impl std::fmt::Display for FloorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FloorError::NotLoaded => write!(f, "floor manager is not loaded"),
            FloorError::AlreadyLoaded => write!(f, "floor manager is already loaded"),
            FloorError::UnknownInitialFloor(id) => {
                write!(f, "initial floor {id:?} is not among the floor keys")
            }
            FloorError::Source(e) => write!(f, "{e}"),
            FloorError::Group(e) => write!(f, "{e}"),
            FloorError::Surface(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FloorError {}

#[derive(Debug)]
pub struct Floor {
    group: LayerGroup,
    hover: HoverCache,
}

impl Floor {
    pub fn group(&self) -> &LayerGroup {
        &self.group
    }

    pub fn hover(&mut self) -> &mut HoverCache {
        &mut self.hover
    }
}

#[derive(Debug, Default)]
enum FloorState {
    #[default]
    Unloaded,
    Loaded { floors: Vec<Floor>, active: usize },
}

/// What a room click hands to the detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailContent {
    pub name: String,
    pub description: String,
    pub groups: Vec<CourseDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub course: String,
    pub professor: String,
    pub enrolled: u32,
    /// Formatted weekly slots, one line per slot.
    pub schedule: Vec<String>,
}

/// External detail-panel view. Clearing is explicit so the panel never shows
/// stale content for an unmatched click.
pub trait DetailPanel {
    fn show(&mut self, content: &DetailContent);
    fn clear(&mut self);
}

/// Floor-switching state machine.
///
/// `Unloaded` until `load` builds one layer group per floor source; from then
/// on exactly one group is visible, and `switch_to` moves that bit as a
/// single operation. The manager lives for the application's lifetime; there
/// is no unload.
#[derive(Debug, Default)]
pub struct FloorManager {
    state: FloorState,
}

impl FloorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, FloorState::Loaded { .. })
    }

    /// Builds one fill + outline + label group per floor key, registers the
    /// layers, and attaches a hover cache to each group's fill layer. The
    /// initial floor starts visible; every other floor starts hidden.
    ///
    /// Every key must already be registered geometry.
    pub fn load(
        &mut self,
        surface: &mut dyn MapSurface,
        registry: &SourceRegistry,
        floor_keys: &[&str],
        initial: &str,
        style: &FloorStyle,
    ) -> Result<(), FloorError> {
        if self.is_loaded() {
            return Err(FloorError::AlreadyLoaded);
        }
        if !floor_keys.contains(&initial) {
            return Err(FloorError::UnknownInitialFloor(initial.to_string()));
        }

        let mut floors = Vec::with_capacity(floor_keys.len());
        let mut active = 0;
        for (index, key) in floor_keys.iter().enumerate() {
            registry.require(key).map_err(FloorError::Source)?;

            let visible = *key == initial;
            if visible {
                active = index;
            }

            let mut group = LayerGroup::new(*key, *key, visible);
            group.push_layer(
                "fill",
                LayerSpec::new(
                    LayerType::Fill,
                    Paint {
                        color: ColorExpr::ByCategory {
                            property: "category".to_string(),
                            mapping: style.category_colors.clone(),
                            default: style.default_color.clone(),
                        },
                        opacity: style.fill_opacity,
                    },
                ),
            );
            group.push_layer(
                "outline",
                LayerSpec::new(LayerType::Line, Paint::constant(style.outline_color.clone(), 1.0)),
            );
            group.push_layer(
                "labels",
                LayerSpec::new(LayerType::Symbol, Paint::constant(style.label_color.clone(), 1.0))
                    .with_text_field(style.label_property.clone()),
            );
            group.add_to_map(surface).map_err(FloorError::Surface)?;

            let fill_id = group
                .layer_id_by_type(LayerType::Fill)
                .map_err(FloorError::Group)?
                .to_string();
            let hover = HoverCache::new(*key, fill_id);

            floors.push(Floor { group, hover });
        }

        info!(floors = floors.len(), initial, "floor manager loaded");
        self.state = FloorState::Loaded { floors, active };
        Ok(())
    }

    /// Shows exactly the requested floor and hides every other one.
    ///
    /// An unknown id is a reported no-op (`Ok(false)`), leaving the current
    /// floor in place. Every group is driven to its final visibility, so one
    /// floor is visible afterwards no matter what state preceded the call.
    pub fn switch_to(
        &mut self,
        surface: &mut dyn MapSurface,
        floor_id: &str,
    ) -> Result<bool, FloorError> {
        let FloorState::Loaded { floors, active } = &mut self.state else {
            return Err(FloorError::NotLoaded);
        };
        let Some(target) = floors
            .iter()
            .position(|f| f.group.group_id() == floor_id)
        else {
            warn!(floor_id, "switch requested for unknown floor");
            return Ok(false);
        };

        for (index, floor) in floors.iter_mut().enumerate() {
            floor
                .group
                .set_visible(surface, index == target)
                .map_err(FloorError::Surface)?;
        }
        *active = target;
        Ok(true)
    }

    pub fn active_floor(&self) -> Option<&str> {
        match &self.state {
            FloorState::Unloaded => None,
            FloorState::Loaded { floors, active } => {
                floors.get(*active).map(|f| f.group.group_id())
            }
        }
    }

    pub fn floor_ids(&self) -> Vec<&str> {
        match &self.state {
            FloorState::Unloaded => Vec::new(),
            FloorState::Loaded { floors, .. } => {
                floors.iter().map(|f| f.group.group_id()).collect()
            }
        }
    }

    pub fn visible_floor_ids(&self) -> Vec<&str> {
        match &self.state {
            FloorState::Unloaded => Vec::new(),
            FloorState::Loaded { floors, .. } => floors
                .iter()
                .filter(|f| f.group.is_visible())
                .map(|f| f.group.group_id())
                .collect(),
        }
    }

    /// The hover cache attached to a floor's fill layer.
    pub fn hover_for(&mut self, floor_id: &str) -> Option<&mut HoverCache> {
        match &mut self.state {
            FloorState::Unloaded => None,
            FloorState::Loaded { floors, .. } => floors
                .iter_mut()
                .find(|f| f.group.group_id() == floor_id)
                .map(|f| &mut f.hover),
        }
    }

    pub fn fill_layer_id(&self, floor_id: &str) -> Option<&str> {
        match &self.state {
            FloorState::Unloaded => None,
            FloorState::Loaded { floors, .. } => floors
                .iter()
                .find(|f| f.group.group_id() == floor_id)
                .and_then(|f| f.group.layer_id_by_type(LayerType::Fill).ok()),
        }
    }

    /// Click resolution for a floor's fill layer.
    ///
    /// Looks the clicked feature's `ambient_id` up in the attribute set and
    /// hands the record to the detail panel; teaching spaces additionally
    /// carry every course group scheduled in the room. Misses clear the
    /// panel instead of leaving stale content.
    pub fn handle_fill_click(
        &self,
        feature: &RenderedFeature,
        ambients: &AmbientIndex,
        assignments: &[Assignment],
        panel: &mut dyn DetailPanel,
    ) {
        let Some(ambient_id) = feature.property_str("ambient_id") else {
            debug!("clicked feature carries no ambient id");
            panel.clear();
            return;
        };
        let Some(record) = ambients.get(ambient_id) else {
            debug!(ambient_id, "no attribute record for clicked feature");
            panel.clear();
            return;
        };

        let groups = if is_teaching_space(&record.category) {
            collect_course_details(assignments, ambient_id)
        } else {
            Vec::new()
        };

        panel.show(&DetailContent {
            name: record.name.clone(),
            description: record.description.clone(),
            groups,
        });
    }

    /// Navigates to the floor containing `ambient_id` and flies the camera
    /// to the feature. Unknown ambients are a reported no-op.
    pub fn fly_to_ambient(
        &mut self,
        surface: &mut dyn MapSurface,
        registry: &SourceRegistry,
        ambient_id: &str,
    ) -> Result<bool, FloorError> {
        let target = self.find_ambient_anchor(registry, ambient_id)?;
        let Some((floor_id, anchor)) = target else {
            warn!(ambient_id, "no floor feature for ambient");
            return Ok(false);
        };

        self.switch_to(surface, &floor_id)?;
        surface.fly_to(anchor, AMBIENT_FOCUS_ZOOM);
        Ok(true)
    }

    fn find_ambient_anchor(
        &self,
        registry: &SourceRegistry,
        ambient_id: &str,
    ) -> Result<Option<(String, LngLat)>, FloorError> {
        let FloorState::Loaded { floors, .. } = &self.state else {
            return Err(FloorError::NotLoaded);
        };
        for floor in floors {
            let collection = registry
                .require(floor.group.source_key())
                .map_err(FloorError::Source)?;
            let anchor = collection
                .features
                .iter()
                .find(|f| f.property_str("ambient_id") == Some(ambient_id))
                .and_then(|f| f.anchor());
            if let Some(anchor) = anchor {
                return Ok(Some((floor.group.group_id().to_string(), anchor)));
            }
        }
        Ok(None)
    }
}

fn collect_course_details(assignments: &[Assignment], ambient_id: &str) -> Vec<CourseDetail> {
    let mut out = Vec::new();
    for assignment in assignments {
        for group in assignment
            .groups
            .iter()
            .filter(|g| g.ambient_id == ambient_id)
        {
            let schedule = group.schedules.iter().filter_map(format_slot).collect();
            out.push(CourseDetail {
                course: assignment.name.clone(),
                professor: group.professor.name.clone(),
                enrolled: group.enrolled,
                schedule,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{DetailContent, DetailPanel, FloorError, FloorManager, FloorStyle};
    use engine::headless::{HeadlessSurface, Viewport};
    use engine::surface::{MapSurface, RenderedFeature};
    use foundation::geo::LngLat;
    use geodata::geojson::FeatureCollection;
    use geodata::merge::AmbientIndex;
    use geodata::records::{
        AmbientRecord, Assignment, CourseGroup, Professor, ScheduleSlot,
    };
    use geodata::registry::SourceRegistry;

    fn floor_payload(fid: u64, ambient_id: &str, lng: f64, lat: f64) -> String {
        format!(
            r#"{{
                "type": "FeatureCollection",
                "features": [{{
                    "type": "Feature",
                    "id": {fid},
                    "properties": {{ "ambient_id": "{ambient_id}" }},
                    "geometry": {{ "type": "Point", "coordinates": [{lng}, {lat}] }}
                }}]
            }}"#
        )
    }

    fn loaded_manager() -> (FloorManager, HeadlessSurface, SourceRegistry) {
        let mut surface = HeadlessSurface::new(
            Viewport::new(LngLat::new(0.0, 0.0), 0.001, 100.0, 100.0),
            18.0,
        );
        let mut registry = SourceRegistry::new();
        for (key, fid, ambient) in [
            ("level1", 1u64, "A1"),
            ("level2", 2, "B1"),
            ("level3", 3, "C1"),
        ] {
            let collection =
                FeatureCollection::from_geojson_str(&floor_payload(fid, ambient, 0.001, 0.002))
                    .expect("floor payload");
            registry.register(key, collection.clone()).expect("register");
            surface.add_source(key, collection).expect("add source");
        }

        let mut manager = FloorManager::new();
        manager
            .load(
                &mut surface,
                &registry,
                &["level1", "level2", "level3"],
                "level1",
                &FloorStyle::default(),
            )
            .expect("load floors");
        (manager, surface, registry)
    }

    #[derive(Default)]
    struct RecordingPanel {
        shown: Vec<DetailContent>,
        cleared: usize,
    }

    impl DetailPanel for RecordingPanel {
        fn show(&mut self, content: &DetailContent) {
            self.shown.push(content.clone());
        }

        fn clear(&mut self) {
            self.cleared += 1;
        }
    }

    fn clicked(ambient_id: Option<&str>) -> RenderedFeature {
        let mut properties = serde_json::Map::new();
        if let Some(id) = ambient_id {
            properties.insert(
                "ambient_id".to_string(),
                serde_json::Value::String(id.to_string()),
            );
        }
        RenderedFeature {
            id: Some(1),
            properties,
            position: None,
        }
    }

    fn record(id: &str, category: &str) -> AmbientRecord {
        AmbientRecord {
            ambient_id: id.to_string(),
            name: "Room 101".to_string(),
            description: "Networks lab".to_string(),
            category: category.to_string(),
        }
    }

    fn algorithms_in(ambient_id: &str) -> Assignment {
        Assignment {
            name: "Algorithms".to_string(),
            groups: vec![CourseGroup {
                ambient_id: ambient_id.to_string(),
                professor: Professor {
                    name: "P. Rivas".to_string(),
                },
                enrolled: 32,
                schedules: vec![ScheduleSlot {
                    day: 1,
                    from: "0800".to_string(),
                    to: "1000".to_string(),
                    kind: "T".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn exactly_one_floor_is_visible_after_any_switch_sequence() {
        let (mut manager, mut surface, _registry) = loaded_manager();
        assert_eq!(manager.visible_floor_ids(), vec!["level1"]);

        for target in ["level2", "level3", "level3", "level1", "level2"] {
            assert!(manager.switch_to(&mut surface, target).expect("switch"));
            assert_eq!(manager.visible_floor_ids(), vec![target]);
            assert_eq!(manager.active_floor(), Some(target));
            // Each floor renders three layers; only the active one's show.
            assert_eq!(surface.visible_layer_ids().len(), 3);
            assert!(
                surface
                    .visible_layer_ids()
                    .iter()
                    .all(|id| id.starts_with(target))
            );
        }
    }

    #[test]
    fn unknown_floor_is_a_reported_no_op() {
        let (mut manager, mut surface, _registry) = loaded_manager();
        manager.switch_to(&mut surface, "level2").expect("switch");

        assert!(!manager.switch_to(&mut surface, "basement").expect("switch"));
        assert_eq!(manager.visible_floor_ids(), vec!["level2"]);
        assert_eq!(manager.active_floor(), Some("level2"));
    }

    #[test]
    fn switching_before_load_is_an_error() {
        let mut surface = HeadlessSurface::new(
            Viewport::new(LngLat::new(0.0, 0.0), 0.001, 100.0, 100.0),
            18.0,
        );
        let mut manager = FloorManager::new();
        assert!(matches!(
            manager.switch_to(&mut surface, "level1"),
            Err(FloorError::NotLoaded)
        ));
    }

    #[test]
    fn loading_twice_is_an_error() {
        let (mut manager, mut surface, registry) = loaded_manager();
        let result = manager.load(
            &mut surface,
            &registry,
            &["level1"],
            "level1",
            &FloorStyle::default(),
        );
        assert!(matches!(result, Err(FloorError::AlreadyLoaded)));
    }

    #[test]
    fn load_rejects_an_initial_floor_outside_the_keys() {
        let (_, mut surface, registry) = loaded_manager();
        let mut manager = FloorManager::new();
        let result = manager.load(
            &mut surface,
            &registry,
            &["level1"],
            "level7",
            &FloorStyle::default(),
        );
        assert!(matches!(result, Err(FloorError::UnknownInitialFloor(_))));
    }

    #[test]
    fn each_floor_gets_a_hover_cache_on_its_fill_layer() {
        let (mut manager, _surface, _registry) = loaded_manager();
        assert_eq!(manager.fill_layer_id("level2"), Some("level2.fill"));
        let hover = manager.hover_for("level2").expect("hover cache");
        assert_eq!(hover.layer_id(), "level2.fill");
    }

    #[test]
    fn teaching_space_click_carries_formatted_schedules() {
        let (manager, _surface, _registry) = loaded_manager();
        let ambients = AmbientIndex::from_records(vec![record("A1", "laboratory")]);
        let assignments = vec![algorithms_in("A1"), algorithms_in("B9")];
        let mut panel = RecordingPanel::default();

        manager.handle_fill_click(&clicked(Some("A1")), &ambients, &assignments, &mut panel);

        assert_eq!(panel.shown.len(), 1);
        let content = &panel.shown[0];
        assert_eq!(content.name, "Room 101");
        assert_eq!(content.groups.len(), 1);
        assert_eq!(content.groups[0].course, "Algorithms");
        assert_eq!(content.groups[0].professor, "P. Rivas");
        assert_eq!(
            content.groups[0].schedule,
            vec!["Monday Lecture 08:00 - 10:00".to_string()]
        );
    }

    #[test]
    fn non_teaching_click_shows_an_empty_group_list() {
        let (manager, _surface, _registry) = loaded_manager();
        let ambients = AmbientIndex::from_records(vec![record("A1", "office")]);
        let assignments = vec![algorithms_in("A1")];
        let mut panel = RecordingPanel::default();

        manager.handle_fill_click(&clicked(Some("A1")), &ambients, &assignments, &mut panel);

        assert_eq!(panel.shown.len(), 1);
        assert!(panel.shown[0].groups.is_empty());
    }

    #[test]
    fn unmatched_click_clears_the_panel() {
        let (manager, _surface, _registry) = loaded_manager();
        let ambients = AmbientIndex::from_records(vec![record("A1", "laboratory")]);
        let mut panel = RecordingPanel::default();

        manager.handle_fill_click(&clicked(Some("Z9")), &ambients, &[], &mut panel);
        manager.handle_fill_click(&clicked(None), &ambients, &[], &mut panel);

        assert!(panel.shown.is_empty());
        assert_eq!(panel.cleared, 2);
    }

    #[test]
    fn fly_to_ambient_switches_floor_and_moves_the_camera() {
        let (mut manager, mut surface, registry) = loaded_manager();

        let found = manager
            .fly_to_ambient(&mut surface, &registry, "B1")
            .expect("fly");
        assert!(found);
        assert_eq!(manager.active_floor(), Some("level2"));
        let camera = surface.camera();
        assert_eq!(camera.center, LngLat::new(0.001, 0.002));
        assert_eq!(camera.zoom, super::AMBIENT_FOCUS_ZOOM);

        let missing = manager
            .fly_to_ambient(&mut surface, &registry, "nope")
            .expect("fly");
        assert!(!missing);
        assert_eq!(manager.active_floor(), Some("level2"));
    }
}
