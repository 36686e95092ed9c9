//! Coordinate-system resolution for newly added layers.
//!
//! When a layer joins the map its coordinate system is reconciled with the
//! map's through a mode-governed flow: an undefined layer may be assigned
//! the working coordinate system, and a mismatched layer may be
//! reprojected to the map's. Both decisions run through an
//! escalating-consent state machine so a "do this always" answer converts
//! the ask-every-time mode into a standing decision for the rest of the
//! session.
//!
//! Reprojection itself is delegated through [`ProjectionService`]; the
//! engine only orchestrates when it happens.

use cartoframe_core::{CrsDescriptor, ProjectionError, ProjectionEvent};
use tracing::{debug, warn};

use crate::layer::MapLayer;

/// Consent mode for an automatic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionMode {
    /// Perform the action without asking.
    Always,
    /// Never perform the action, without asking.
    Never,
    /// Ask every time.
    #[default]
    Prompt,
    /// Ask once; the first answer becomes the standing mode.
    PromptOnce,
}

/// Answer returned by a projection prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Proceed this time.
    Yes,
    /// Skip this time.
    No,
    /// Proceed now and from now on.
    AlwaysYes,
    /// Skip now and from now on.
    AlwaysNo,
}

/// The two consent modes governing on-add projection handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReprojectionPolicy {
    /// Governs assigning a coordinate system to an undefined layer.
    pub define_mode: ActionMode,
    /// Governs reprojecting a mismatched layer to the map's system.
    pub reproject_mode: ActionMode,
}

impl ReprojectionPolicy {
    /// Applies an answer to a mode and returns whether to proceed.
    ///
    /// `AlwaysYes`/`AlwaysNo` upgrade any prompting mode to a standing
    /// decision; a plain answer upgrades only `PromptOnce`.
    fn escalate(mode: &mut ActionMode, answer: PromptAnswer) -> bool {
        match answer {
            PromptAnswer::Yes => {
                if *mode == ActionMode::PromptOnce {
                    *mode = ActionMode::Always;
                }
                true
            }
            PromptAnswer::No => {
                if *mode == ActionMode::PromptOnce {
                    *mode = ActionMode::Never;
                }
                false
            }
            PromptAnswer::AlwaysYes => {
                *mode = ActionMode::Always;
                true
            }
            PromptAnswer::AlwaysNo => {
                *mode = ActionMode::Never;
                false
            }
        }
    }
}

/// Compares and converts coordinate systems.
///
/// The engine carries descriptors opaquely; hosts plug in a real
/// projection library through this trait.
pub trait ProjectionService {
    /// Whether two descriptors denote the same coordinate system.
    fn same(&self, a: &CrsDescriptor, b: &CrsDescriptor) -> bool;

    /// Reprojects a layer's geometry in place to `target`.
    fn reproject(
        &self,
        layer: &mut MapLayer,
        target: &CrsDescriptor,
    ) -> Result<(), ProjectionError>;
}

/// Service that compares descriptors textually and "reprojects" by
/// retagging the layer without touching geometry. Suitable for maps whose
/// data already shares one system.
#[derive(Debug, Default)]
pub struct PassthroughProjection;

impl ProjectionService for PassthroughProjection {
    fn same(&self, a: &CrsDescriptor, b: &CrsDescriptor) -> bool {
        a == b
    }

    fn reproject(
        &self,
        layer: &mut MapLayer,
        target: &CrsDescriptor,
    ) -> Result<(), ProjectionError> {
        layer.crs = Some(target.clone());
        Ok(())
    }
}

/// Asks the user the two on-add projection questions.
pub trait ProjectionPrompt {
    /// Should `layer` be assigned `proposed` as its coordinate system?
    fn ask_define(&mut self, layer: &str, proposed: &CrsDescriptor) -> PromptAnswer;

    /// Should `layer` be reprojected from `from` to `to`?
    fn ask_reproject(&mut self, layer: &str, from: &CrsDescriptor, to: &CrsDescriptor)
        -> PromptAnswer;
}

/// Prompt for headless use: declines everything.
#[derive(Debug, Default)]
pub struct SilentPrompt;

impl ProjectionPrompt for SilentPrompt {
    fn ask_define(&mut self, _layer: &str, _proposed: &CrsDescriptor) -> PromptAnswer {
        PromptAnswer::No
    }

    fn ask_reproject(
        &mut self,
        _layer: &str,
        _from: &CrsDescriptor,
        _to: &CrsDescriptor,
    ) -> PromptAnswer {
        PromptAnswer::No
    }
}

/// Resolves a newly added layer's coordinate system against the map's.
///
/// `existing_layers` counts the layers already in the map before this one.
/// The first layer to bring a defined system sets the map's; from then on
/// the map's system is authoritative and a mismatched layer is converted,
/// subject to the policy.
///
/// A failed reprojection is logged and the layer kept in its original
/// system; the add itself never fails. Returns the projection events the
/// resolution produced, in order.
pub fn resolve_on_add(
    policy: &mut ReprojectionPolicy,
    map_crs: &mut Option<CrsDescriptor>,
    session_crs: &mut Option<CrsDescriptor>,
    existing_layers: usize,
    layer: &mut MapLayer,
    svc: &dyn ProjectionService,
    prompt: &mut dyn ProjectionPrompt,
) -> Vec<ProjectionEvent> {
    let mut events = Vec::new();

    if layer.crs.is_none() {
        // An undefined layer can be assigned the working system: the
        // session's last assignment wins over the map's.
        if let Some(proposed) = session_crs.clone().or_else(|| map_crs.clone()) {
            let proceed = match policy.define_mode {
                ActionMode::Always => true,
                ActionMode::Never => false,
                ActionMode::Prompt | ActionMode::PromptOnce => {
                    let answer = prompt.ask_define(&layer.name, &proposed);
                    ReprojectionPolicy::escalate(&mut policy.define_mode, answer)
                }
            };
            if proceed {
                debug!("Assigning {} to undefined layer {}", proposed, layer.name);
                layer.crs = Some(proposed.clone());
                *session_crs = Some(proposed.clone());
                events.push(ProjectionEvent::Assigned {
                    id: layer.id,
                    crs: proposed,
                });
            } else {
                events.push(ProjectionEvent::Declined { id: layer.id });
            }
        }
    }

    let Some(layer_crs) = layer.crs.clone() else {
        // Still undefined: the layer draws in its native coordinates.
        return events;
    };

    match map_crs.as_ref() {
        None => {
            // First defined system seen becomes the map's.
            debug!("Map adopts {} from layer {}", layer_crs, layer.name);
            *map_crs = Some(layer_crs.clone());
            events.push(ProjectionEvent::Adopted { crs: layer_crs });
        }
        Some(mcrs) if svc.same(mcrs, &layer_crs) => {}
        Some(mcrs) => {
            if existing_layers == 0 {
                // No layer is left to disagree with: a stale map system
                // yields to the incoming layer.
                debug!("Map adopts {} over {} (empty map)", layer_crs, mcrs);
                *map_crs = Some(layer_crs.clone());
                events.push(ProjectionEvent::Adopted { crs: layer_crs });
                return events;
            }
            let mcrs = mcrs.clone();
            let proceed = match policy.reproject_mode {
                ActionMode::Always => true,
                ActionMode::Never => false,
                ActionMode::Prompt | ActionMode::PromptOnce => {
                    let answer = prompt.ask_reproject(&layer.name, &layer_crs, &mcrs);
                    ReprojectionPolicy::escalate(&mut policy.reproject_mode, answer)
                }
            };
            if proceed {
                match svc.reproject(layer, &mcrs) {
                    Ok(()) => events.push(ProjectionEvent::Reprojected {
                        id: layer.id,
                        from: layer_crs,
                        to: mcrs,
                    }),
                    Err(e) => {
                        // Keep the layer in its original system.
                        warn!("Reprojection of layer {} failed: {}", layer.name, e);
                    }
                }
            } else {
                events.push(ProjectionEvent::Declined { id: layer.id });
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::PointFeature;

    fn crs(s: &str) -> CrsDescriptor {
        CrsDescriptor(s.to_string())
    }

    fn layer_with(crs_tag: Option<&str>) -> MapLayer {
        let mut layer = MapLayer::points("roads", vec![PointFeature::new(0.0, 0.0)]);
        layer.id = 7;
        layer.crs = crs_tag.map(crs);
        layer
    }

    struct ScriptedPrompt {
        answer: PromptAnswer,
        asks: usize,
    }

    impl ScriptedPrompt {
        fn new(answer: PromptAnswer) -> Self {
            Self { answer, asks: 0 }
        }
    }

    impl ProjectionPrompt for ScriptedPrompt {
        fn ask_define(&mut self, _layer: &str, _proposed: &CrsDescriptor) -> PromptAnswer {
            self.asks += 1;
            self.answer
        }
        fn ask_reproject(
            &mut self,
            _layer: &str,
            _from: &CrsDescriptor,
            _to: &CrsDescriptor,
        ) -> PromptAnswer {
            self.asks += 1;
            self.answer
        }
    }

    #[test]
    fn test_first_layer_defines_map_projection() {
        let mut policy = ReprojectionPolicy::default();
        let mut map_crs = None;
        let mut session_crs = None;
        let mut layer = layer_with(Some("EPSG:4326"));

        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            0,
            &mut layer,
            &PassthroughProjection,
            &mut SilentPrompt,
        );
        assert_eq!(map_crs, Some(crs("EPSG:4326")));
        assert!(matches!(events.as_slice(), [ProjectionEvent::Adopted { .. }]));
    }

    #[test]
    fn test_emptied_map_adopts_incoming() {
        // All layers were removed but the map kept a system: the next layer
        // replaces it instead of being converted to it.
        let mut policy = ReprojectionPolicy::default();
        let mut map_crs = Some(crs("EPSG:4326"));
        let mut session_crs = None;
        let mut layer = layer_with(Some("EPSG:3857"));

        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            0,
            &mut layer,
            &PassthroughProjection,
            &mut SilentPrompt,
        );
        assert_eq!(map_crs, Some(crs("EPSG:3857")));
        assert_eq!(layer.crs, Some(crs("EPSG:3857")));
        assert!(matches!(events.as_slice(), [ProjectionEvent::Adopted { .. }]));
    }

    #[test]
    fn test_second_layer_is_reprojected_not_adopted() {
        let mut policy = ReprojectionPolicy {
            reproject_mode: ActionMode::Always,
            ..Default::default()
        };
        let mut map_crs = Some(crs("EPSG:4326"));
        let mut session_crs = None;
        let mut layer = layer_with(Some("EPSG:3857"));

        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            1,
            &mut layer,
            &PassthroughProjection,
            &mut SilentPrompt,
        );
        // The first layer's system stays authoritative.
        assert_eq!(map_crs, Some(crs("EPSG:4326")));
        assert_eq!(layer.crs, Some(crs("EPSG:4326")));
        assert!(matches!(
            events.as_slice(),
            [ProjectionEvent::Reprojected { .. }]
        ));
    }

    #[test]
    fn test_mismatch_reprojects_when_always() {
        let mut policy = ReprojectionPolicy {
            reproject_mode: ActionMode::Always,
            ..Default::default()
        };
        let mut map_crs = Some(crs("EPSG:4326"));
        let mut session_crs = None;
        let mut layer = layer_with(Some("EPSG:3857"));

        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            5,
            &mut layer,
            &PassthroughProjection,
            &mut SilentPrompt,
        );
        assert_eq!(layer.crs, Some(crs("EPSG:4326")), "layer was converted");
        assert!(matches!(
            events.as_slice(),
            [ProjectionEvent::Reprojected { .. }]
        ));
    }

    #[test]
    fn test_prompt_once_escalates_to_always() {
        let mut policy = ReprojectionPolicy {
            reproject_mode: ActionMode::PromptOnce,
            ..Default::default()
        };
        let mut map_crs = Some(crs("EPSG:4326"));
        let mut session_crs = None;
        let mut prompt = ScriptedPrompt::new(PromptAnswer::Yes);

        let mut first = layer_with(Some("EPSG:3857"));
        resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            5,
            &mut first,
            &PassthroughProjection,
            &mut prompt,
        );
        assert_eq!(policy.reproject_mode, ActionMode::Always);

        // The second mismatch proceeds without asking again.
        let mut second = layer_with(Some("EPSG:3857"));
        resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            6,
            &mut second,
            &PassthroughProjection,
            &mut prompt,
        );
        assert_eq!(prompt.asks, 1);
        assert_eq!(second.crs, Some(crs("EPSG:4326")));
    }

    #[test]
    fn test_always_no_answer_locks_out_reprojection() {
        let mut policy = ReprojectionPolicy::default();
        let mut map_crs = Some(crs("EPSG:4326"));
        let mut session_crs = None;
        let mut prompt = ScriptedPrompt::new(PromptAnswer::AlwaysNo);

        let mut layer = layer_with(Some("EPSG:3857"));
        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            5,
            &mut layer,
            &PassthroughProjection,
            &mut prompt,
        );
        assert_eq!(policy.reproject_mode, ActionMode::Never);
        assert_eq!(layer.crs, Some(crs("EPSG:3857")), "layer kept as-is");
        assert!(matches!(events.as_slice(), [ProjectionEvent::Declined { .. }]));
    }

    #[test]
    fn test_undefined_layer_assigned_session_crs() {
        let mut policy = ReprojectionPolicy {
            define_mode: ActionMode::Always,
            ..Default::default()
        };
        let mut map_crs = Some(crs("EPSG:4326"));
        let mut session_crs = None;
        let mut layer = layer_with(None);

        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            3,
            &mut layer,
            &PassthroughProjection,
            &mut SilentPrompt,
        );
        assert_eq!(layer.crs, Some(crs("EPSG:4326")));
        assert_eq!(session_crs, Some(crs("EPSG:4326")));
        assert!(matches!(
            events.as_slice(),
            [ProjectionEvent::Assigned { .. }]
        ));
    }

    #[test]
    fn test_undefined_layer_with_no_working_crs_stays_undefined() {
        let mut policy = ReprojectionPolicy::default();
        let mut map_crs = None;
        let mut session_crs = None;
        let mut layer = layer_with(None);

        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            0,
            &mut layer,
            &PassthroughProjection,
            &mut SilentPrompt,
        );
        assert!(layer.crs.is_none());
        assert!(map_crs.is_none());
        assert!(events.is_empty());
    }

    struct FailingService;
    impl ProjectionService for FailingService {
        fn same(&self, a: &CrsDescriptor, b: &CrsDescriptor) -> bool {
            a == b
        }
        fn reproject(
            &self,
            layer: &mut MapLayer,
            _target: &CrsDescriptor,
        ) -> Result<(), ProjectionError> {
            Err(ProjectionError::ReprojectFailed {
                layer: layer.name.clone(),
                reason: "no transform available".into(),
            })
        }
    }

    #[test]
    fn test_failed_reprojection_keeps_layer() {
        let mut policy = ReprojectionPolicy {
            reproject_mode: ActionMode::Always,
            ..Default::default()
        };
        let mut map_crs = Some(crs("EPSG:4326"));
        let mut session_crs = None;
        let mut layer = layer_with(Some("EPSG:3857"));

        let events = resolve_on_add(
            &mut policy,
            &mut map_crs,
            &mut session_crs,
            5,
            &mut layer,
            &FailingService,
            &mut SilentPrompt,
        );
        assert_eq!(layer.crs, Some(crs("EPSG:3857")));
        assert!(events.is_empty(), "failure produces no event");
    }
}
