use tracing::debug;

use crate::config::OcclusionSettings;
use crate::geometry::Rect;
use crate::model::Monitor;
use crate::region::{Edge, InvalidRegionError, RegionSpec};

/// Geometry that edge regions are resolved against and fullscreen windows
/// are measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub rect: Rect,
    /// Set when the geometry came from an explicitly targeted monitor
    pub monitor_id: Option<i32>,
}

impl Reference {
    pub fn is_monitor(&self) -> bool {
        self.monitor_id.is_some()
    }
}

/// Turns region specs into absolute rectangles
#[derive(Debug, Clone)]
pub struct RegionResolver {
    fallback: Rect,
}

impl RegionResolver {
    /// `fallback` supplies the size used when no monitor is known
    pub fn new(fallback: Rect) -> Self {
        Self { fallback }
    }

    pub fn from_settings(settings: &OcclusionSettings) -> Self {
        Self::new(settings.fallback_rect())
    }

    /// First monitor with the given id
    pub fn find_monitor(monitors: &[Monitor], monitor_id: Option<i32>) -> Option<&Monitor> {
        let id = monitor_id?;
        monitors.iter().find(|m| m.id == id)
    }

    /// Whole-screen geometry anchored at the origin, sized like the monitor
    /// showing `active_workspace`, else the first monitor, else the fallback
    pub fn global(&self, monitors: &[Monitor], active_workspace: Option<i32>) -> Rect {
        let monitor = active_workspace
            .and_then(|ws| monitors.iter().find(|m| m.active_workspace_id == Some(ws)))
            .or_else(|| monitors.first());

        match monitor {
            Some(m) => Rect::new(0, 0, m.width, m.height),
            None => {
                debug!("No monitors known, using fallback size {}", self.fallback);
                Rect::new(0, 0, self.fallback.width, self.fallback.height)
            }
        }
    }

    /// Reference geometry for `monitor_id`, or the global geometry when the
    /// id is absent or unknown
    pub fn reference(
        &self,
        monitors: &[Monitor],
        monitor_id: Option<i32>,
        active_workspace: Option<i32>,
    ) -> Reference {
        if let Some(monitor) = Self::find_monitor(monitors, monitor_id) {
            return Reference {
                rect: monitor.rect(),
                monitor_id: Some(monitor.id),
            };
        }

        if let Some(id) = monitor_id {
            debug!("Monitor {} not found, using global geometry", id);
        }

        Reference {
            rect: self.global(monitors, active_workspace),
            monitor_id: None,
        }
    }

    /// Resolve `spec` against `reference`. Absolute specs pass through.
    pub fn resolve(&self, spec: &RegionSpec, reference: &Rect) -> Result<Rect, InvalidRegionError> {
        spec.validate()?;

        let rect = match *spec {
            RegionSpec::Absolute(rect) => rect,
            RegionSpec::Edge { side, thickness } => {
                let Rect {
                    x,
                    y,
                    width,
                    height,
                } = *reference;

                match side {
                    Edge::Top => Rect::new(x, y, width, thickness),
                    Edge::Bottom => Rect::new(
                        x,
                        y.saturating_add(height).saturating_sub(thickness),
                        width,
                        thickness,
                    ),
                    Edge::Left => Rect::new(x, y, thickness, height),
                    Edge::Right => Rect::new(
                        x.saturating_add(width).saturating_sub(thickness),
                        y,
                        thickness,
                        height,
                    ),
                }
            }
        };

        Ok(rect)
    }
}

impl Default for RegionResolver {
    fn default() -> Self {
        Self::from_settings(&OcclusionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::testing::monitor;

    fn dual_head() -> Vec<Monitor> {
        vec![
            monitor(0, 0, 0, 1920, 1080, 1),
            monitor(1, 1920, 0, 2560, 1440, 4),
        ]
    }

    #[test]
    fn test_top_edge_on_primary() {
        let resolver = RegionResolver::default();
        let reference = resolver.reference(&dual_head(), Some(0), None);
        let rect = resolver
            .resolve(&RegionSpec::edge(Edge::Top, 34), &reference.rect)
            .unwrap();
        assert_eq!(rect, Rect::new(0, 0, 1920, 34));
        assert_eq!(reference.monitor_id, Some(0));
    }

    #[test]
    fn test_edges_on_offset_monitor() {
        let resolver = RegionResolver::default();
        let reference = resolver.reference(&dual_head(), Some(1), None).rect;

        let resolve = |side| resolver.resolve(&RegionSpec::edge(side, 40), &reference).unwrap();
        assert_eq!(resolve(Edge::Top), Rect::new(1920, 0, 2560, 40));
        assert_eq!(resolve(Edge::Bottom), Rect::new(1920, 1400, 2560, 40));
        assert_eq!(resolve(Edge::Left), Rect::new(1920, 0, 40, 1440));
        assert_eq!(resolve(Edge::Right), Rect::new(4440, 0, 40, 1440));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = RegionResolver::default();
        let reference = resolver.reference(&dual_head(), Some(1), None).rect;
        let spec = RegionSpec::edge(Edge::Right, 12);
        assert_eq!(
            resolver.resolve(&spec, &reference),
            resolver.resolve(&spec, &reference)
        );
    }

    #[test]
    fn test_huge_thickness_saturates() {
        let resolver = RegionResolver::default();
        let reference = Rect::new(-3840, -2160, 1920, 1080);

        let right = resolver
            .resolve(&RegionSpec::edge(Edge::Right, i32::MAX), &reference)
            .unwrap();
        assert_eq!(right, Rect::new(i32::MIN, -2160, i32::MAX, 1080));

        let bottom = resolver
            .resolve(&RegionSpec::edge(Edge::Bottom, i32::MAX), &reference)
            .unwrap();
        assert_eq!(bottom, Rect::new(-3840, i32::MIN, 1920, i32::MAX));
    }

    #[test]
    fn test_absolute_passes_through() {
        let resolver = RegionResolver::default();
        let spec = RegionSpec::absolute(5, 6, 7, 8);
        let rect = resolver.resolve(&spec, &Rect::new(100, 100, 10, 10)).unwrap();
        assert_eq!(rect, Rect::new(5, 6, 7, 8));
    }

    #[test]
    fn test_negative_sizes_are_invalid() {
        let resolver = RegionResolver::default();
        let reference = Rect::new(0, 0, 1920, 1080);
        assert_eq!(
            resolver.resolve(&RegionSpec::edge(Edge::Top, -1), &reference),
            Err(InvalidRegionError::NegativeThickness(-1))
        );
        assert!(resolver
            .resolve(&RegionSpec::absolute(0, 0, 10, -10), &reference)
            .is_err());
    }

    #[test]
    fn test_global_uses_active_workspace_monitor_at_origin() {
        let resolver = RegionResolver::default();
        let reference = resolver.reference(&dual_head(), None, Some(4));
        assert_eq!(reference.rect, Rect::new(0, 0, 2560, 1440));
        assert!(!reference.is_monitor());
    }

    #[test]
    fn test_global_falls_back_to_first_monitor() {
        let resolver = RegionResolver::default();
        assert_eq!(
            resolver.global(&dual_head(), Some(9)),
            Rect::new(0, 0, 1920, 1080)
        );
        assert_eq!(resolver.global(&dual_head(), None), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_global_without_monitors_uses_fallback() {
        let resolver = RegionResolver::new(Rect::new(0, 0, 1366, 768));
        assert_eq!(resolver.global(&[], Some(1)), Rect::new(0, 0, 1366, 768));
    }

    #[test]
    fn test_unknown_monitor_uses_global() {
        let resolver = RegionResolver::default();
        let reference = resolver.reference(&dual_head(), Some(7), Some(4));
        assert_eq!(reference.rect, Rect::new(0, 0, 2560, 1440));
        assert_eq!(reference.monitor_id, None);
    }
}
