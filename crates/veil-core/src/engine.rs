use compact_str::CompactString;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::OcclusionSettings;
use crate::error::OcclusionError;
use crate::geometry::Rect;
use crate::model::Client;
use crate::query::{CompositorQuery, UNKNOWN_WORKSPACE};
use crate::region::RegionSpec;
use crate::resolver::RegionResolver;

/// Rule that decided a region is covered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cover {
    /// A window fills the reference monitor and the region hugs its top
    Fullscreen,
    /// A window rectangle intersects the region
    Overlap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Occlusion {
    Occluded {
        cover: Cover,
        /// Address of the first covering window
        address: CompactString,
    },
    Clear,
}

impl Occlusion {
    pub fn is_occluded(&self) -> bool {
        matches!(self, Self::Occluded { .. })
    }
}

/// Decides whether shell regions are covered by application windows
///
/// Every check fetches a fresh compositor snapshot; the engine itself holds
/// no mutable state and can be shared between tasks.
pub struct OcclusionEngine<Q> {
    query: Q,
    resolver: RegionResolver,
    fullscreen_tolerance: i32,
}

impl<Q: CompositorQuery> OcclusionEngine<Q> {
    pub fn new(query: Q, settings: &OcclusionSettings) -> Self {
        Self {
            query,
            resolver: RegionResolver::from_settings(settings),
            fullscreen_tolerance: settings.fullscreen_tolerance,
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Whether any mapped window on `workspace` covers `region`
    ///
    /// `workspace` defaults to the active workspace. With `monitor_id`, only
    /// windows overlapping that monitor are considered. Never fails: when the
    /// answer cannot be determined the region is reported as uncovered.
    pub async fn check(
        &self,
        region: &RegionSpec,
        workspace: Option<i32>,
        monitor_id: Option<i32>,
    ) -> bool {
        match self.evaluate(region, workspace, monitor_id).await {
            Ok(occlusion) => occlusion.is_occluded(),
            Err(e) => {
                warn!("Occlusion check for {} failed, assuming clear: {}", region, e);
                false
            }
        }
    }

    /// Like [`check`](Self::check), but reports which rule fired and why a
    /// verdict could not be reached
    pub async fn evaluate(
        &self,
        region: &RegionSpec,
        workspace: Option<i32>,
        monitor_id: Option<i32>,
    ) -> Result<Occlusion, OcclusionError> {
        let monitors = self.query.monitors().await.unwrap_or_else(|e| {
            warn!("Failed to query monitors: {}", e);
            Vec::new()
        });

        // The active workspace is needed to default `workspace` and to size
        // the global geometry when no monitor is targeted
        let targeted = RegionResolver::find_monitor(&monitors, monitor_id).is_some();
        let active = if workspace.is_none() || !targeted {
            Some(self.active_workspace().await)
        } else {
            None
        };
        let workspace = workspace.or(active).unwrap_or(UNKNOWN_WORKSPACE);

        let reference = self.resolver.reference(&monitors, monitor_id, active);
        let area = self.resolver.resolve(region, &reference.rect)?;
        debug!(
            "Checking {} as {} on workspace {} against {}",
            region, area, workspace, reference.rect
        );

        let clients = self.query.clients().await?;

        Ok(find_cover(
            &clients,
            &area,
            &reference.rect,
            workspace,
            monitor_id.is_some(),
            self.fullscreen_tolerance,
        ))
    }

    async fn active_workspace(&self) -> i32 {
        self.query.active_workspace().await.unwrap_or_else(|e| {
            warn!("Failed to query active workspace: {}", e);
            UNKNOWN_WORKSPACE
        })
    }
}

/// Scan `clients` for the first mapped window on `workspace` covering `area`
///
/// With `on_reference_only`, windows whose extent does not overlap
/// `reference` are ignored.
pub fn find_cover(
    clients: &[Client],
    area: &Rect,
    reference: &Rect,
    workspace: i32,
    on_reference_only: bool,
    fullscreen_tolerance: i32,
) -> Occlusion {
    if area.is_empty() {
        return Occlusion::Clear;
    }

    let top_aligned = area.y == reference.y;

    for client in clients {
        if !client.mapped || client.workspace_id != workspace {
            continue;
        }

        let window = client.rect();
        if on_reference_only && !window.intersects(reference) {
            continue;
        }

        if top_aligned && window.covers(reference, fullscreen_tolerance) {
            debug!("Fullscreen window {} ({}) covers {}", client.address, client.class, area);
            return Occlusion::Occluded {
                cover: Cover::Fullscreen,
                address: client.address.clone(),
            };
        }

        if window.intersects(area) {
            debug!("Window {} ({}) at {} overlaps {}", client.address, client.class, window, area);
            return Occlusion::Occluded {
                cover: Cover::Overlap,
                address: client.address.clone(),
            };
        }
    }

    Occlusion::Clear
}
