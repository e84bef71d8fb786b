use async_channel::Sender;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::OcclusionEngine;
use crate::query::CompositorQuery;
use crate::region::RegionSpec;

/// A shell surface whose region should be watched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedRegion {
    pub name: CompactString,
    pub region: RegionSpec,
    #[serde(default)]
    pub monitor_id: Option<i32>,
    /// Pin to a workspace instead of following the active one
    #[serde(default)]
    pub workspace: Option<i32>,
}

/// Events FROM the watcher TO the surfaces it drives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcclusionEvent {
    /// A region became covered (hide) or uncovered (reveal)
    Changed { name: CompactString, occluded: bool },
}

/// Polls the engine and reports occlusion transitions, driving auto-hide
pub struct OcclusionWatcher<Q> {
    engine: Arc<OcclusionEngine<Q>>,
    regions: Vec<WatchedRegion>,
    interval: Duration,
    event_tx: Sender<OcclusionEvent>,
}

impl<Q: CompositorQuery> OcclusionWatcher<Q> {
    pub fn new(
        engine: Arc<OcclusionEngine<Q>>,
        regions: Vec<WatchedRegion>,
        interval: Duration,
        event_tx: Sender<OcclusionEvent>,
    ) -> Self {
        Self {
            engine,
            regions,
            interval,
            event_tx,
        }
    }

    /// Run the watcher until the event receiver is dropped
    ///
    /// The first poll reports every region; later polls only report changes.
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            "Starting occlusion watcher for {} regions every {:?}",
            self.regions.len(),
            self.interval
        );

        let mut states: Vec<Option<bool>> = vec![None; self.regions.len()];
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if self.event_tx.is_closed() {
                break;
            }

            for (watched, last) in self.regions.iter().zip(states.iter_mut()) {
                let occluded = self
                    .engine
                    .check(&watched.region, watched.workspace, watched.monitor_id)
                    .await;

                if *last == Some(occluded) {
                    continue;
                }
                *last = Some(occluded);

                debug!("Region '{}' occluded: {}", watched.name, occluded);
                let event = OcclusionEvent::Changed {
                    name: watched.name.clone(),
                    occluded,
                };
                if self.event_tx.send(event).await.is_err() {
                    break;
                }
            }
        }

        info!("Occlusion event receiver closed, stopping watcher");
        Ok(())
    }
}
