use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use veil_core::{
    CachedQuery, CompositorQuery, Hyprctl, OcclusionEngine, OcclusionEvent, OcclusionSettings,
    OcclusionWatcher, RegionSpec, WatchedRegion,
};

type Engine = OcclusionEngine<CachedQuery<Hyprctl>>;

fn build_engine(settings: &OcclusionSettings) -> Engine {
    let query = CachedQuery::new(Hyprctl::from_settings(settings), settings.cache_ttl());
    OcclusionEngine::new(query, settings)
}

/// Run one check and report it. Returns whether the region is occluded.
pub async fn check(
    settings: &OcclusionSettings,
    region: RegionSpec,
    workspace: Option<i32>,
    monitor: Option<i32>,
    explain: bool,
) -> anyhow::Result<bool> {
    let engine = build_engine(settings);

    if !explain {
        let occluded = engine.check(&region, workspace, monitor).await;
        println!("{}", if occluded { "occluded" } else { "clear" });
        return Ok(occluded);
    }

    let occluded = match engine.evaluate(&region, workspace, monitor).await {
        Ok(occlusion) => {
            println!("{}", serde_json::to_string_pretty(&occlusion)?);
            occlusion.is_occluded()
        }
        Err(e) => {
            let report = serde_json::json!({
                "state": "unknown",
                "error": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            false
        }
    };

    Ok(occluded)
}

/// Print a line whenever a watched region changes state. Runs until killed.
pub async fn watch(
    settings: &OcclusionSettings,
    regions: Vec<RegionSpec>,
    monitor: Option<i32>,
    interval_ms: Option<u64>,
) -> anyhow::Result<()> {
    let engine = Arc::new(build_engine(settings));
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.poll_interval());

    let watched = regions
        .into_iter()
        .map(|region| WatchedRegion {
            name: region.to_string().into(),
            region,
            monitor_id: monitor,
            workspace: None,
        })
        .collect();

    let (event_tx, event_rx) = async_channel::bounded::<OcclusionEvent>(64);
    let watcher = OcclusionWatcher::new(engine, watched, interval, event_tx);
    let handle = tokio::spawn(watcher.run());

    while let Ok(event) = event_rx.recv().await {
        match event {
            OcclusionEvent::Changed { name, occluded } => {
                println!("{} {}", name, if occluded { "occluded" } else { "clear" });
            }
        }
    }

    handle.await??;
    Ok(())
}

/// Print the active workspace, monitors and clients as JSON
pub async fn snapshot(settings: &OcclusionSettings) -> anyhow::Result<()> {
    let hyprctl = Hyprctl::from_settings(settings);

    let active_workspace = match hyprctl.active_workspace().await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };
    let monitors = hyprctl.monitors().await.unwrap_or_else(|e| {
        warn!("{}", e);
        Vec::new()
    });
    let clients = hyprctl.clients().await.unwrap_or_else(|e| {
        warn!("{}", e);
        Vec::new()
    });

    info!(
        "Snapshot: {} monitors, {} clients",
        monitors.len(),
        clients.len()
    );

    let report = serde_json::json!({
        "active_workspace": active_workspace,
        "monitors": monitors,
        "clients": clients,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
