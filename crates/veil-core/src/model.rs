use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Rect;

/// A display as reported by `hyprctl -j monitors`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Monitor {
    pub id: i32,
    pub name: CompactString,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub active_workspace_id: Option<i32>,
}

impl Monitor {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A window as reported by `hyprctl -j clients`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub address: CompactString,
    pub class: CompactString,
    pub workspace_id: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub mapped: bool,
}

impl Client {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Deserialize)]
struct WorkspaceRef {
    id: Option<i32>,
}

#[derive(Deserialize)]
struct RawMonitor {
    id: i32,
    #[serde(default)]
    name: CompactString,
    width: i32,
    height: i32,
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    #[serde(rename = "activeWorkspace", default)]
    active_workspace: Option<WorkspaceRef>,
}

impl From<RawMonitor> for Monitor {
    fn from(raw: RawMonitor) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            active_workspace_id: raw.active_workspace.and_then(|ws| ws.id),
        }
    }
}

#[derive(Deserialize)]
struct RawClient {
    #[serde(default)]
    address: CompactString,
    #[serde(default)]
    class: CompactString,
    #[serde(default)]
    mapped: bool,
    workspace: WorkspaceRef,
    at: [i32; 2],
    size: [i32; 2],
}

impl TryFrom<RawClient> for Client {
    type Error = &'static str;

    fn try_from(raw: RawClient) -> Result<Self, Self::Error> {
        let workspace_id = raw.workspace.id.ok_or("workspace has no id")?;

        Ok(Self {
            address: raw.address,
            class: raw.class,
            workspace_id,
            x: raw.at[0],
            y: raw.at[1],
            width: raw.size[0],
            height: raw.size[1],
            mapped: raw.mapped,
        })
    }
}

/// Decode a JSON array of monitors. Records missing an id or size are skipped.
pub fn parse_monitors(json: &str) -> Result<Vec<Monitor>, serde_json::Error> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let monitors = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawMonitor>(value) {
            Ok(raw) => Some(Monitor::from(raw)),
            Err(e) => {
                debug!("Skipping malformed monitor record #{}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(monitors)
}

/// Decode a JSON array of clients. Records missing workspace, position or
/// size are skipped.
pub fn parse_clients(json: &str) -> Result<Vec<Client>, serde_json::Error> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let clients = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let parsed = serde_json::from_value::<RawClient>(value)
                .map_err(|e| e.to_string())
                .and_then(|raw| Client::try_from(raw).map_err(str::to_string));

            match parsed {
                Ok(client) => Some(client),
                Err(e) => {
                    debug!("Skipping malformed client record #{}: {}", index, e);
                    None
                }
            }
        })
        .collect();

    Ok(clients)
}

/// Extract the workspace id from `hyprctl activeworkspace` text output,
/// e.g. `workspace ID 3 (3) on monitor DP-1:`
pub fn parse_active_workspace(text: &str) -> Option<i32> {
    let mut tokens = text.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "ID" {
            return tokens.next().and_then(|id| id.parse().ok());
        }
    }
    None
}
