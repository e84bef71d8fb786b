use compact_str::CompactString;
use parking_lot::Mutex;
use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::OcclusionSettings;
use crate::model::{self, Client, Monitor};

/// Workspace id used when the active workspace cannot be determined
pub const UNKNOWN_WORKSPACE: i32 = -1;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("'{command}' exited with {status}: {stderr}")]
    Status {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("unexpected output from '{command}': {reason}")]
    Parse { command: String, reason: String },
}

/// Read-only view of live compositor state
///
/// Every call reflects the state at invocation time.
pub trait CompositorQuery: Send + Sync {
    /// Id of the currently focused workspace
    fn active_workspace(&self) -> impl Future<Output = Result<i32, QueryError>> + Send;

    fn monitors(&self) -> impl Future<Output = Result<Vec<Monitor>, QueryError>> + Send;

    /// All client windows, mapped or not
    fn clients(&self) -> impl Future<Output = Result<Vec<Client>, QueryError>> + Send;
}

/// Queries Hyprland by running `hyprctl`, one process per call
#[derive(Debug, Clone)]
pub struct Hyprctl {
    program: CompactString,
    timeout: Duration,
}

impl Hyprctl {
    pub fn new() -> Self {
        Self::from_settings(&OcclusionSettings::default())
    }

    pub fn from_settings(settings: &OcclusionSettings) -> Self {
        Self {
            program: settings.hyprctl.clone(),
            timeout: settings.query_timeout(),
        }
    }

    pub fn with_program(mut self, program: impl Into<CompactString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run hyprctl with `args` and return its stdout
    async fn run(&self, args: &[&str]) -> Result<String, QueryError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!("Querying compositor: {}", command);

        let child = Command::new(self.program.as_str())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| QueryError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Dropping the pending future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| QueryError::Spawn {
                command: command.clone(),
                source,
            })?,
            Err(_) => {
                return Err(QueryError::Timeout {
                    command,
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(QueryError::Status {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| QueryError::Parse {
            command,
            reason: e.to_string(),
        })
    }
}

impl Default for Hyprctl {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositorQuery for Hyprctl {
    async fn active_workspace(&self) -> Result<i32, QueryError> {
        let text = self.run(&["activeworkspace"]).await?;
        model::parse_active_workspace(&text).ok_or_else(|| QueryError::Parse {
            command: format!("{} activeworkspace", self.program),
            reason: "no workspace ID token".to_string(),
        })
    }

    async fn monitors(&self) -> Result<Vec<Monitor>, QueryError> {
        let json = self.run(&["-j", "monitors"]).await?;
        model::parse_monitors(&json).map_err(|e| QueryError::Parse {
            command: format!("{} -j monitors", self.program),
            reason: e.to_string(),
        })
    }

    async fn clients(&self) -> Result<Vec<Client>, QueryError> {
        let json = self.run(&["-j", "clients"]).await?;
        model::parse_clients(&json).map_err(|e| QueryError::Parse {
            command: format!("{} -j clients", self.program),
            reason: e.to_string(),
        })
    }
}

type Slot<T> = Mutex<Option<(Instant, T)>>;

/// Memoizes successful results of another query for a short time, so
/// widgets polling on the same compositor tick share one snapshot
///
/// A zero TTL disables caching.
pub struct CachedQuery<Q> {
    inner: Q,
    ttl: Duration,
    workspace: Slot<i32>,
    monitors: Slot<Vec<Monitor>>,
    clients: Slot<Vec<Client>>,
}

impl<Q: CompositorQuery> CachedQuery<Q> {
    pub fn new(inner: Q, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            workspace: Mutex::new(None),
            monitors: Mutex::new(None),
            clients: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    /// Drop every cached result
    pub fn invalidate(&self) {
        *self.workspace.lock() = None;
        *self.monitors.lock() = None;
        *self.clients.lock() = None;
    }

    fn fresh<T: Clone>(&self, slot: &Slot<T>) -> Option<T> {
        let guard = slot.lock();
        guard
            .as_ref()
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    fn store<T>(slot: &Slot<T>, value: T) {
        *slot.lock() = Some((Instant::now(), value));
    }
}

impl<Q: CompositorQuery> CompositorQuery for CachedQuery<Q> {
    async fn active_workspace(&self) -> Result<i32, QueryError> {
        if let Some(id) = self.fresh(&self.workspace) {
            trace!("Active workspace served from cache");
            return Ok(id);
        }
        let id = self.inner.active_workspace().await?;
        Self::store(&self.workspace, id);
        Ok(id)
    }

    async fn monitors(&self) -> Result<Vec<Monitor>, QueryError> {
        if let Some(monitors) = self.fresh(&self.monitors) {
            trace!("Monitors served from cache");
            return Ok(monitors);
        }
        let monitors = self.inner.monitors().await?;
        Self::store(&self.monitors, monitors.clone());
        Ok(monitors)
    }

    async fn clients(&self) -> Result<Vec<Client>, QueryError> {
        if let Some(clients) = self.fresh(&self.clients) {
            trace!("Clients served from cache");
            return Ok(clients);
        }
        let clients = self.inner.clients().await?;
        Self::store(&self.clients, clients.clone());
        Ok(clients)
    }
}

/// In-memory compositor state for tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// `None` in any field makes the matching query fail
    #[derive(Default)]
    pub(crate) struct StaticQuery {
        pub workspace: Mutex<Option<i32>>,
        pub monitors: Mutex<Option<Vec<Monitor>>>,
        pub clients: Mutex<Option<Vec<Client>>>,
        pub calls: AtomicUsize,
    }

    impl StaticQuery {
        pub fn new(workspace: i32, monitors: Vec<Monitor>, clients: Vec<Client>) -> Self {
            Self {
                workspace: Mutex::new(Some(workspace)),
                monitors: Mutex::new(Some(monitors)),
                clients: Mutex::new(Some(clients)),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn set_clients(&self, clients: Option<Vec<Client>>) {
            *self.clients.lock() = clients;
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer<T: Clone>(&self, slot: &Mutex<Option<T>>, what: &str) -> Result<T, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            slot.lock().clone().ok_or_else(|| QueryError::Parse {
                command: format!("fake {}", what),
                reason: "unavailable".to_string(),
            })
        }
    }

    impl CompositorQuery for StaticQuery {
        async fn active_workspace(&self) -> Result<i32, QueryError> {
            self.answer(&self.workspace, "activeworkspace")
        }

        async fn monitors(&self) -> Result<Vec<Monitor>, QueryError> {
            self.answer(&self.monitors, "monitors")
        }

        async fn clients(&self) -> Result<Vec<Client>, QueryError> {
            self.answer(&self.clients, "clients")
        }
    }

    pub fn monitor(id: i32, x: i32, y: i32, width: i32, height: i32, workspace: i32) -> Monitor {
        Monitor {
            id,
            name: format!("OUT-{}", id).into(),
            x,
            y,
            width,
            height,
            active_workspace_id: Some(workspace),
        }
    }

    pub fn client(workspace_id: i32, x: i32, y: i32, width: i32, height: i32) -> Client {
        Client {
            address: format!("0x{:x}{:x}", x.unsigned_abs(), y.unsigned_abs()).into(),
            class: "test".into(),
            workspace_id,
            x,
            y,
            width,
            height,
            mapped: true,
        }
    }
}
