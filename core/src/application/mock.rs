//! In-memory [`ClusterGateway`] for exercising the application services.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::domain::ForwardTarget;
use crate::error::{Error, Result};
use crate::kubernetes::KubectlError;
use crate::ports::{ClusterGateway, TunnelHandle};

/// Shared view of one mock tunnel.
#[derive(Debug, Default)]
pub struct TunnelControl {
    exit: Notify,
    exited: AtomicBool,
    killed: AtomicBool,
}

impl TunnelControl {
    /// Makes the tunnel exit on its own, as if kubectl died.
    pub fn exit(&self) {
        self.exit.notify_one();
    }

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    pub fn is_alive(&self) -> bool {
        !self.is_killed() && !self.exited.load(Ordering::SeqCst)
    }
}

/// A recorded `start_port_forward` call.
#[derive(Debug, Clone)]
pub struct StartedTunnel {
    pub target: ForwardTarget,
    pub started_at: Instant,
    pub control: Arc<TunnelControl>,
}

pub struct MockTunnel {
    id: u32,
    control: Arc<TunnelControl>,
}

impl TunnelHandle for MockTunnel {
    fn id(&self) -> Option<u32> {
        Some(self.id)
    }

    async fn wait(&mut self) -> Result<Option<i32>> {
        self.control.exit.notified().await;
        self.control.exited.store(true, Ordering::SeqCst);
        Ok(Some(0))
    }

    async fn kill(&mut self) -> Result<()> {
        self.control.killed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockGateway {
    pods: Mutex<HashMap<(String, String), Vec<String>>>,
    context: Mutex<Option<String>>,
    started: Mutex<Vec<StartedTunnel>>,
    evicted: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    next_id: AtomicU32,
    fail_spawn: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pods(&self, context: &str, namespace: &str, pods: &[&str]) {
        self.pods.lock().insert(
            (context.to_string(), namespace.to_string()),
            pods.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn set_context(&self, context: Option<&str>) {
        *self.context.lock() = context.map(str::to_string);
    }

    pub fn fail_spawn(&self, fail: bool) {
        self.fail_spawn.store(fail, Ordering::SeqCst);
    }

    pub fn started(&self) -> Vec<StartedTunnel> {
        self.started.lock().clone()
    }

    pub fn started_for(&self, local_port: u16) -> Vec<StartedTunnel> {
        self.started()
            .into_iter()
            .filter(|t| t.target.local_port == local_port)
            .collect()
    }

    pub fn live_tunnels(&self) -> usize {
        self.started
            .lock()
            .iter()
            .filter(|t| t.control.is_alive())
            .count()
    }

    pub fn evicted(&self) -> Vec<String> {
        self.evicted.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl ClusterGateway for MockGateway {
    type Tunnel = MockTunnel;

    async fn list_pods(&self, context: &str, namespace: &str) -> Vec<String> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pods
            .lock()
            .get(&(context.to_string(), namespace.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    async fn current_context(&self) -> Option<String> {
        self.context.lock().clone()
    }

    fn start_port_forward(&self, target: &ForwardTarget) -> Result<MockTunnel> {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(Error::Kubernetes(KubectlError::KubectlNotFound));
        }
        let control = Arc::new(TunnelControl::default());
        self.started.lock().push(StartedTunnel {
            target: target.clone(),
            started_at: Instant::now(),
            control: Arc::clone(&control),
        });
        Ok(MockTunnel {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            control,
        })
    }

    fn evict_pods(&self, context: &str) {
        self.evicted.lock().push(context.to_string());
    }
}
