//! TCP front end.
//!
//! Each connection gets its own [`Splitter`]; complete frames are handed to
//! the pipeline root. Connections run as tasks in a [`JoinSet`] owned by the
//! accept loop, so a failing or panicking connection never affects another.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use sensation_pipeline::Pipeline;
use sensation_protocol::{Frame, Splitter};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::{self, JoinError, JoinHandle, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::graph::SensationGraph;

/// Server state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Not listening
    Stopped,
    /// Setting up the pipeline and binding
    Starting,
    /// Accepting connections
    Running,
    /// Disconnecting clients and tearing down
    ShuttingDown,
}

/// Connected client information
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Remote address
    pub peer: SocketAddr,
    /// Connection timestamp
    pub connected_at: Instant,
    /// Complete frames received so far
    pub frames_received: u64,
}

impl ClientInfo {
    fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            connected_at: Instant::now(),
            frames_received: 0,
        }
    }
}

type ClientMap = Arc<RwLock<HashMap<SocketAddr, ClientInfo>>>;

/// What every connection task needs.
#[derive(Debug, Clone)]
struct Connections {
    pipeline: Arc<Pipeline<Frame>>,
    clients: ClientMap,
    read_buffer_size: usize,
    max_frame_size: usize,
    grace: Duration,
}

/// Accepts clients and feeds their frames into the processing graph.
#[derive(Debug)]
pub struct SensationServer {
    config: ServiceConfig,
    graph: SensationGraph,
    clients: ClientMap,
    state: Mutex<ServerState>,
    shutdown_tx: broadcast::Sender<()>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl SensationServer {
    /// Server for `graph`, listening where `config` says.
    pub fn new(config: ServiceConfig, graph: SensationGraph) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            graph,
            clients: Arc::new(RwLock::new(HashMap::new())),
            state: Mutex::new(ServerState::Stopped),
            shutdown_tx,
            accept_task: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    /// Set up the pipeline, bind and start accepting. Returns the bound address.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::AlreadyRunning`] unless the server is stopped
    /// - [`ServiceError::Pipeline`] if set-up fails
    /// - [`ServiceError::Bind`] if the address cannot be bound; the pipeline
    ///   is torn down again
    pub async fn start(&self) -> ServiceResult<SocketAddr> {
        {
            let mut state = self.state.lock();
            if *state != ServerState::Stopped {
                return Err(ServiceError::AlreadyRunning);
            }
            *state = ServerState::Starting;
        }

        let pipeline = Arc::clone(self.graph.pipeline());
        if let Err(e) = pipeline.set_up().await {
            *self.state.lock() = ServerState::Stopped;
            return Err(e.into());
        }

        let address = self.config.socket_addr();
        let listener = match TcpListener::bind(address).await {
            Ok(listener) => listener,
            Err(source) => {
                if let Err(e) = pipeline.tear_down().await {
                    warn!(error = %e, "tear-down after failed bind");
                }
                *self.state.lock() = ServerState::Stopped;
                return Err(ServiceError::Bind {
                    address: address.to_string(),
                    source,
                });
            }
        };
        let local_addr = listener.local_addr()?;

        let connections = Connections {
            pipeline,
            clients: Arc::clone(&self.clients),
            read_buffer_size: self.config.read_buffer_size,
            max_frame_size: self.config.max_frame_size,
            grace: self.config.teardown_grace(),
        };
        let shutdown_rx = self.shutdown_tx.subscribe();
        let accept = tokio::spawn(accept_loop(listener, connections, shutdown_rx));

        *self.accept_task.lock() = Some(accept);
        *self.local_addr.lock() = Some(local_addr);
        *self.state.lock() = ServerState::Running;

        info!(address = %local_addr, actors = self.graph.topology().actor_count(), "listening");
        Ok(local_addr)
    }

    /// Stop accepting, disconnect every client and tear the pipeline down.
    ///
    /// A no-op unless the server is running.
    ///
    /// # Errors
    ///
    /// Returns the pipeline tear-down failure, after the server has stopped.
    pub async fn shutdown(&self) -> ServiceResult<()> {
        {
            let mut state = self.state.lock();
            if *state != ServerState::Running {
                return Ok(());
            }
            *state = ServerState::ShuttingDown;
        }
        info!("shutting down");

        if self.shutdown_tx.send(()).is_err() {
            debug!("accept loop already gone");
        }
        let accept = self.accept_task.lock().take();
        if let Some(accept) = accept
            && let Err(e) = accept.await
        {
            error!(error = %e, "accept loop failed");
        }

        let result = self.graph.pipeline().tear_down().await;
        *self.local_addr.lock() = None;
        *self.state.lock() = ServerState::Stopped;
        info!("server stopped");
        result.map_err(ServiceError::from)
    }

    /// Run until `signal` resolves, then shut down.
    ///
    /// # Errors
    ///
    /// Fails if the server cannot start or shut down cleanly.
    pub async fn run_until(&self, signal: impl Future<Output = ()>) -> ServiceResult<()> {
        self.start().await?;
        signal.await;
        self.shutdown().await
    }

    /// Current state.
    pub fn state(&self) -> ServerState {
        *self.state.lock()
    }

    /// Whether the server accepts connections.
    pub fn is_running(&self) -> bool {
        self.state() == ServerState::Running
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Connected clients.
    pub fn clients(&self) -> Vec<ClientInfo> {
        self.clients.read().values().cloned().collect()
    }

    /// The processing graph.
    pub fn graph(&self) -> &SensationGraph {
        &self.graph
    }

    /// Server configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

async fn accept_loop(
    listener: TcpListener,
    connections: Connections,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut tasks = JoinSet::new();
    let mut peers: HashMap<task::Id, SocketAddr> = HashMap::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!(%peer, "client connected");
                    connections.clients.write().insert(peer, ClientInfo::new(peer));
                    let handle = tasks.spawn(handle_client(stream, peer, connections.clone()));
                    peers.insert(handle.id(), peer);
                }
                Err(e) => warn!(error = %e, "failed to accept connection"),
            },
            Some(joined) = tasks.join_next_with_id() => {
                finish_client(joined, &mut peers, &connections.clients);
            }
        }
    }

    tasks.abort_all();
    let drained = timeout(connections.grace, async {
        while let Some(joined) = tasks.join_next_with_id().await {
            finish_client(joined, &mut peers, &connections.clients);
        }
    })
    .await;
    if drained.is_err() {
        for peer in peers.values() {
            error!(%peer, "could not disconnect client");
        }
    }
    connections.clients.write().clear();
}

fn finish_client(
    joined: Result<(task::Id, ()), JoinError>,
    peers: &mut HashMap<task::Id, SocketAddr>,
    clients: &ClientMap,
) {
    let (id, failure) = match joined {
        Ok((id, ())) => (id, None),
        Err(e) => (e.id(), Some(e)),
    };
    let Some(peer) = peers.remove(&id) else {
        return;
    };
    clients.write().remove(&peer);

    match failure {
        Some(e) if e.is_panic() => error!(%peer, "client handler panicked"),
        Some(_) => debug!(%peer, "client handler cancelled"),
        None => {}
    }
}

async fn handle_client(mut stream: TcpStream, peer: SocketAddr, connections: Connections) {
    let mut splitter = Splitter::new(connections.max_frame_size);
    let mut buffer = vec![0u8; connections.read_buffer_size];

    loop {
        let read = match stream.read(&mut buffer).await {
            Ok(0) => {
                info!(%peer, "client disconnected");
                break;
            }
            Ok(read) => read,
            Err(e) => {
                warn!(%peer, error = %e, "read failed, closing connection");
                break;
            }
        };

        let chunk = buffer.get(..read).unwrap_or_default();
        let frames = match splitter.push(chunk) {
            Ok(frames) => frames,
            Err(e) => {
                error!(%peer, error = %e, "closing connection");
                break;
            }
        };
        if frames.is_empty() {
            continue;
        }

        if let Some(client) = connections.clients.write().get_mut(&peer) {
            client.frames_received += frames.len() as u64;
        }
        if let Err(e) = connections.pipeline.process(frames).await {
            warn!(%peer, error = %e, "frames rejected by pipeline");
        }
    }
}
