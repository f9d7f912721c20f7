use crate::classifiers::SvmClassifier;
use crate::persistence::ModelStore;
use crate::server::connection;
use crate::service::ClassifierService;
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Default TCP port the service listens on.
pub const DEFAULT_PORT: u16 = 4321;

/// Blocking accept loop around a shared [`ClassifierService`].
///
/// Connections are served strictly in accept order, one at a time;
/// a request that fails in any way is logged and its connection
/// closed, and the loop keeps serving.
pub struct Server {
    listener: TcpListener,
    service: Arc<ClassifierService<SvmClassifier>>,
}

impl Server {
    pub fn bind<A: ToSocketAddrs>(
        addr: A,
        service: Arc<ClassifierService<SvmClassifier>>,
    ) -> io::Result<Self> {
        Ok(Self::from_listener(TcpListener::bind(addr)?, service))
    }

    /// Wraps an already-bound listener, for callers that bind the port
    /// before the service is ready.
    pub fn from_listener(
        listener: TcpListener,
        service: Arc<ClassifierService<SvmClassifier>>,
    ) -> Self {
        Self { listener, service }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until the process exits.
    pub fn serve(&self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            let mut stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };
            let peer = stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "unknown".into());
            info!(%peer, "connection accepted");
            if let Err(e) = connection::handle(&mut stream, &self.service) {
                warn!(%peer, "request failed: {e}");
            }
            info!(%peer, "connection closed");
        }
        Ok(())
    }
}

/// Installs the termination hook that flushes the model to the store.
///
/// The hook observes the signal whether the server is blocked in
/// accept or mid-request. It runs at most once: the model is saved
/// (best effort, a failure is logged and does not block exit) and the
/// process exits.
pub fn install_shutdown_flush(
    store: ModelStore,
    service: Arc<ClassifierService<SvmClassifier>>,
) -> Result<(), ctrlc::Error> {
    let fired = AtomicBool::new(false);
    ctrlc::set_handler(move || {
        if fired.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("closing server");
        if let Err(e) = store.save(service.model()) {
            error!("could not persist classifier: {e}");
        }
        process::exit(0);
    })
}
