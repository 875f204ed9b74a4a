// src/services/lifecycle.rs
use std::{net::SocketAddr, process::Stdio, sync::Arc};

use tokio::{
    io::AsyncRead,
    process::{Child, Command},
    sync::Mutex,
    task::JoinHandle,
};

use crate::config::ServiceCommand;

/// The WhatsApp service running as a child of the gateway.
///
/// Owned by `main` for the lifetime of the server. The child is killed on `stop`, and
/// also when this value is dropped.
#[derive(Debug)]
pub struct ServiceProcess {
    command: ServiceCommand,
    port: Option<u16>,
    child: Mutex<Option<Child>>,
}

impl ServiceProcess {
    /// `port` is exported to the child as `PORT` so it listens where the gateway calls it.
    pub fn new(command: ServiceCommand, port: Option<u16>) -> Self {
        Self {
            command,
            port,
            child: Mutex::new(None),
        }
    }

    /// Start the child once the gateway listener at `bound` is accepting.
    pub fn schedule_start(self: &Arc<Self>, bound: SocketAddr) -> JoinHandle<bool> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tracing::debug!(%bound, "listener bound, starting WhatsApp service");
            this.start().await
        })
    }

    /// Spawn the child. Failure is logged and reported as `false`; it is never fatal.
    pub async fn start(&self) -> bool {
        let mut guard = self.child.lock().await;
        if guard.is_some() {
            return true;
        }

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.command.dir {
            cmd.current_dir(dir);
        }
        if let Some(port) = self.port {
            cmd.env("PORT", port.to_string());
        }

        match cmd.spawn() {
            Ok(mut child) => {
                if let Some(stdout) = child.stdout.take() {
                    drain(stdout);
                }
                if let Some(stderr) = child.stderr.take() {
                    drain(stderr);
                }
                tracing::info!(
                    program = %self.command.program,
                    pid = child.id().unwrap_or(0),
                    "WhatsApp service started"
                );
                *guard = Some(child);
                true
            }
            Err(err) => {
                tracing::error!(
                    program = %self.command.program,
                    error = %err,
                    "failed to start WhatsApp service"
                );
                false
            }
        }
    }

    /// Kill the child and release the handle. Returns whether there was one to stop.
    pub async fn stop(&self) -> bool {
        let Some(mut child) = self.child.lock().await.take() else {
            return false;
        };
        if let Err(err) = child.kill().await {
            tracing::warn!(error = %err, "failed to kill WhatsApp service");
        }
        tracing::info!("WhatsApp service stopped");
        true
    }

    pub async fn is_running(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

/// Read and discard a child stream so the child never blocks on a full pipe.
fn drain<R>(mut reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
    });
}
