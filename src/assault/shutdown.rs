use tokio::sync::watch;

/// Broadcasts the end of a run to every virtual user.
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: watch::Sender<bool>,
}
impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn shutdown(&self) {
        self.sender.send_replace(true);
    }
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener { receiver: self.sender.subscribe() }
    }

    /// Fire on Ctrl-C.
    pub fn listen_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!("received Ctrl-C, stopping virtual users");
                    shutdown.shutdown();
                }
                Err(e) => tracing::error!("cannot listen Ctrl-C: {}", e),
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}
impl ShutdownListener {
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }

    pub async fn wait(&mut self) {
        // the sender never drops while virtual users run, and if it does there is nothing left to wait for
        let _ = self.receiver.wait_for(|shutdown| *shutdown).await;
    }
}
