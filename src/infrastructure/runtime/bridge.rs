//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI thread owns the dashboard state and never blocks on I/O. Commands
//! travel to a worker thread running its own Tokio runtime; results come back
//! as events that the main loop polls every frame.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tokio::runtime::Runtime;

use crate::core::{ItemAction, ItemRequest};
use crate::domain::{Order, OrderFilter, StockItem};
use crate::infrastructure::http::StockApi;
use crate::infrastructure::runtime::worker::run_async_worker;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCommand {
    /// Open an admin session
    Login { password: String },
    /// Fetch the full stock listing
    LoadStock,
    /// Add, edit or delete stock items
    SubmitItem(ItemRequest),
    /// Upload an item picture (fire and forget)
    UploadImage { title: String, path: std::path::PathBuf },
    /// Fetch orders matching a filter
    LoadOrders { filter: OrderFilter },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    /// Admin session established
    LoggedIn,
    /// Admin password rejected
    LoginRejected { message: String },
    /// Stock listing fetched
    StockLoaded { items: Vec<StockItem> },
    /// An item mutation succeeded
    ItemSubmitted { action: ItemAction },
    /// Orders fetched
    OrdersLoaded {
        filter: OrderFilter,
        orders: Vec<Order>,
    },
    /// Image stored by the backend
    ImageUploaded { title: String },
    /// Image upload failed; independent of any item mutation
    ImageFailed { title: String, message: String },
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread serving requests through `api`
    pub fn new(api: Arc<dyn StockApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Failed to create Tokio runtime: {err}"),
                    });
                    return;
                }
            };
            rt.block_on(async {
                if let Err(err) = run_async_worker(api, cmd_rx, evt_tx.clone()).await {
                    tracing::error!("worker exited: {err:#}");
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Worker exited: {:#}", err),
                    });
                }
            });
        });

        Self { cmd_tx, evt_rx }
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Try to send shutdown command
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
