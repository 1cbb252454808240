// src/server/reload.rs

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Message pushed to connected browsers.
///
/// Serialised as `{"type":"css","path":"css/style.css"}` or
/// `{"type":"reload"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Refresh one stylesheet in place; `path` is relative to the app dir.
    Css { path: String },
    /// Reload the whole page.
    Reload,
}

/// Fan-out of reload notifications from tasks to websocket clients.
///
/// Cloning shares the channel. Notifications sent while nobody is
/// subscribed are dropped.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadMessage>,
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.tx.subscribe()
    }

    pub fn reload_page(&self) {
        self.send(ReloadMessage::Reload);
    }

    pub fn notify_css(&self, path: &str) {
        self.send(ReloadMessage::Css {
            path: path.replace('\\', "/"),
        });
    }

    /// Stylesheet refresh for `.css` paths, page reload for anything else.
    pub fn notify_changed(&self, path: &str) {
        if path.ends_with(".css") {
            self.notify_css(path);
        } else {
            self.reload_page();
        }
    }

    fn send(&self, msg: ReloadMessage) {
        match self.tx.send(msg) {
            Ok(receivers) => debug!(receivers, "live-reload notification sent"),
            Err(broadcast::error::SendError(msg)) => {
                trace!(?msg, "no live-reload clients; notification dropped")
            }
        }
    }
}
