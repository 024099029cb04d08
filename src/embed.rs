//! Host embedding channel
//!
//! When the widget runs embedded, the host needs to know the rendered size to
//! reserve space for it. The shell publishes a structured
//! `resize-notification` message whenever the terminal reports a new size.
//! The dialogue controller itself never touches this channel.

use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResizeNotification {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub width: u16,
    pub height: u16,
}

impl ResizeNotification {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            kind: "resize-notification",
            width,
            height,
        }
    }
}

/// Publish the current widget size on the embed channel
pub fn notify_resize(width: u16, height: u16) {
    let message = ResizeNotification::new(width, height);
    match serde_json::to_string(&message) {
        Ok(payload) => tracing::info!(target: "embed", %payload, "resize-notification"),
        Err(error) => tracing::warn!(target: "embed", %error, "failed to encode resize notification"),
    }
}
