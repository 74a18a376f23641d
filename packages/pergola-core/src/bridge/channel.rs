//! Outbound channel to the embedded page.
//!
//! The webview's transport only exists once the page has loaded, but
//! capability completions can race the load. Instead of polling the channel
//! at a fixed interval, the queue models readiness explicitly: frames sent
//! before [`OutboundQueue::attach`] are held (bounded) and flushed in order
//! exactly once when the live channel arrives.

use std::collections::VecDeque;
use std::sync::Arc;

use super::message::Outbound;
use crate::error::Result;

/// Maximum number of frames held while the channel is not ready.
///
/// Matches the number of delivery attempts the shell previously made before
/// abandoning a frame; overflow drops the oldest frame with a warning.
pub const MAX_PENDING: usize = 10;

/// postMessage-style transport supplied by the host.
pub trait Channel: Send + Sync {
    /// Deliver one JSON frame to the page.
    fn post_message(&self, frame: &str) -> Result<()>;
}

/// Bounded queue in front of the channel.
#[derive(Default)]
pub struct OutboundQueue {
    channel: Option<Arc<dyn Channel>>,
    pending: VecDeque<String>,
}

impl OutboundQueue {
    /// Create a queue with no channel attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the live channel is attached.
    pub fn is_ready(&self) -> bool {
        self.channel.is_some()
    }

    /// Number of frames waiting for the channel.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Attach the live channel and flush anything queued, oldest first.
    pub fn attach(&mut self, channel: Arc<dyn Channel>) {
        self.channel = Some(channel);
        if self.pending.is_empty() {
            return;
        }
        tracing::info!(frames = self.pending.len(), "channel ready, flushing pending frames");
        for frame in std::mem::take(&mut self.pending) {
            self.post(&frame);
        }
    }

    /// Drop the channel handle (page unloaded / view unmounted).
    pub fn detach(&mut self) {
        self.channel = None;
    }

    /// Send or queue one frame. Never raises to the caller.
    pub fn send(&mut self, message: &Outbound) {
        let frame = match message.encode() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, status = message.status(), "outbound frame failed to encode");
                return;
            }
        };

        if self.is_ready() {
            self.post(&frame);
        } else {
            if self.pending.len() == MAX_PENDING {
                self.pending.pop_front();
                tracing::warn!("pending outbound queue full, dropping oldest frame");
            }
            self.pending.push_back(frame);
            tracing::debug!(queued = self.pending.len(), "channel not ready, frame queued");
        }
    }

    fn post(&self, frame: &str) {
        let Some(channel) = &self.channel else {
            return;
        };
        if let Err(e) = channel.post_message(frame) {
            tracing::warn!(error = %e, "dropping outbound frame, channel write failed");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingChannel {
        frames: Mutex<Vec<String>>,
    }

    impl Channel for RecordingChannel {
        fn post_message(&self, frame: &str) -> Result<()> {
            self.frames.lock().push(frame.to_string());
            Ok(())
        }
    }

    fn token_saved() -> Outbound {
        Outbound::TokenSaved
    }

    #[test]
    fn test_send_when_ready_posts_immediately() {
        let channel = Arc::new(RecordingChannel::default());
        let mut queue = OutboundQueue::new();
        queue.attach(channel.clone());

        queue.send(&token_saved());
        assert_eq!(channel.frames.lock().len(), 1);
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_send_before_attach_queues_then_flushes_in_order() {
        let mut queue = OutboundQueue::new();
        queue.send(&Outbound::Error {
            message: "first".into(),
        });
        queue.send(&Outbound::Error {
            message: "second".into(),
        });
        assert_eq!(queue.pending_len(), 2);

        let channel = Arc::new(RecordingChannel::default());
        queue.attach(channel.clone());

        let frames = channel.frames.lock();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].contains("first"));
        assert!(frames[1].contains("second"));
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_queue_overflow_drops_oldest() {
        let mut queue = OutboundQueue::new();
        for i in 0..(MAX_PENDING + 3) {
            queue.send(&Outbound::Error {
                message: format!("frame-{i}"),
            });
        }
        assert_eq!(queue.pending_len(), MAX_PENDING);

        let channel = Arc::new(RecordingChannel::default());
        queue.attach(channel.clone());

        let frames = channel.frames.lock();
        // The first three frames were dropped to make room.
        assert!(frames[0].contains("frame-3"));
        assert!(frames.last().unwrap().contains(&format!("frame-{}", MAX_PENDING + 2)));
    }

    #[test]
    fn test_detach_makes_sends_queue_again() {
        let channel = Arc::new(RecordingChannel::default());
        let mut queue = OutboundQueue::new();
        queue.attach(channel.clone());
        queue.detach();

        queue.send(&token_saved());
        assert!(channel.frames.lock().is_empty());
        assert_eq!(queue.pending_len(), 1);
    }
}
