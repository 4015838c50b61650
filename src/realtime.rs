//! Realtime broadcast channel
//!
//! Publishes newly created posts to every connected WebSocket viewer.
//! Delivery is explicitly best-effort, at-most-once: publishing with no
//! subscribers is a no-op, and a subscriber that lags behind the channel
//! capacity skips the messages it missed. There is no replay on
//! reconnect.

use tokio::sync::broadcast;

use crate::data::PostView;
use crate::error::AppError;
use crate::metrics::BROADCASTS_TOTAL;

/// Wire message pushed to connected viewers
#[derive(Debug, serde::Serialize)]
struct NewPostMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    post: &'a PostView,
}

/// Fan-out channel for new-post notifications
pub struct PostBroadcaster {
    sender: broadcast::Sender<String>,
}

impl PostBroadcaster {
    /// Create a broadcaster with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe a new connection
    ///
    /// The subscription ends when the receiver is dropped; there is no
    /// explicit unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Publish a fully resolved post view to all current subscribers
    pub fn broadcast_new_post(&self, post: &PostView) -> Result<(), AppError> {
        let payload = serde_json::to_string(&NewPostMessage {
            kind: "new_post",
            post,
        })
        .map_err(|e| AppError::Internal(e.into()))?;

        // Send errors only mean there are no subscribers right now
        let _ = self.sender.send(payload);
        BROADCASTS_TOTAL.inc();

        tracing::debug!(
            subscribers = self.sender.receiver_count(),
            "Broadcast new post"
        );
        Ok(())
    }

    /// Number of currently subscribed connections
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::data::{Post, PostCounts, User};

    fn sample_view() -> PostView {
        let now = Utc::now();
        PostView {
            post: Post {
                id: "post-1".to_string(),
                user_id: "user-1".to_string(),
                content: "hello".to_string(),
                image_url: None,
                word_count: 1,
                created_at: now,
            },
            author: User {
                id: "user-1".to_string(),
                email: None,
                first_name: Some("Ada".to_string()),
                last_name: None,
                profile_image_url: None,
                bio: None,
                location: None,
                created_at: now,
                updated_at: now,
            },
            counts: PostCounts {
                likes: 0,
                reposts: 0,
                comments: 0,
            },
            is_liked: false,
            is_reposted: false,
        }
    }

    #[tokio::test]
    async fn subscribers_receive_tagged_payload() {
        let broadcaster = PostBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast_new_post(&sample_view()).unwrap();

        let payload = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "new_post");
        assert_eq!(value["post"]["id"], "post-1");
        assert_eq!(value["post"]["author"]["firstName"], "Ada");
        assert_eq!(value["post"]["_count"]["likes"], 0);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_a_noop() {
        let broadcaster = PostBroadcaster::new(8);
        assert_eq!(broadcaster.receiver_count(), 0);
        broadcaster.broadcast_new_post(&sample_view()).unwrap();
    }

    #[tokio::test]
    async fn lagged_subscriber_skips_missed_messages() {
        let broadcaster = PostBroadcaster::new(1);
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast_new_post(&sample_view()).unwrap();
        broadcaster.broadcast_new_post(&sample_view()).unwrap();

        // Capacity 1: the first message was dropped for this receiver
        let lagged = rx.recv().await;
        assert!(matches!(
            lagged,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_))
        ));

        // The next receive yields the surviving message
        assert!(rx.recv().await.is_ok());
    }
}
