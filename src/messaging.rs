//! # Messaging Module
//!
//! One-to-one conversations and messages. A conversation is created when a
//! friend request is accepted and is assumed unique per unordered user pair
//! (enforced at request time only, not by storage).
//!
//! The chat screen approximates live updates by re-fetching a conversation's
//! messages on a fixed interval (~1.5 s); [`message_feed`] packages that poll
//! loop as a `Stream`. There is no push mechanism and no cancellation beyond
//! dropping the stream.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Database;
use crate::users::User;

/// Default poll period for [`message_feed`]
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_millis(1500);

/// A conversation between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Sequentially assigned unique id
    pub id: i64,
    /// First participant (the request sender at creation time)
    pub user1_id: i64,
    /// Second participant
    pub user2_id: i64,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    /// Bumped on every send; initialized to `created_at`
    pub last_message_at: String,
}

impl Conversation {
    /// The participant that isn't `user_id`, or `None` if `user_id` isn't
    /// a participant at all.
    pub fn other_participant(&self, user_id: i64) -> Option<i64> {
        if self.user1_id == user_id {
            Some(self.user2_id)
        } else if self.user2_id == user_id {
            Some(self.user1_id)
        } else {
            None
        }
    }

    /// Whether this conversation links the given unordered pair
    pub fn links(&self, a: i64, b: i64) -> bool {
        (self.user1_id == a && self.user2_id == b) || (self.user1_id == b && self.user2_id == a)
    }
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Sequentially assigned unique id
    pub id: i64,
    /// Owning conversation; may dangle if storage is edited out-of-band
    pub conversation_id: i64,
    /// Sending user
    pub sender_id: i64,
    /// Message text
    pub content: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    /// Read flag, recipient-scoped
    pub read: bool,
}

/// A conversation with display data attached, for the messages screen
///
/// The joins (`other_user`, `last_message`, `unread_count`) are denormalized
/// at read time on every call — nothing is cached or indexed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    /// The underlying conversation
    pub conversation: Conversation,
    /// The other participant, if they still exist
    pub other_user: Option<User>,
    /// Most recent message, if any
    pub last_message: Option<Message>,
    /// Messages addressed to the viewer and not yet read
    pub unread_count: usize,
}

/// Poll a conversation's messages on a fixed period.
///
/// Yields the full message list (ascending by `created_at`) once per tick,
/// starting immediately. Errors are yielded, not fatal to the stream — the
/// chat screen shows a generic alert and keeps polling.
pub fn message_feed(
    database: Arc<Database>,
    conversation_id: i64,
    period: Duration,
) -> impl Stream<Item = Result<Vec<Message>>> {
    async_stream::stream! {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            yield database.messages_for_conversation(conversation_id).await;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::users::{NewUser, Role};
    use futures::StreamExt;

    #[test]
    fn test_other_participant() {
        let conversation = Conversation {
            id: 1,
            user1_id: 2,
            user2_id: 5,
            created_at: "2026-08-01T00:00:00.000Z".into(),
            last_message_at: "2026-08-01T00:00:00.000Z".into(),
        };

        assert_eq!(conversation.other_participant(2), Some(5));
        assert_eq!(conversation.other_participant(5), Some(2));
        assert_eq!(conversation.other_participant(9), None);
        assert!(conversation.links(5, 2));
        assert!(!conversation.links(2, 9));
    }

    #[test]
    fn test_message_serializes_persisted_layout() {
        let message = Message {
            id: 10,
            conversation_id: 1,
            sender_id: 2,
            content: "On my way".into(),
            created_at: "2026-08-01T12:00:00.000Z".into(),
            read: false,
        };

        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"conversationId\":1"));
        assert!(json.contains("\"senderId\":2"));
        assert!(json.contains("\"read\":false"));

        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(message, restored);
    }

    fn technician(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: "pw".into(),
            first_name: username.into(),
            last_name: "Test".into(),
            email: format!("{}@example.com", username),
            role: Role::Technician,
            profile_picture: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_feed_picks_up_new_messages() {
        let database = Arc::new(Database::open(Arc::new(MemoryStore::new())).await.unwrap());

        let alice = database.create_user(technician("alice")).await.unwrap();
        let bob = database.create_user(technician("bob")).await.unwrap();
        let request = database
            .send_friend_request(alice.id, bob.id)
            .await
            .unwrap();
        let conversation = database.accept_friend_request(request.id).await.unwrap();

        let mut feed = Box::pin(message_feed(
            database.clone(),
            conversation.id,
            Duration::from_millis(10),
        ));

        // First tick fires immediately, before any message exists.
        let empty = feed.next().await.unwrap().unwrap();
        assert!(empty.is_empty());

        database
            .send_message(conversation.id, alice.id, "hello")
            .await
            .unwrap();

        let with_message = feed.next().await.unwrap().unwrap();
        assert_eq!(with_message.len(), 1);
        assert_eq!(with_message[0].content, "hello");
    }
}
