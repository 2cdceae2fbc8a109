//! Conversation and message queries.
//!
//! Conversations are two-party. The participant pair is stored in canonical
//! order and guarded by a unique constraint, so "find or create" is a single
//! upsert rather than a check-then-insert.

use crate::error::StoreError;
use crate::models::{ConversationRow, ConversationSummary, ConversationView, MessageView, UserRef};
use crate::Store;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Order a participant pair canonically (smaller id first).
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    id: Uuid,
    other_id: Uuid,
    other_name: String,
    last_message: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct MessageJoinRow {
    id: Uuid,
    content: String,
    sender_id: Uuid,
    conversation_id: Uuid,
    created_at: DateTime<Utc>,
    sender_name: String,
}

impl From<MessageJoinRow> for MessageView {
    fn from(r: MessageJoinRow) -> Self {
        Self {
            id: r.id,
            content: r.content,
            sender_id: r.sender_id,
            conversation_id: r.conversation_id,
            created_at: r.created_at,
            sender: UserRef {
                id: r.sender_id,
                name: r.sender_name,
            },
        }
    }
}

impl Store {
    /// Find or create the conversation between two users. Returns the row and
    /// whether it was created by this call.
    pub async fn ensure_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<(ConversationRow, bool), StoreError> {
        let (a, b) = canonical_pair(user_a, user_b);

        let inserted = sqlx::query_as::<_, ConversationRow>(
            "INSERT INTO conversations (id, participant_a, participant_b) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (participant_a, participant_b) DO NOTHING \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(a)
        .bind(b)
        .fetch_optional(self.pool())
        .await?;

        if let Some(row) = inserted {
            return Ok((row, true));
        }

        // Lost the upsert to an existing row (or a concurrent insert).
        let row = sqlx::query_as::<_, ConversationRow>(
            "SELECT * FROM conversations WHERE participant_a = $1 AND participant_b = $2",
        )
        .bind(a)
        .bind(b)
        .fetch_one(self.pool())
        .await?;
        Ok((row, false))
    }

    /// Membership predicate: the conversation, if `user_id` is a participant.
    pub async fn conversation_for_member(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ConversationRow>, StoreError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            "SELECT * FROM conversations \
             WHERE id = $1 AND (participant_a = $2 OR participant_b = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// The caller's conversations, most recent activity first, each with the
    /// other participant and the latest message inlined.
    pub async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationSummary>, StoreError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT c.id, u.id AS other_id, u.name AS other_name, \
             (SELECT m.content FROM messages m \
              WHERE m.conversation_id = c.id \
              ORDER BY m.created_at DESC LIMIT 1) AS last_message, \
             c.updated_at \
             FROM conversations c \
             JOIN users u ON u.id = CASE \
                 WHEN c.participant_a = $1 THEN c.participant_b \
                 ELSE c.participant_a END \
             WHERE $1 IN (c.participant_a, c.participant_b) \
             ORDER BY c.updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ConversationSummary {
                id: r.id,
                user: UserRef {
                    id: r.other_id,
                    name: r.other_name,
                },
                last_message: r.last_message.unwrap_or_default(),
                updated_at: r.updated_at,
            })
            .collect())
    }

    /// Messages in a conversation, oldest first.
    pub async fn messages_for_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageView>, StoreError> {
        let rows = sqlx::query_as::<_, MessageJoinRow>(
            "SELECT m.id, m.content, m.sender_id, m.conversation_id, m.created_at, \
             u.name AS sender_name \
             FROM messages m \
             JOIN users u ON u.id = m.sender_id \
             WHERE m.conversation_id = $1 \
             ORDER BY m.created_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a message and bump the conversation's `updated_at`.
    pub async fn create_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<MessageView, StoreError> {
        let row = sqlx::query_as::<_, MessageJoinRow>(
            "WITH inserted AS ( \
                INSERT INTO messages (id, content, sender_id, conversation_id) \
                VALUES ($1, $2, $3, $4) RETURNING * \
             ) \
             SELECT i.id, i.content, i.sender_id, i.conversation_id, i.created_at, \
             u.name AS sender_name \
             FROM inserted i JOIN users u ON u.id = i.sender_id",
        )
        .bind(Uuid::new_v4())
        .bind(content)
        .bind(sender_id)
        .bind(conversation_id)
        .fetch_one(self.pool())
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = now() WHERE id = $1")
            .bind(conversation_id)
            .execute(self.pool())
            .await?;

        Ok(row.into())
    }

    /// Conversation with both participants resolved, as returned on creation.
    pub async fn conversation_view(
        &self,
        row: &ConversationRow,
    ) -> Result<ConversationView, StoreError> {
        let participants = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM users WHERE id IN ($1, $2) ORDER BY name ASC",
        )
        .bind(row.participant_a)
        .bind(row.participant_b)
        .fetch_all(self.pool())
        .await?;

        Ok(ConversationView {
            id: row.id,
            participants: participants
                .into_iter()
                .map(|(id, name)| UserRef { id, name })
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_insensitive() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
    }

    #[test]
    fn canonical_pair_puts_smaller_id_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (first, second) = canonical_pair(a, b);
        assert!(first <= second);
    }
}
