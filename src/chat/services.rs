use tracing::{debug, error};
use uuid::Uuid;

use super::dto::Exchange;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    store::types::Message,
};

/// The caller's conversation, oldest first. Never includes other users' rows.
pub async fn list_messages(state: &AppState, user_id: Uuid) -> AppResult<Vec<Message>> {
    let messages = state.messages.list_by_user(user_id).await?;
    debug!(user_id = %user_id, count = messages.len(), "messages listed");
    Ok(messages)
}

/// Store the user's message, then an automated reply under the same owner.
///
/// The two writes are not transactional. If the reply cannot be stored the
/// human message stays and the caller gets `PartialWriteFailure` carrying it.
pub async fn post_message(state: &AppState, user_id: Uuid, content: &str) -> AppResult<Exchange> {
    let message = state.messages.insert(user_id, content, false).await?;

    let reply_text = state.replies.select(content);
    let reply = match state.messages.insert(user_id, &reply_text, true).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(user_id = %user_id, message_id = %message.id, error = %e, "storing reply failed");
            return Err(AppError::PartialWriteFailure {
                persisted: Box::new(message),
            });
        }
    };

    debug!(user_id = %user_id, message_id = %message.id, reply_id = %reply.id, "exchange stored");
    Ok(Exchange { message, reply })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::password::PasswordHasher,
        chat::reply::{is_canned_reply, ReplySelector},
        config::AppConfig,
        store::{memory::MemoryStore, MessageStore, StoreError, UserStore},
    };
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Accepts human messages but refuses to store automated ones.
    struct RepliesFail(MemoryStore);

    #[async_trait]
    impl MessageStore for RepliesFail {
        async fn insert(
            &self,
            user_id: Uuid,
            content: &str,
            from_automated: bool,
        ) -> Result<Message, StoreError> {
            if from_automated {
                return Err(sqlx::Error::PoolTimedOut.into());
            }
            self.0.insert(user_id, content, from_automated).await
        }

        async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Message>, StoreError> {
            self.0.list_by_user(user_id).await
        }
    }

    #[tokio::test]
    async fn post_then_list_returns_pair_in_order() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let exchange = post_message(&state, user, "hello").await.unwrap();
        assert!(!exchange.message.from_automated);
        assert!(exchange.reply.from_automated);
        assert_eq!(exchange.reply.user_id, user);
        assert!(is_canned_reply("hello", &exchange.reply.content));

        let listed = list_messages(&state, user).await.unwrap();
        assert_eq!(listed, vec![exchange.message, exchange.reply]);
    }

    #[tokio::test]
    async fn empty_history_is_not_an_error() {
        let state = AppState::fake();
        assert!(list_messages(&state, Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn histories_are_isolated() {
        let state = AppState::fake();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        post_message(&state, a, "from a").await.unwrap();
        post_message(&state, b, "from b").await.unwrap();
        post_message(&state, a, "again a").await.unwrap();

        let for_a = list_messages(&state, a).await.unwrap();
        let for_b = list_messages(&state, b).await.unwrap();
        assert_eq!(for_a.len(), 4);
        assert_eq!(for_b.len(), 2);
        assert!(for_a.iter().all(|m| m.user_id == a));
        assert!(for_b.iter().all(|m| m.user_id == b));
        assert_eq!(for_a[2].content, "again a");
    }

    #[tokio::test]
    async fn failed_reply_keeps_human_message() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::from_parts(
            Arc::new(AppConfig::in_memory("test-secret")),
            store.clone() as Arc<dyn UserStore>,
            Arc::new(RepliesFail(MemoryStore::new())) as Arc<dyn MessageStore>,
            PasswordHasher::fast(),
            ReplySelector::seeded(3),
        );
        let user = Uuid::new_v4();

        let err = post_message(&state, user, "hello").await.unwrap_err();
        let persisted = match err {
            AppError::PartialWriteFailure { persisted } => persisted,
            other => panic!("expected partial write failure, got {other:?}"),
        };
        assert_eq!(persisted.content, "hello");

        let listed = list_messages(&state, user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, persisted.id);
    }
}
