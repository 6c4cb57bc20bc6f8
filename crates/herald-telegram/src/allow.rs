//! Chat allowlist.

/// `true` when `chat_id` may issue commands.
///
/// An empty allowlist means open access — restriction is opt-in, so a
/// freshly configured bot works without listing every chat first.
pub fn is_allowed(allow_chats: &[i64], chat_id: i64) -> bool {
    allow_chats.is_empty() || allow_chats.contains(&chat_id)
}
