use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("invalid role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// Ordered, append-only record of the turns exchanged with one provider.
///
/// A round trip is bracketed by [`Conversation::begin_turn`] and either
/// [`Conversation::complete_turn`] or [`Conversation::abandon_turn`], so a
/// failed request never leaves a user turn without its reply.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the user's text and returns the full history to send.
    ///
    /// A user turn still pending from a request that was dropped mid-flight
    /// is replaced rather than sent twice.
    pub fn begin_turn(&mut self, text: &str) -> &[Turn] {
        self.abandon_turn();
        self.turns.push(Turn::user(text));
        &self.turns
    }

    pub fn complete_turn(&mut self, reply: &str) {
        debug_assert!(self.turns.last().is_some_and(|turn| turn.role.is_user()));
        self.turns.push(Turn::assistant(reply));
    }

    /// Drops the pending user turn opened by [`Conversation::begin_turn`].
    pub fn abandon_turn(&mut self) {
        if self.turns.last().is_some_and(|turn| turn.role.is_user()) {
            self.turns.pop();
        }
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        assert_eq!(Role::try_from("user"), Ok(Role::User));
        assert_eq!(Role::try_from("assistant"), Ok(Role::Assistant));
        assert!(Role::try_from("system").is_err());
        assert_eq!(String::from(Role::Assistant), "assistant");
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn turn_serializes_role_as_string() {
        let json = serde_json::to_string(&Turn::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn completed_turns_alternate() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.begin_turn("hello").len(), 1);
        conversation.complete_turn("hi there");
        conversation.begin_turn("how are you?");
        conversation.complete_turn("fine");

        let roles: Vec<Role> = conversation.snapshot().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[test]
    fn abandon_turn_rolls_back_only_the_pending_user_turn() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("hello");
        conversation.complete_turn("hi");
        conversation.begin_turn("this one fails");
        conversation.abandon_turn();

        assert_eq!(
            conversation.snapshot(),
            vec![Turn::user("hello"), Turn::assistant("hi")]
        );

        // Nothing pending: the assistant turn must survive.
        conversation.abandon_turn();
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn begin_turn_replaces_a_turn_left_pending() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("hello");
        conversation.complete_turn("hi");
        conversation.begin_turn("cancelled before any reply");

        let sent = conversation.begin_turn("next");
        assert_eq!(
            sent,
            &[Turn::user("hello"), Turn::assistant("hi"), Turn::user("next")]
        );
    }

    #[test]
    fn snapshot_is_detached_from_internal_state() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("hello");
        conversation.complete_turn("hi");

        let mut copy = conversation.snapshot();
        copy.clear();
        assert_eq!(conversation.len(), 2);

        conversation.clear();
        assert!(conversation.is_empty());
    }
}
