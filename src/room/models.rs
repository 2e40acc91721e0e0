use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// In-memory model for a chat room
#[derive(Debug, Clone)]
pub struct RoomModel {
    pub code: String, // 6 uppercase hex chars
    pub members: Vec<RoomMember>,
    pub messages: Vec<MessageModel>, // Arrival order
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

/// One connection's membership in a room
///
/// Membership is keyed by connection id; the display name is carried
/// alongside so two connections may share a name without collapsing
/// into one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMember {
    pub connection_id: String,
    pub display_name: String,
}

/// A chat message as stored and as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageModel {
    pub id: String, // 8 hex chars, unique per room
    pub content: String,
    pub sender_id: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
}

impl RoomModel {
    /// Creates a new empty room with a generated code
    pub fn new() -> Self {
        let code = generate_room_code();
        let now = Utc::now();

        Self {
            code,
            members: Vec::new(),
            messages: Vec::new(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Get the current number of members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Check if a connection is a member of this room
    pub fn has_member(&self, connection_id: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.connection_id == connection_id)
    }

    /// Add a member to the room; a duplicate connection id is a no-op
    pub fn add_member(&mut self, member: RoomMember) {
        if !self.has_member(&member.connection_id) {
            self.members.push(member);
        }
    }

    /// Remove a member from the room
    pub fn remove_member(&mut self, connection_id: &str) {
        self.members.retain(|m| m.connection_id != connection_id);
    }

    /// Connection ids of all members - the room's broadcast group
    pub fn member_ids(&self) -> Vec<String> {
        self.members
            .iter()
            .map(|m| m.connection_id.clone())
            .collect()
    }

    /// Display names of all members, in join order
    pub fn display_names(&self) -> Vec<String> {
        self.members
            .iter()
            .map(|m| m.display_name.clone())
            .collect()
    }

    /// Refresh the last-activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}

impl Default for RoomModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageModel {
    /// Creates a new message with generated id and current timestamp
    pub fn new(content: String, sender_id: String, sender: String) -> Self {
        Self {
            id: generate_message_id(),
            content,
            sender_id,
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// Generates a room code: 3 random bytes, hex-encoded and uppercased.
/// Collisions are not checked against the 24-bit space.
fn generate_room_code() -> String {
    let bytes: [u8; 3] = rand::random();
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Generates a message id: 4 random bytes, hex-encoded
fn generate_message_id() -> String {
    let bytes: [u8; 4] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
