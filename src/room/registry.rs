use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use super::models::{MessageModel, RoomMember, RoomModel};
use crate::shared::AppError;

/// How many registry commands may queue before senders are backpressured
const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Result of attempting to join a room
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// Successfully joined, returns the updated room data
    Joined(RoomModel),
    /// Room does not exist
    RoomNotFound,
}

/// Result of attempting to append a message to a room
#[derive(Debug, Clone)]
pub enum AppendOutcome {
    /// Message stored; `recipients` is the room's broadcast group
    Stored {
        message: MessageModel,
        recipients: Vec<String>,
    },
    /// Room does not exist
    RoomNotFound,
}

/// Result of attempting to leave a room
#[derive(Debug, Clone)]
pub enum LeaveOutcome {
    /// Successfully left; `recipients` are the remaining members
    Left {
        recipients: Vec<String>,
        member_count: usize,
    },
    /// Room was deleted because no members remained
    RoomDeleted,
    /// Connection was not in the room
    NotInRoom,
    /// Room does not exist
    RoomNotFound,
}

/// One room a disconnecting connection departed from, with the
/// remaining members to notify. Rooms deleted by the departure are
/// not reported - there is nobody left to notify.
#[derive(Debug, Clone)]
pub struct RoomDeparture {
    pub code: String,
    pub recipients: Vec<String>,
    pub member_count: usize,
}

/// Typed commands processed by the registry task, one at a time
#[derive(Debug)]
enum RegistryCommand {
    CreateRoom {
        reply: oneshot::Sender<String>,
    },
    JoinRoom {
        code: String,
        member: RoomMember,
        reply: oneshot::Sender<JoinOutcome>,
    },
    AppendMessage {
        code: String,
        content: String,
        sender_id: String,
        sender: String,
        reply: oneshot::Sender<AppendOutcome>,
    },
    LeaveRoom {
        code: String,
        connection_id: String,
        reply: oneshot::Sender<LeaveOutcome>,
    },
    Disconnect {
        connection_id: String,
        reply: oneshot::Sender<Vec<RoomDeparture>>,
    },
    GetRoom {
        code: String,
        reply: oneshot::Sender<Option<RoomModel>>,
    },
    SweepInactive {
        threshold: Duration,
        reply: oneshot::Sender<usize>,
    },
}

/// The room registry: a single task owning all room state.
///
/// Commands arrive over an mpsc queue and each one is handled to
/// completion before the next is dequeued, so registry operations are
/// atomic with respect to each other without locking.
pub struct RoomRegistry {
    rooms: HashMap<String, RoomModel>,
}

impl RoomRegistry {
    /// Spawns the registry task and returns a cloneable handle to it
    pub fn spawn() -> RegistryHandle {
        let (sender, mut receiver) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let mut registry = RoomRegistry {
            rooms: HashMap::new(),
        };

        tokio::spawn(async move {
            debug!("Room registry task started");
            while let Some(command) = receiver.recv().await {
                registry.handle_command(command);
            }
            debug!("Room registry task stopped - all handles dropped");
        });

        RegistryHandle { sender }
    }

    fn handle_command(&mut self, command: RegistryCommand) {
        match command {
            RegistryCommand::CreateRoom { reply } => {
                let _ = reply.send(self.create_room());
            }
            RegistryCommand::JoinRoom {
                code,
                member,
                reply,
            } => {
                let _ = reply.send(self.join_room(&code, member));
            }
            RegistryCommand::AppendMessage {
                code,
                content,
                sender_id,
                sender,
                reply,
            } => {
                let _ = reply.send(self.append_message(&code, content, sender_id, sender));
            }
            RegistryCommand::LeaveRoom {
                code,
                connection_id,
                reply,
            } => {
                let _ = reply.send(self.leave_room(&code, &connection_id));
            }
            RegistryCommand::Disconnect {
                connection_id,
                reply,
            } => {
                let _ = reply.send(self.disconnect(&connection_id));
            }
            RegistryCommand::GetRoom { code, reply } => {
                let _ = reply.send(self.rooms.get(&code).cloned());
            }
            RegistryCommand::SweepInactive { threshold, reply } => {
                let _ = reply.send(self.sweep_inactive(threshold));
            }
        }
    }

    fn create_room(&mut self) -> String {
        let room = RoomModel::new();
        let code = room.code.clone();

        // No collision check against the 24-bit code space
        self.rooms.insert(code.clone(), room);

        info!(room_code = %code, room_count = self.rooms.len(), "Room created");
        code
    }

    fn join_room(&mut self, code: &str, member: RoomMember) -> JoinOutcome {
        let room = match self.rooms.get_mut(code) {
            Some(room) => room,
            None => {
                debug!(room_code = %code, "Join rejected, room not found");
                return JoinOutcome::RoomNotFound;
            }
        };

        room.add_member(member);
        room.touch();

        info!(
            room_code = %code,
            member_count = room.member_count(),
            "Member joined room"
        );

        JoinOutcome::Joined(room.clone())
    }

    fn append_message(
        &mut self,
        code: &str,
        content: String,
        sender_id: String,
        sender: String,
    ) -> AppendOutcome {
        let room = match self.rooms.get_mut(code) {
            Some(room) => room,
            None => {
                debug!(room_code = %code, "Message rejected, room not found");
                return AppendOutcome::RoomNotFound;
            }
        };

        let message = MessageModel::new(content, sender_id, sender);
        room.messages.push(message.clone());
        room.touch();

        debug!(
            room_code = %code,
            message_id = %message.id,
            message_count = room.messages.len(),
            "Message stored"
        );

        AppendOutcome::Stored {
            message,
            recipients: room.member_ids(),
        }
    }

    fn leave_room(&mut self, code: &str, connection_id: &str) -> LeaveOutcome {
        let room = match self.rooms.get_mut(code) {
            Some(room) => room,
            None => return LeaveOutcome::RoomNotFound,
        };

        if !room.has_member(connection_id) {
            return LeaveOutcome::NotInRoom;
        }

        room.remove_member(connection_id);

        if room.members.is_empty() {
            self.rooms.remove(code);
            info!(room_code = %code, "Room deleted after last member left");
            return LeaveOutcome::RoomDeleted;
        }

        info!(
            room_code = %code,
            member_count = room.member_count(),
            "Member left room"
        );

        LeaveOutcome::Left {
            recipients: room.member_ids(),
            member_count: room.member_count(),
        }
    }

    fn disconnect(&mut self, connection_id: &str) -> Vec<RoomDeparture> {
        let joined_codes: Vec<String> = self
            .rooms
            .values()
            .filter(|room| room.has_member(connection_id))
            .map(|room| room.code.clone())
            .collect();

        let mut departures = Vec::new();
        for code in joined_codes {
            match self.leave_room(&code, connection_id) {
                LeaveOutcome::Left {
                    recipients,
                    member_count,
                } => departures.push(RoomDeparture {
                    code,
                    recipients,
                    member_count,
                }),
                // Deleted rooms have nobody left to notify
                _ => {}
            }
        }

        debug!(
            connection_id = %connection_id,
            departed_rooms = departures.len(),
            "Connection disconnected"
        );

        departures
    }

    fn sweep_inactive(&mut self, threshold: Duration) -> usize {
        let now = chrono::Utc::now();
        let stale_codes: Vec<String> = self
            .rooms
            .values()
            .filter(|room| {
                now.signed_duration_since(room.last_activity_at)
                    .to_std()
                    .map_or(false, |idle| idle >= threshold)
            })
            .map(|room| room.code.clone())
            .collect();

        for code in &stale_codes {
            self.rooms.remove(code);
            info!(room_code = %code, "Deleted inactive room");
        }

        stale_codes.len()
    }
}

/// Cloneable handle to the registry task.
///
/// Each method sends a typed command and awaits the reply. Errors only
/// surface when the registry task itself is gone.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Creates a new room and returns its code
    #[instrument(skip(self))]
    pub async fn create_room(&self) -> Result<String, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(RegistryCommand::CreateRoom { reply }).await?;
        response.await.map_err(|_| AppError::RegistryUnavailable)
    }

    /// Adds a member to a room, returning the updated room snapshot
    #[instrument(skip(self, member))]
    pub async fn join_room(&self, code: &str, member: RoomMember) -> Result<JoinOutcome, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(RegistryCommand::JoinRoom {
            code: code.to_string(),
            member,
            reply,
        })
        .await?;
        response.await.map_err(|_| AppError::RegistryUnavailable)
    }

    /// Appends a message to a room; id and timestamp are assigned by the registry
    #[instrument(skip(self, content))]
    pub async fn append_message(
        &self,
        code: &str,
        content: String,
        sender_id: String,
        sender: String,
    ) -> Result<AppendOutcome, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(RegistryCommand::AppendMessage {
            code: code.to_string(),
            content,
            sender_id,
            sender,
            reply,
        })
        .await?;
        response.await.map_err(|_| AppError::RegistryUnavailable)
    }

    /// Removes a connection from a room, deleting the room if it empties
    #[instrument(skip(self))]
    pub async fn leave_room(
        &self,
        code: &str,
        connection_id: &str,
    ) -> Result<LeaveOutcome, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(RegistryCommand::LeaveRoom {
            code: code.to_string(),
            connection_id: connection_id.to_string(),
            reply,
        })
        .await?;
        response.await.map_err(|_| AppError::RegistryUnavailable)
    }

    /// Removes a connection from every room it appears in
    #[instrument(skip(self))]
    pub async fn disconnect(&self, connection_id: &str) -> Result<Vec<RoomDeparture>, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(RegistryCommand::Disconnect {
            connection_id: connection_id.to_string(),
            reply,
        })
        .await?;
        response.await.map_err(|_| AppError::RegistryUnavailable)
    }

    /// Read-only room lookup
    #[instrument(skip(self))]
    pub async fn get_room(&self, code: &str) -> Result<Option<RoomModel>, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(RegistryCommand::GetRoom {
            code: code.to_string(),
            reply,
        })
        .await?;
        response.await.map_err(|_| AppError::RegistryUnavailable)
    }

    /// Deletes rooms idle for at least `threshold`, returning the count
    #[instrument(skip(self))]
    pub async fn sweep_inactive(&self, threshold: Duration) -> Result<usize, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(RegistryCommand::SweepInactive { threshold, reply })
            .await?;
        response.await.map_err(|_| AppError::RegistryUnavailable)
    }

    async fn send(&self, command: RegistryCommand) -> Result<(), AppError> {
        self.sender.send(command).await.map_err(|_| {
            warn!("Room registry task is gone");
            AppError::RegistryUnavailable
        })
    }
}
