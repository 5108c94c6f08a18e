//! Driven port for room membership lookups.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{AccessToken, Role, Room, RoomName};

define_port_error! {
    /// Errors surfaced by the room endpoints.
    pub enum RoomDirectoryError {
        /// The token is invalid or expired.
        Unauthorized => "token rejected by room directory",
        /// The caller may not see this room.
        Forbidden { message: String } => "room access denied: {message}",
        /// Network transport failed before receiving a response.
        Transport { message: String } => "room directory transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "room directory decode failed: {message}",
    }
}

/// Port for listing rooms and the caller's role in them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Rooms visible to the token's owner, in server order.
    async fn my_rooms(&self, token: &AccessToken) -> Result<Vec<Room>, RoomDirectoryError>;

    /// Role of the token's owner in `room`; `None` when not a member.
    async fn my_role(
        &self,
        token: &AccessToken,
        room: &RoomName,
    ) -> Result<Option<Role>, RoomDirectoryError>;

    /// Server-relative URL of the installation's default logo.
    async fn default_logo(&self) -> Result<Option<String>, RoomDirectoryError>;
}
