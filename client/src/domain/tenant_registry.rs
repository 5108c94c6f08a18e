//! Tenant registry: the room list, the active room and the caller's role.
//!
//! The registry publishes every active-room change through a
//! [`tokio::sync::watch`] channel at the moment it happens, before any role
//! request tied to that change is issued. Role responses carry a ticket and are
//! discarded once a newer room change has superseded them.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ports::{RoomDirectory, RoomDirectoryError};
use crate::domain::{Capabilities, Error, PageId, Role, Room, RoomName, RoomSelection, Session};

/// Sink for room switches requested by the navigation coordinator.
pub trait RoomSwitcher {
    /// Make `room` active immediately and return its navigation projection.
    fn switch_room(&mut self, room: &RoomName) -> RoomSelection;
}

/// Handle for one in-flight role request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTicket {
    seq: u64,
    room: RoomName,
}

impl RoleTicket {
    /// Room the role is requested for.
    pub fn room(&self) -> &RoomName {
        &self.room
    }
}

fn map_directory_error(error: RoomDirectoryError) -> Error {
    match error {
        RoomDirectoryError::Unauthorized => Error::unauthorized(error.to_string()),
        RoomDirectoryError::Forbidden { .. } => Error::forbidden(error.to_string()),
        RoomDirectoryError::Transport { .. } => Error::network(error.to_string()),
        RoomDirectoryError::Decode { .. } => Error::internal(error.to_string()),
    }
}

/// Room state for the signed-in user.
pub struct TenantRegistry {
    directory: Arc<dyn RoomDirectory>,
    rooms: Vec<Room>,
    active: Option<RoomName>,
    role: Option<Role>,
    role_seq: u64,
    loaded: bool,
    default_logo: Option<String>,
    default_logo_fetched: bool,
    changes: watch::Sender<Option<RoomName>>,
}

impl TenantRegistry {
    /// Build an empty registry.
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            directory,
            rooms: Vec::new(),
            active: None,
            role: None,
            role_seq: 0,
            loaded: false,
            default_logo: None,
            default_logo_fetched: false,
            changes,
        }
    }

    /// Subscribe to raw active-room changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<RoomName>> {
        self.changes.subscribe()
    }

    /// Rooms in server order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Whether a room list has been loaded for the current session.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Active room name.
    pub fn active_room(&self) -> Option<&RoomName> {
        self.active.as_ref()
    }

    /// Metadata of the active room, when it is listed.
    pub fn active(&self) -> Option<&Room> {
        let active = self.active.as_ref()?;
        self.find(active)
    }

    /// Caller's role in the active room, once fetched.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Reload the room list. Idempotent.
    ///
    /// When the active room is unset, the public pseudo-room, or no longer
    /// listed, the first listed room becomes active. Returns the selection
    /// when the active room changed to a listed room.
    pub async fn refresh(&mut self, session: &Session) -> Result<Option<RoomSelection>, Error> {
        let rooms = self
            .directory
            .my_rooms(session.token())
            .await
            .map_err(map_directory_error)?;
        debug!(count = rooms.len(), "room list loaded");
        self.rooms = rooms;
        self.loaded = true;
        self.fetch_default_logo().await;

        let keep_active = self
            .active
            .as_ref()
            .is_some_and(|active| !active.is_public() && self.find(active).is_some());
        if keep_active {
            return Ok(None);
        }

        match self.rooms.first().map(|room| room.name.clone()) {
            Some(first) => Ok(Some(self.switch_room(&first))),
            None => {
                if self.active.take().is_some() {
                    self.role = None;
                    self.role_seq += 1;
                    self.changes.send_replace(None);
                }
                Ok(None)
            }
        }
    }

    /// Start a role request for the active room. Returns `None` when no room
    /// is active or the public pseudo-room is active.
    pub fn begin_role_fetch(&mut self) -> Option<RoleTicket> {
        let room = self.active.clone().filter(|room| !room.is_public())?;
        self.role_seq += 1;
        Some(RoleTicket {
            seq: self.role_seq,
            room,
        })
    }

    /// Apply a role response. Returns `false` when the ticket is stale.
    pub fn apply_role(&mut self, ticket: &RoleTicket, role: Option<Role>) -> bool {
        let current = ticket.seq == self.role_seq && self.active.as_ref() == Some(&ticket.room);
        if current {
            self.role = role;
        } else {
            debug!(room = %ticket.room, "discarding role for superseded room");
        }
        current
    }

    /// Fetch and apply the caller's role for the active room.
    pub async fn load_role(&mut self, session: &Session) -> Result<(), Error> {
        let Some(ticket) = self.begin_role_fetch() else {
            return Ok(());
        };
        let role = self
            .directory
            .my_role(session.token(), ticket.room())
            .await
            .map_err(map_directory_error)?;
        self.apply_role(&ticket, role);
        Ok(())
    }

    /// Capability flags for `session` in the active room.
    pub fn capabilities(&self, session: Option<&Session>) -> Capabilities {
        Capabilities::derive(
            session.is_some_and(Session::is_superuser),
            self.active.is_some(),
            self.role,
        )
    }

    /// Logo of the active room, falling back to the installation default.
    pub fn current_logo(&self) -> Option<&str> {
        self.active()
            .and_then(|room| room.logo_url.as_deref())
            .or(self.default_logo.as_deref())
    }

    /// Welcome page of the active room.
    pub fn welcome_page_id(&self) -> Option<PageId> {
        self.active().and_then(|room| room.welcome_page_id)
    }

    /// Share slug of the active room when it is published.
    pub fn current_public_slug(&self) -> Option<&str> {
        self.active().and_then(|room| room.public_slug.as_deref())
    }

    /// Label of the active room; the raw name when it is not listed.
    pub fn active_display_name(&self) -> Option<&str> {
        match self.active() {
            Some(room) => Some(room.display_name.as_str()),
            None => self.active.as_ref().map(RoomName::as_str),
        }
    }

    /// Forget everything loaded for the previous session.
    pub fn clear(&mut self) {
        self.rooms.clear();
        self.loaded = false;
        self.role = None;
        self.role_seq += 1;
        if self.active.take().is_some() {
            self.changes.send_replace(None);
        }
    }

    fn find(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.name == name)
    }

    async fn fetch_default_logo(&mut self) {
        if self.default_logo_fetched {
            return;
        }
        match self.directory.default_logo().await {
            Ok(logo) => {
                self.default_logo = logo;
                self.default_logo_fetched = true;
            }
            Err(error) => warn!(%error, "default logo unavailable"),
        }
    }
}

impl RoomSwitcher for TenantRegistry {
    fn switch_room(&mut self, room: &RoomName) -> RoomSelection {
        info!(room = %room, "switching room");
        self.active = Some(room.clone());
        self.role = None;
        self.role_seq += 1;
        self.changes.send_replace(Some(room.clone()));
        self.find(room).map_or_else(
            || RoomSelection {
                name: room.clone(),
                welcome_page: None,
            },
            Room::selection,
        )
    }
}

#[cfg(test)]
#[path = "tenant_registry_tests.rs"]
mod tests;
