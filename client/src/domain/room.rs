//! Rooms (tenants), roles and the capability flags derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::page::PageId;
use super::slug::is_valid_segment;

/// Name of the distinguished pseudo-room for publicly shared content.
///
/// Requests scoped to it carry no tenant header.
pub const PUBLIC_ROOM: &str = "public";

/// Validation errors returned by [`RoomName::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomNameValidationError {
    /// Room name was empty or padded with whitespace.
    #[error("room name must be a non-empty, trimmed value")]
    Empty,
    /// Room name cannot be used as a single URL path segment.
    #[error("room name may only contain letters, digits, '-' or '_'")]
    InvalidCharacters,
}

/// Unique room key, also used as the tenant scope value.
///
/// # Examples
/// ```
/// use wiki_client::domain::RoomName;
///
/// let room = RoomName::new("teamA").unwrap();
/// assert!(!room.is_public());
/// assert!(RoomName::public().is_public());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    /// Validate and construct a room name.
    pub fn new(raw: impl Into<String>) -> Result<Self, RoomNameValidationError> {
        let raw = raw.into();
        if raw.is_empty() || raw.trim() != raw {
            return Err(RoomNameValidationError::Empty);
        }
        if !is_valid_segment(&raw) {
            return Err(RoomNameValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// The public pseudo-room.
    pub fn public() -> Self {
        Self(PUBLIC_ROOM.to_owned())
    }

    /// Whether this is the public pseudo-room.
    pub fn is_public(&self) -> bool {
        self.0 == PUBLIC_ROOM
    }

    /// Borrow the room name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for RoomName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RoomName {
    type Error = RoomNameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomName> for String {
    fn from(value: RoomName) -> Self {
        value.0
    }
}

/// Room metadata as listed for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique key.
    pub name: RoomName,
    /// Label shown in the room picker.
    pub display_name: String,
    /// Server-relative logo path.
    pub logo_url: Option<String>,
    /// Page shown when nothing else is selected.
    pub welcome_page_id: Option<PageId>,
    /// Share slug when the room is published.
    pub public_slug: Option<String>,
}

impl Room {
    /// Navigation-relevant projection of this room.
    pub fn selection(&self) -> RoomSelection {
        RoomSelection {
            name: self.name.clone(),
            welcome_page: self.welcome_page_id,
        }
    }
}

/// The part of a room the navigation core needs when it becomes active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSelection {
    /// Newly active room.
    pub name: RoomName,
    /// Welcome page configured for the room, if any.
    pub welcome_page: Option<PageId>,
}

/// Permission level of a user inside one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full control, including membership.
    Owner,
    /// Room administration.
    Admin,
    /// May edit pages.
    Editor,
    /// Read only.
    Viewer,
}

impl Role {
    /// Whether the role permits editing.
    pub const fn can_edit(self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
        };
        f.write_str(label)
    }
}

/// Capability flags consumed by the content surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    /// The editor may modify the selected page.
    pub can_edit: bool,
    /// The administration surface is reachable.
    pub can_admin: bool,
}

impl Capabilities {
    /// Derive capability flags.
    ///
    /// Superuser status overrides every room-scoped check. Without an active
    /// room, or while the role is unknown, editing is not permitted.
    ///
    /// # Examples
    /// ```
    /// use wiki_client::domain::{Capabilities, Role};
    ///
    /// let caps = Capabilities::derive(false, true, Some(Role::Viewer));
    /// assert!(!caps.can_edit);
    /// assert!(Capabilities::derive(true, false, None).can_edit);
    /// ```
    pub fn derive(is_superuser: bool, has_active_room: bool, role: Option<Role>) -> Self {
        let can_edit = is_superuser || (has_active_room && role.is_some_and(Role::can_edit));
        Self {
            can_edit,
            can_admin: is_superuser,
        }
    }
}
