//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the navigation core expects to talk to the wiki server,
//! the token persistence layer and the browser history. Each trait exposes a
//! strongly typed error so adapters map their failures into predictable
//! variants.

mod macros;

mod auth_gateway;
mod browser_history;
mod page_directory;
mod page_search;
mod public_share;
mod room_directory;
mod token_store;

pub(crate) use macros::define_port_error;

pub use auth_gateway::{AuthGateway, AuthGatewayError};
pub use browser_history::BrowserHistory;
pub use page_directory::{PageDirectory, PageDirectoryError};
pub use page_search::{PageSearch, PageSearchError};
pub use public_share::{PublicRoomInfo, PublicShare, PublicShareError};
pub use room_directory::{RoomDirectory, RoomDirectoryError};
pub use token_store::{MemoryTokenStore, TokenStore, TokenStoreError};

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
#[cfg(test)]
pub use page_directory::MockPageDirectory;
#[cfg(test)]
pub use room_directory::MockRoomDirectory;

use super::{AccessToken, RoomName};

/// Authentication and tenant scoping attached to one outbound request.
///
/// The tenant is omitted for the public pseudo-room, so the server falls back
/// to its shared schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestScope {
    token: Option<AccessToken>,
    tenant: Option<RoomName>,
}

impl RequestScope {
    /// Scope for an authenticated request against `room`.
    ///
    /// # Examples
    /// ```
    /// use wiki_client::domain::{AccessToken, RoomName};
    /// use wiki_client::domain::ports::RequestScope;
    ///
    /// let token = AccessToken::new("t").unwrap();
    /// let scope = RequestScope::for_room(&token, &RoomName::public());
    /// assert!(scope.tenant().is_none());
    /// ```
    pub fn for_room(token: &AccessToken, room: &RoomName) -> Self {
        Self {
            token: Some(token.clone()),
            tenant: (!room.is_public()).then(|| room.clone()),
        }
    }

    /// Scope for an authenticated request that is not room bound.
    pub fn authenticated(token: &AccessToken) -> Self {
        Self {
            token: Some(token.clone()),
            tenant: None,
        }
    }

    /// Scope for an unauthenticated request.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Bearer token, if any.
    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Tenant header value, if any.
    pub fn tenant(&self) -> Option<&RoomName> {
        self.tenant.as_ref()
    }
}
