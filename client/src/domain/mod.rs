//! Domain primitives, ports and services of the navigation core.
//!
//! Purpose: keep the session, the active room, the selected page and the
//! browser URL in agreement. Types here are transport agnostic; adapters in
//! `outbound` implement the ports declared in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): client error payload.
//! - SessionStore, TenantRegistry, SlugResolver: stateful components.
//! - navigation: the reducer and its effect-executing coordinator.

pub mod error;
pub mod navigation;
pub mod page;
pub mod ports;
pub mod public_view;
pub mod room;
pub mod route;
pub mod search;
pub mod session;
pub mod session_store;
pub mod slug_resolver;
pub mod tenant_registry;

mod slug;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::page::{
    PageId, PageRef, PageSlug, PageSlugValidationError, PageTreeNode, PublicPage, SearchHit,
    count_pages, first_listed_page,
};
pub use self::public_view::{PublicView, PublicViewService};
pub use self::room::{
    Capabilities, PUBLIC_ROOM, Role, Room, RoomName, RoomNameValidationError, RoomSelection,
};
pub use self::route::{AppRoute, normalize_path, room_path};
pub use self::search::SearchService;
pub use self::session::{
    AccessToken, Credentials, CredentialsValidationError, Session, UserId, UserProfile,
};
pub use self::session_store::{SessionError, SessionStore};
pub use self::slug_resolver::{SlugResolver, TokenRejected};
pub use self::tenant_registry::{RoomSwitcher, TenantRegistry};

/// Convenient result alias for client operations.
///
/// # Examples
/// ```
/// use wiki_client::domain::{ClientResult, Error};
///
/// fn load() -> ClientResult<()> {
///     Err(Error::not_found("no such page"))
/// }
/// assert!(load().is_err());
/// ```
pub type ClientResult<T> = Result<T, Error>;
