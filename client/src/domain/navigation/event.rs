//! Inputs and outputs of the navigation reducer.

use crate::domain::{PageId, PageRef, PageSlug, RoomName, RoomSelection};

use super::state::{NavigationState, Ticket};

/// Something that happened: a trigger or the completion of an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// The registry finished loading the room list.
    RoomsLoaded {
        /// Listed room names in server order.
        rooms: Vec<RoomName>,
        /// Active room after the load.
        active: Option<RoomSelection>,
    },
    /// First URL of the session; processed once.
    Startup {
        /// Browser path.
        path: String,
    },
    /// Raw active-room change published by the registry.
    RoomChanged(RoomSelection),
    /// The user picked a room.
    RoomSwitchRequested {
        /// Room picked.
        room: RoomName,
    },
    /// The user selected a page (sidebar, search hit, editor link).
    PageSelected {
        /// Page selected.
        page: PageId,
        /// Slug when the caller already knows it.
        slug: Option<PageSlug>,
    },
    /// The selected page was deleted.
    PageDeleted,
    /// Back/forward navigation landed on `path`.
    HistoryNavigated {
        /// Browser path.
        path: String,
    },
    /// Completion of [`NavigationEffect::ResolveSlug`].
    SlugResolved {
        /// Ticket of the request.
        ticket: Ticket,
        /// Room the request was scoped to.
        room: RoomName,
        /// Page found, if any.
        page: Option<PageRef>,
    },
    /// Completion of [`NavigationEffect::ResolvePageSlug`].
    PageSlugResolved {
        /// Ticket of the request.
        ticket: Ticket,
        /// Room the request was scoped to.
        room: RoomName,
        /// Page the slug was requested for.
        page: PageId,
        /// Slug found, if any.
        slug: Option<PageSlug>,
    },
    /// Completion of [`NavigationEffect::ListPages`].
    PagesListed {
        /// Ticket of the request.
        ticket: Ticket,
        /// Room the request was scoped to.
        room: RoomName,
        /// First page in display order, if any.
        first_page: Option<PageRef>,
    },
}

/// Work the reducer asks its runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEffect {
    /// Make `room` active in the registry.
    SwitchRoom {
        /// Room to activate.
        room: RoomName,
    },
    /// Resolve a slug to a page in `room`.
    ResolveSlug {
        /// Ticket for the completion.
        ticket: Ticket,
        /// Room to scope the lookup to.
        room: RoomName,
        /// Slug to resolve.
        slug: PageSlug,
    },
    /// Resolve a page id to its slug in `room`.
    ResolvePageSlug {
        /// Ticket for the completion.
        ticket: Ticket,
        /// Room to scope the lookup to.
        room: RoomName,
        /// Page to resolve.
        page: PageId,
    },
    /// List the pages of `room` for the auto-select fallback.
    ListPages {
        /// Ticket for the completion.
        ticket: Ticket,
        /// Room to list.
        room: RoomName,
    },
    /// Push a new browser history entry.
    PushUrl {
        /// Path to push.
        path: String,
    },
}

/// Result of one reducer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the event.
    pub state: NavigationState,
    /// Effects to run, in order.
    pub effects: Vec<NavigationEffect>,
}
