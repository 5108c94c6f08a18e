//! Navigation state owned by the coordinator.

use crate::domain::{PageId, PageSlug, RoomName, normalize_path};

/// Generation number attached to every asynchronous request.
///
/// A completion whose ticket no longer matches the request recorded in the
/// state is stale and is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw generation number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Deferred URL navigation that waits for a room switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSlugSwitch {
    /// Room named by the URL.
    pub room: RoomName,
    /// Slug to resolve once `room` is active.
    pub slug: PageSlug,
}

/// What started a slug-to-id lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LookupOrigin {
    Initial,
    History,
    PendingSwitch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlugLookup {
    pub(crate) ticket: Ticket,
    pub(crate) room: RoomName,
    pub(crate) slug: PageSlug,
    pub(crate) origin: LookupOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlugFetch {
    pub(crate) ticket: Ticket,
    pub(crate) room: RoomName,
    pub(crate) page: PageId,
}

/// Status of the "select something when nothing is selected" fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AutoSelect {
    Armed,
    Requested { ticket: Ticket, room: RoomName },
    Done,
}

/// The coordinator's view of the tenant registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RoomsView {
    pub(crate) loaded: bool,
    pub(crate) known: Vec<RoomName>,
    pub(crate) active: Option<RoomName>,
    pub(crate) welcome_page: Option<PageId>,
}

impl RoomsView {
    pub(crate) fn is_known(&self, room: &RoomName) -> bool {
        self.known.contains(room)
    }

    pub(crate) fn is_active(&self, room: &RoomName) -> bool {
        self.active.as_ref() == Some(room)
    }
}

/// Coarse phase derived from the in-flight work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in flight.
    Idle,
    /// Resolving a slug taken from the URL in the active room.
    ResolvingUrl,
    /// Waiting for the room named by the URL to become active.
    SwitchingRoomForPendingSlug,
    /// Resolving the selected page's slug to rewrite the URL.
    SyncingUrlToSelection,
}

/// Selection, URL and in-flight bookkeeping of the navigation core.
///
/// ## Invariants
/// - `url_handled` never goes back to `false`.
/// - `pending_slug_switch` set implies `navigating_from_url` set.
/// - At most one slug lookup, one slug fetch and one page listing are in
///   flight; each is identified by a [`Ticket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub(crate) selected_page: Option<PageId>,
    pub(crate) resolved_slug: Option<PageSlug>,
    pub(crate) url_handled: bool,
    pub(crate) navigating_from_url: bool,
    pub(crate) pending_slug_switch: Option<PendingSlugSwitch>,
    pub(crate) rooms: RoomsView,
    pub(crate) location: String,
    pub(crate) lookup: Option<SlugLookup>,
    pub(crate) slug_fetch: Option<SlugFetch>,
    pub(crate) slug_unavailable: bool,
    pub(crate) auto_select: AutoSelect,
    pub(crate) dangling_slug: Option<PageSlug>,
    pub(crate) url_dirty: bool,
    pub(crate) next_ticket: u64,
    pub(crate) listing_epoch: u64,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new("/")
    }
}

impl NavigationState {
    /// Fresh state for a browser currently showing `location`.
    pub fn new(location: &str) -> Self {
        Self {
            selected_page: None,
            resolved_slug: None,
            url_handled: false,
            navigating_from_url: false,
            pending_slug_switch: None,
            rooms: RoomsView::default(),
            location: normalize_path(location),
            lookup: None,
            slug_fetch: None,
            slug_unavailable: false,
            auto_select: AutoSelect::Armed,
            dangling_slug: None,
            url_dirty: false,
            next_ticket: 0,
            listing_epoch: 0,
        }
    }

    /// Selected page.
    pub fn selected_page(&self) -> Option<PageId> {
        self.selected_page
    }

    /// Cached slug of the selected page.
    pub fn resolved_slug(&self) -> Option<&PageSlug> {
        self.resolved_slug.as_ref()
    }

    /// Whether the initial URL has been processed.
    pub fn url_handled(&self) -> bool {
        self.url_handled
    }

    /// Whether a URL-driven room switch is in progress.
    pub fn navigating_from_url(&self) -> bool {
        self.navigating_from_url
    }

    /// Deferred URL navigation, if any.
    pub fn pending_slug_switch(&self) -> Option<&PendingSlugSwitch> {
        self.pending_slug_switch.as_ref()
    }

    /// Active room as last reported by the registry.
    pub fn active_room(&self) -> Option<&RoomName> {
        self.rooms.active.as_ref()
    }

    /// Browser path the coordinator believes is current.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// URL slug that did not resolve to a page.
    pub fn dangling_slug(&self) -> Option<&PageSlug> {
        self.dangling_slug.as_ref()
    }

    /// Counter bumped whenever the page listing should reload.
    pub fn listing_epoch(&self) -> u64 {
        self.listing_epoch
    }

    /// Whether the auto-select fallback may still fire.
    pub fn fallback_armed(&self) -> bool {
        self.auto_select == AutoSelect::Armed
    }

    /// Phase derived from the in-flight work.
    pub fn phase(&self) -> Phase {
        if self.pending_slug_switch.is_some() {
            Phase::SwitchingRoomForPendingSlug
        } else if self.lookup.is_some() {
            Phase::ResolvingUrl
        } else if self.slug_fetch.is_some() {
            Phase::SyncingUrlToSelection
        } else {
            Phase::Idle
        }
    }

    pub(crate) fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Whether any request that blocks URL sync is in flight.
    pub(crate) fn navigation_in_flight(&self) -> bool {
        self.lookup.is_some() || self.pending_slug_switch.is_some() || self.navigating_from_url
    }
}
