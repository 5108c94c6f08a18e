//! Pure navigation reducer.
//!
//! [`transition`] consumes the whole state and an event and returns the next
//! state plus the effects to run. It performs no I/O, so every ordering of
//! triggers and completions can be replayed in tests.

use tracing::debug;

use crate::domain::{
    AppRoute, PageId, PageRef, PageSlug, RoomName, RoomSelection, normalize_path, room_path,
};

use super::event::{NavigationEffect, NavigationEvent, Transition};
use super::state::{
    AutoSelect, LookupOrigin, NavigationState, PendingSlugSwitch, SlugFetch, SlugLookup, Ticket,
};

/// Pushed when the public pseudo-room becomes active over a tenant path.
const NEUTRAL_PATH: &str = "/dashboard";

/// Apply `event` to `state`.
///
/// # Examples
/// ```
/// use wiki_client::domain::navigation::{NavigationEvent, NavigationState, transition};
///
/// let step = transition(NavigationState::new("/"), NavigationEvent::PageDeleted);
/// assert!(step.state.selected_page().is_none());
/// assert!(step.effects.is_empty());
/// ```
pub fn transition(state: NavigationState, event: NavigationEvent) -> Transition {
    let mut step = Step {
        state,
        effects: Vec::new(),
    };
    step.apply(event);
    step.settle();
    Transition {
        state: step.state,
        effects: step.effects,
    }
}

struct Step {
    state: NavigationState,
    effects: Vec<NavigationEffect>,
}

impl Step {
    fn apply(&mut self, event: NavigationEvent) {
        match event {
            NavigationEvent::RoomsLoaded { rooms, active } => self.on_rooms_loaded(rooms, active),
            NavigationEvent::Startup { path } => self.on_startup(&path),
            NavigationEvent::RoomChanged(selection) => self.on_room_changed(selection),
            NavigationEvent::RoomSwitchRequested { room } => self.on_switch_requested(room),
            NavigationEvent::PageSelected { page, slug } => self.on_page_selected(page, slug),
            NavigationEvent::PageDeleted => self.on_page_deleted(),
            NavigationEvent::HistoryNavigated { path } => self.on_history(&path),
            NavigationEvent::SlugResolved { ticket, room, page } => {
                self.on_slug_resolved(ticket, &room, page);
            }
            NavigationEvent::PageSlugResolved {
                ticket,
                room,
                page,
                slug,
            } => self.on_page_slug_resolved(ticket, &room, page, slug),
            NavigationEvent::PagesListed {
                ticket,
                room,
                first_page,
            } => self.on_pages_listed(ticket, &room, first_page),
        }
    }

    fn on_rooms_loaded(&mut self, rooms: Vec<RoomName>, active: Option<RoomSelection>) {
        self.state.rooms.loaded = true;
        self.state.rooms.known = rooms;
        match active {
            Some(selection) => self.on_room_changed(selection),
            None => {
                if self.state.rooms.active.take().is_some() {
                    self.state.rooms.welcome_page = None;
                    self.clear_selection();
                    self.state.lookup = None;
                    self.state.listing_epoch += 1;
                }
            }
        }
    }

    fn on_startup(&mut self, path: &str) {
        if self.state.url_handled || !self.state.rooms.loaded {
            return;
        }
        self.state.location = normalize_path(path);
        self.state.url_handled = true;
        self.state.url_dirty = false;

        match AppRoute::parse(path) {
            route if route.is_surface() => self.state.auto_select = AutoSelect::Done,
            AppRoute::Room(room) => {
                if self.state.rooms.is_known(&room) && !self.state.rooms.is_active(&room) {
                    self.request_switch(room);
                }
            }
            AppRoute::RoomPage { room, slug } => {
                self.navigate_to_slug(room, slug, LookupOrigin::Initial);
            }
            _ => {}
        }
    }

    fn on_room_changed(&mut self, selection: RoomSelection) {
        if self.state.rooms.is_active(&selection.name) {
            self.state.rooms.welcome_page = selection.welcome_page;
            return;
        }
        let RoomSelection { name, welcome_page } = selection;
        self.state.rooms.active = Some(name.clone());
        self.state.rooms.welcome_page = welcome_page;

        if let Some(pending) = self.state.pending_slug_switch.clone() {
            if pending.room == name {
                self.start_lookup(pending.room, pending.slug, LookupOrigin::PendingSwitch);
            } else {
                debug!(room = %name, pending = %pending.room, "room change while URL switch pending");
            }
            return;
        }

        if self.state.navigating_from_url {
            self.state.navigating_from_url = false;
            self.state.listing_epoch += 1;
            return;
        }

        self.clear_selection();
        self.state.lookup = None;
        self.state.listing_epoch += 1;
        self.state.auto_select = AutoSelect::Armed;
        self.state.url_dirty = true;
    }

    fn on_switch_requested(&mut self, room: RoomName) {
        self.state.pending_slug_switch = None;
        self.state.navigating_from_url = false;
        self.state.lookup = None;
        if !self.state.rooms.is_active(&room) {
            self.request_switch(room);
        }
    }

    fn on_page_selected(&mut self, page: PageId, slug: Option<PageSlug>) {
        self.state.pending_slug_switch = None;
        self.state.navigating_from_url = false;
        self.state.lookup = None;
        self.state.slug_fetch = None;
        self.state.slug_unavailable = false;
        self.state.dangling_slug = None;
        self.state.selected_page = Some(page);
        self.state.resolved_slug = slug;
        self.state.auto_select = AutoSelect::Done;
        self.state.url_dirty = true;
    }

    fn on_page_deleted(&mut self) {
        self.clear_selection();
        self.state.listing_epoch += 1;
        self.state.auto_select = AutoSelect::Armed;
        self.state.url_dirty = true;
    }

    fn on_history(&mut self, path: &str) {
        self.state.location = normalize_path(path);
        if !self.state.url_handled {
            return;
        }
        self.state.pending_slug_switch = None;
        self.state.navigating_from_url = false;
        self.state.lookup = None;
        self.state.slug_fetch = None;
        self.state.url_dirty = false;

        match AppRoute::parse(path) {
            AppRoute::RoomPage { room, slug } => {
                self.state.dangling_slug = None;
                self.navigate_to_slug(room, slug, LookupOrigin::History);
            }
            route => {
                self.clear_selection();
                self.state.auto_select = AutoSelect::Done;
                if let AppRoute::Room(room) = route
                    && self.state.rooms.is_known(&room)
                    && !self.state.rooms.is_active(&room)
                {
                    self.state.navigating_from_url = true;
                    self.effects.push(NavigationEffect::SwitchRoom { room });
                }
            }
        }
    }

    fn on_slug_resolved(&mut self, ticket: Ticket, room: &RoomName, page: Option<PageRef>) {
        let current = self.state.lookup.as_ref().is_some_and(|lookup| {
            lookup.ticket == ticket && &lookup.room == room && self.state.rooms.is_active(room)
        });
        if !current {
            debug!(ticket = ticket.get(), room = %room, "discarding stale slug lookup");
            return;
        }
        let Some(lookup) = self.state.lookup.take() else {
            return;
        };

        match page {
            Some(page) => {
                self.state.selected_page = Some(page.id);
                self.state.resolved_slug = Some(page.slug);
                self.state.slug_unavailable = false;
                self.state.dangling_slug = None;
                self.state.url_dirty = true;
            }
            None => {
                debug!(room = %room, slug = %lookup.slug, "URL slug did not resolve");
                self.clear_selection();
                self.state.dangling_slug = Some(lookup.slug);
            }
        }
        self.state.auto_select = AutoSelect::Done;
        if lookup.origin == LookupOrigin::PendingSwitch {
            self.state.pending_slug_switch = None;
            self.state.navigating_from_url = false;
        }
    }

    fn on_page_slug_resolved(
        &mut self,
        ticket: Ticket,
        room: &RoomName,
        page: PageId,
        slug: Option<PageSlug>,
    ) {
        let current = self.state.slug_fetch.as_ref().is_some_and(|fetch| {
            fetch.ticket == ticket
                && &fetch.room == room
                && fetch.page == page
                && self.state.selected_page == Some(page)
                && self.state.rooms.is_active(room)
        });
        if !current {
            debug!(ticket = ticket.get(), room = %room, "discarding stale slug fetch");
            return;
        }
        self.state.slug_fetch = None;
        match slug {
            Some(slug) => self.state.resolved_slug = Some(slug),
            None => self.state.slug_unavailable = true,
        }
    }

    fn on_pages_listed(&mut self, ticket: Ticket, room: &RoomName, first_page: Option<PageRef>) {
        let current = matches!(
            &self.state.auto_select,
            AutoSelect::Requested { ticket: requested, room: listed }
                if *requested == ticket && listed == room
        ) && self.state.rooms.is_active(room);
        if !current {
            debug!(ticket = ticket.get(), room = %room, "discarding stale page listing");
            return;
        }
        self.state.auto_select = AutoSelect::Done;
        if self.state.selected_page.is_some() {
            return;
        }

        if let Some(page) = first_page {
            self.state.selected_page = Some(page.id);
            self.state.resolved_slug = Some(page.slug);
        } else if let Some(welcome) = self.state.rooms.welcome_page {
            self.state.selected_page = Some(welcome);
            self.state.resolved_slug = None;
        }
        self.state.url_dirty = true;
    }

    /// Same-room slugs resolve now; other rooms are switched to first.
    fn navigate_to_slug(&mut self, room: RoomName, slug: PageSlug, origin: LookupOrigin) {
        if self.state.rooms.is_active(&room) {
            self.start_lookup(room, slug, origin);
            return;
        }
        self.clear_selection();
        self.state.navigating_from_url = true;
        self.state.pending_slug_switch = Some(PendingSlugSwitch {
            room: room.clone(),
            slug,
        });
        self.effects.push(NavigationEffect::SwitchRoom { room });
    }

    /// The reset that follows the switch re-arms the fallback.
    fn request_switch(&mut self, room: RoomName) {
        self.state.auto_select = AutoSelect::Done;
        self.effects.push(NavigationEffect::SwitchRoom { room });
    }

    fn start_lookup(&mut self, room: RoomName, slug: PageSlug, origin: LookupOrigin) {
        let ticket = self.state.issue_ticket();
        self.state.lookup = Some(SlugLookup {
            ticket,
            room: room.clone(),
            slug: slug.clone(),
            origin,
        });
        self.effects
            .push(NavigationEffect::ResolveSlug { ticket, room, slug });
    }

    fn clear_selection(&mut self) {
        self.state.selected_page = None;
        self.state.resolved_slug = None;
        self.state.slug_fetch = None;
        self.state.slug_unavailable = false;
        self.state.dangling_slug = None;
    }

    /// Run the fallback and the outbound URL sync once no trigger is pending.
    fn settle(&mut self) {
        self.maybe_auto_select();
        self.maybe_sync_url();
    }

    fn maybe_auto_select(&mut self) {
        let state = &self.state;
        let idle = state.url_handled
            && state.auto_select == AutoSelect::Armed
            && state.selected_page.is_none()
            && state.dangling_slug.is_none()
            && !state.navigation_in_flight();
        let Some(room) = state.rooms.active.clone().filter(|_| idle) else {
            return;
        };
        let ticket = self.state.issue_ticket();
        self.state.auto_select = AutoSelect::Requested {
            ticket,
            room: room.clone(),
        };
        self.effects
            .push(NavigationEffect::ListPages { ticket, room });
    }

    fn maybe_sync_url(&mut self) {
        let state = &self.state;
        if !state.url_dirty
            || !state.url_handled
            || state.navigation_in_flight()
            || matches!(state.auto_select, AutoSelect::Requested { .. })
        {
            return;
        }
        let Some(room) = state.rooms.active.clone() else {
            self.state.url_dirty = false;
            return;
        };
        if room.is_public() {
            self.state.url_dirty = false;
            self.leave_tenant_path();
            return;
        }

        let path = match (self.state.selected_page, self.state.resolved_slug.clone()) {
            (None, _) => room_path(&room, None),
            (Some(_), Some(slug)) => room_path(&room, Some(&slug)),
            (Some(_), None) if self.state.slug_unavailable => room_path(&room, None),
            (Some(_), None) if self.state.slug_fetch.is_some() => return,
            (Some(page), None) => {
                let ticket = self.state.issue_ticket();
                self.state.slug_fetch = Some(SlugFetch {
                    ticket,
                    room: room.clone(),
                    page,
                });
                self.effects
                    .push(NavigationEffect::ResolvePageSlug { ticket, room, page });
                return;
            }
        };

        self.state.url_dirty = false;
        self.push_url(path);
    }

    /// The public pseudo-room has no path of its own, so a tenant path is
    /// replaced by the neutral one.
    fn leave_tenant_path(&mut self) {
        let names_tenant = AppRoute::parse(&self.state.location)
            .room()
            .is_some_and(|room| !room.is_public());
        if names_tenant {
            self.push_url(NEUTRAL_PATH.to_owned());
        }
    }

    fn push_url(&mut self, path: String) {
        if path != self.state.location {
            self.state.location.clone_from(&path);
            self.effects.push(NavigationEffect::PushUrl { path });
        }
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
