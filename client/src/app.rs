//! Application shell wiring the session, the room registry and navigation.
//!
//! `WikiApp` is what an embedder (the CLI, a UI event loop, a test) drives.
//! It forwards user actions to the stateful components in the order the
//! navigation core expects: the raw room change reaches the coordinator
//! before the role fetch tied to it is started.
//!
//! The `*_navigated`, `select_*` and `switch_room` methods await every lookup
//! they cause. An event loop that must stay responsive uses the two-step
//! form instead: [`WikiApp::begin`] applies a trigger and returns the lookups
//! it started, [`WikiApp::lookup_runner`] performs them off to the side, and
//! [`WikiApp::complete`] feeds each result back. A trigger applied in between
//! supersedes the older lookups.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::navigation::{
    LookupRunner, NavigationCoordinator, NavigationError, NavigationEvent, PendingLookup,
};
use crate::domain::ports::{
    AuthGateway, BrowserHistory, PageDirectory, PageSearch, PublicShare, RoomDirectory, TokenStore,
};
use crate::domain::{
    AppRoute, Capabilities, ClientResult, Error, PageId, PageRef, PageSlug, PublicPage,
    PublicView, PublicViewService, Room, RoomName, SearchHit, SearchService, Session,
    SessionStore, TenantRegistry,
};

/// Parameter object bundling every port implementation the shell needs.
#[derive(Clone)]
pub struct WikiPorts {
    /// Sign-in and profile endpoints.
    pub auth: Arc<dyn AuthGateway>,
    /// Persisted bearer token.
    pub tokens: Arc<dyn TokenStore>,
    /// Room membership and roles.
    pub rooms: Arc<dyn RoomDirectory>,
    /// Tenant-scoped page lookups.
    pub pages: Arc<dyn PageDirectory>,
    /// Full-text search.
    pub search: Arc<dyn PageSearch>,
    /// Anonymous shared rooms.
    pub public: Arc<dyn PublicShare>,
    /// Browser location.
    pub history: Arc<dyn BrowserHistory>,
}

/// What the content surface should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    /// A persisted token is being validated or rooms are loading.
    Loading,
    /// No session.
    Login,
    /// Read-only shared room.
    PublicShare {
        /// Share slug from the URL.
        share: String,
    },
    /// Editor for the active room.
    Editor {
        /// Active room.
        room: RoomName,
        /// Selected page, if any.
        page: Option<PageId>,
        /// Slug of the selected page, once known.
        slug: Option<PageSlug>,
        /// Capability flags for the session in `room`.
        capabilities: Capabilities,
    },
    /// Dashboard or administration surface.
    Dashboard,
    /// Signed in but a member of no room.
    NoRooms,
}

/// The navigation core assembled over a set of ports.
pub struct WikiApp {
    session: SessionStore,
    registry: TenantRegistry,
    navigation: NavigationCoordinator,
    search: SearchService,
    public: PublicViewService,
    room_changes: watch::Receiver<Option<RoomName>>,
}

impl WikiApp {
    /// Assemble the shell. Nothing is fetched until [`Self::boot`].
    pub fn new(ports: WikiPorts) -> Self {
        let WikiPorts {
            auth,
            tokens,
            rooms,
            pages,
            search,
            public,
            history,
        } = ports;
        let registry = TenantRegistry::new(rooms);
        let room_changes = registry.subscribe();
        Self {
            session: SessionStore::new(auth, tokens),
            registry,
            navigation: NavigationCoordinator::new(pages, history),
            search: SearchService::new(search),
            public: PublicViewService::new(public),
            room_changes,
        }
    }

    /// Current session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.session()
    }

    /// Room registry.
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Navigation coordinator.
    pub fn navigation(&self) -> &NavigationCoordinator {
        &self.navigation
    }

    /// Restore a persisted session and process the startup URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the token file cannot be read or the room list
    /// cannot be loaded.
    pub async fn boot(&mut self) -> ClientResult<()> {
        self.session.restore().await?;
        self.enter_session().await
    }

    /// Sign in, then load rooms and process the current URL.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`crate::domain::SessionError`] when sign-in fails.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<()> {
        self.session.login(email, password).await?;
        self.enter_session().await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`crate::domain::SessionError`] when registration
    /// or the follow-up sign-in fails.
    pub async fn register(&mut self, email: &str, password: &str) -> ClientResult<()> {
        self.session.register(email, password).await?;
        self.enter_session().await
    }

    /// End the session and forget rooms and navigation state.
    pub fn logout(&mut self) {
        self.session.logout();
        self.reset_session_state();
    }

    /// The user selected a page whose identity is already known.
    pub async fn select_page(&mut self, page: PageRef) -> ClientResult<()> {
        self.dispatch(NavigationEvent::PageSelected {
            page: page.id,
            slug: Some(page.slug),
        })
        .await
    }

    /// The user selected a page by id only; its slug is resolved before the
    /// URL is written.
    pub async fn select_page_id(&mut self, page: PageId) -> ClientResult<()> {
        self.dispatch(NavigationEvent::PageSelected { page, slug: None })
            .await
    }

    /// The user picked a room.
    ///
    /// # Errors
    ///
    /// Returns [`Error::invalid_request`] for a malformed room name.
    pub async fn switch_room(&mut self, room: &str) -> ClientResult<()> {
        let room = RoomName::new(room)
            .map_err(|error| Error::invalid_request(format!("room {room}: {error}")))?;
        self.dispatch(NavigationEvent::RoomSwitchRequested { room })
            .await
    }

    /// Back/forward navigation landed on `path`.
    pub async fn history_navigated(&mut self, path: &str) -> ClientResult<()> {
        self.dispatch(NavigationEvent::HistoryNavigated {
            path: path.to_owned(),
        })
        .await
    }

    /// The selected page was deleted.
    pub async fn page_deleted(&mut self) -> ClientResult<()> {
        self.dispatch(NavigationEvent::PageDeleted).await
    }

    /// Apply a navigation trigger without awaiting the lookups it starts.
    ///
    /// # Errors
    ///
    /// Returns an auth failure, after ending the session, when the role
    /// fetch for a changed room is refused.
    pub async fn begin(&mut self, trigger: NavigationEvent) -> ClientResult<Vec<PendingLookup>> {
        let pending = self.navigation.apply(trigger, &mut self.registry);
        self.reload_role_if_room_changed().await?;
        Ok(pending)
    }

    /// Runner for lookups returned by [`Self::begin`] and [`Self::complete`],
    /// bound to the current session token.
    pub fn lookup_runner(&self) -> LookupRunner {
        self.navigation.runner(self.session.token().cloned())
    }

    /// Feed the outcome of a lookup back; stale outcomes are ignored.
    ///
    /// # Errors
    ///
    /// A refused or missing token ends the session and is returned as an
    /// auth failure.
    pub async fn complete(
        &mut self,
        outcome: Result<NavigationEvent, NavigationError>,
    ) -> ClientResult<Vec<PendingLookup>> {
        let completion = self.guard(outcome.map_err(Error::from))?;
        self.begin(completion).await
    }

    /// Reload rooms and the role after an administrative change (room
    /// created, renamed, membership edited).
    pub async fn after_admin_mutation(&mut self) -> ClientResult<()> {
        self.load_rooms().await?;
        self.load_role().await
    }

    /// Full-text search in the active room.
    ///
    /// # Errors
    ///
    /// Returns [`Error::unauthorized`] without a session.
    pub async fn search(&mut self, query: &str) -> ClientResult<Vec<SearchHit>> {
        let Some(token) = self.session.token() else {
            return Err(Error::unauthorized("sign in to search"));
        };
        let room = self.registry.active_room().filter(|room| !room.is_public());
        let result = self.search.search(token, room, query).await;
        self.guard(result)
    }

    /// Open a shared room. No session is required.
    pub async fn open_public(&self, share: &str) -> ClientResult<PublicView> {
        self.public.open(share).await
    }

    /// Open one page of a shared room.
    pub async fn open_public_page(&self, share: &str, page: PageId) -> ClientResult<PublicPage> {
        self.public.open_page(share, page).await
    }

    /// Rooms the user belongs to.
    pub fn rooms(&self) -> &[Room] {
        self.registry.rooms()
    }

    /// Content surface for the current state.
    pub fn view(&self) -> View {
        let route = AppRoute::parse(self.navigation.state().location());
        if let AppRoute::PublicShare(share) = route {
            return View::PublicShare { share };
        }
        if self.session.is_loading() {
            return View::Loading;
        }
        let Some(session) = self.session.session() else {
            return View::Login;
        };
        if matches!(route, AppRoute::Dashboard | AppRoute::Admin) {
            return View::Dashboard;
        }
        if !self.registry.is_loaded() {
            return View::Loading;
        }
        match self.registry.active_room() {
            Some(room) => {
                let state = self.navigation.state();
                View::Editor {
                    room: room.clone(),
                    page: state.selected_page(),
                    slug: state.resolved_slug().cloned(),
                    capabilities: self.registry.capabilities(Some(session)),
                }
            }
            None => View::NoRooms,
        }
    }

    async fn enter_session(&mut self) -> ClientResult<()> {
        if !self.session.is_authenticated() {
            return Ok(());
        }
        self.load_rooms().await?;
        let path = self.navigation.state().location().to_owned();
        self.dispatch(NavigationEvent::Startup { path }).await
    }

    async fn load_rooms(&mut self) -> ClientResult<()> {
        let Some(session) = self.session.session() else {
            return Err(Error::unauthorized("no active session"));
        };
        let result = self.registry.refresh(session).await;
        let changed = self.guard(result)?;
        let rooms = self
            .registry
            .rooms()
            .iter()
            .map(|room| room.name.clone())
            .collect();
        let active = changed.or_else(|| self.registry.active().map(Room::selection));
        self.dispatch(NavigationEvent::RoomsLoaded { rooms, active })
            .await
    }

    async fn dispatch(&mut self, event: NavigationEvent) -> ClientResult<()> {
        let mut pending = VecDeque::from(self.begin(event).await?);
        while let Some(lookup) = pending.pop_front() {
            let outcome = self.lookup_runner().run(lookup).await;
            pending.extend(self.complete(outcome).await?);
        }
        Ok(())
    }

    async fn reload_role_if_room_changed(&mut self) -> ClientResult<()> {
        if self.room_changes.has_changed().unwrap_or(false) {
            drop(self.room_changes.borrow_and_update());
            self.load_role().await?;
        }
        Ok(())
    }

    async fn load_role(&mut self) -> ClientResult<()> {
        let Some(session) = self.session.session() else {
            return Ok(());
        };
        let result = self.registry.load_role(session).await;
        match self.guard(result) {
            Err(error) if error.is_auth_failure() => Err(error),
            Err(error) => {
                warn!(%error, "role unavailable; editing disabled");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Unauthorized responses end the session.
    fn guard<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(error) = &result
            && error.is_auth_failure()
        {
            self.session.force_logout(error.message());
            self.reset_session_state();
        }
        result
    }

    fn reset_session_state(&mut self) {
        self.registry.clear();
        self.navigation.reset();
        drop(self.room_changes.borrow_and_update());
        debug!("session state cleared");
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
