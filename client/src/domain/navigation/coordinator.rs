//! Effect-executing runtime around the navigation reducer.
//!
//! Room switches and history pushes run inside [`NavigationCoordinator::apply`].
//! Lookups come back as [`PendingLookup`]s and run on a [`LookupRunner`],
//! which borrows nothing from the coordinator. An embedder can therefore
//! apply a new trigger while a lookup is in flight and feed the older
//! completion back afterwards; its ticket no longer matches and the reducer
//! drops it.

use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ports::{BrowserHistory, PageDirectory, PageDirectoryError, RequestScope};
use crate::domain::tenant_registry::RoomSwitcher;
use crate::domain::{
    AccessToken, Error, PageId, PageSlug, RoomName, SlugResolver, TokenRejected, first_listed_page,
};

use super::event::{NavigationEffect, NavigationEvent, Transition};
use super::machine::transition;
use super::state::{NavigationState, Ticket};

/// Fatal navigation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// A page resolution was attempted without a session token.
    #[error("page resolution requires a signed-in session")]
    SessionMissing,
    /// The page directory refused the session token.
    #[error("session token rejected during page resolution")]
    TokenRejected,
}

impl From<NavigationError> for Error {
    fn from(error: NavigationError) -> Self {
        Error::unauthorized(error.to_string())
    }
}

impl From<TokenRejected> for NavigationError {
    fn from(_: TokenRejected) -> Self {
        Self::TokenRejected
    }
}

/// Collaborators borrowed for one dispatch.
pub struct DispatchContext<'a> {
    /// Bearer token of the current session.
    pub token: Option<&'a AccessToken>,
    /// Registry that performs room switches.
    pub rooms: &'a mut dyn RoomSwitcher,
}

/// A lookup the reducer is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingLookup {
    /// Slug to page, for a URL.
    Slug {
        /// Ticket for the completion.
        ticket: Ticket,
        /// Room to scope the lookup to.
        room: RoomName,
        /// Slug to resolve.
        slug: PageSlug,
    },
    /// Page to slug, for the outbound URL.
    PageSlug {
        /// Ticket for the completion.
        ticket: Ticket,
        /// Room to scope the lookup to.
        room: RoomName,
        /// Page to resolve.
        page: PageId,
    },
    /// First page of a room, for the auto-select fallback.
    FirstPage {
        /// Ticket for the completion.
        ticket: Ticket,
        /// Room to list.
        room: RoomName,
    },
}

/// Runs [`PendingLookup`]s for one session token.
#[derive(Clone)]
pub struct LookupRunner {
    resolver: SlugResolver,
    pages: Arc<dyn PageDirectory>,
    token: Option<AccessToken>,
}

impl LookupRunner {
    /// Perform `lookup` and return the completion to feed back.
    ///
    /// Misses and transport failures complete with nothing found.
    ///
    /// # Errors
    ///
    /// [`NavigationError::SessionMissing`] without a token, and
    /// [`NavigationError::TokenRejected`] when the server refuses it.
    pub async fn run(&self, lookup: PendingLookup) -> Result<NavigationEvent, NavigationError> {
        let token = self.token.as_ref().ok_or(NavigationError::SessionMissing)?;
        let completion = match lookup {
            PendingLookup::Slug { ticket, room, slug } => {
                let page = self.resolver.lookup_slug(token, &slug, &room).await?;
                NavigationEvent::SlugResolved { ticket, room, page }
            }
            PendingLookup::PageSlug { ticket, room, page } => {
                let slug = self.resolver.lookup_page_slug(token, page, &room).await?;
                NavigationEvent::PageSlugResolved {
                    ticket,
                    room,
                    page,
                    slug,
                }
            }
            PendingLookup::FirstPage { ticket, room } => {
                let scope = RequestScope::for_room(token, &room);
                let first_page = match self.pages.page_tree(&scope).await {
                    Ok(tree) => first_listed_page(&tree),
                    Err(PageDirectoryError::Unauthorized) => {
                        return Err(NavigationError::TokenRejected);
                    }
                    Err(error) => {
                        debug!(room = %room, %error, "page listing failed");
                        None
                    }
                };
                NavigationEvent::PagesListed {
                    ticket,
                    room,
                    first_page,
                }
            }
        };
        Ok(completion)
    }
}

/// Runs the reducer and executes its effects.
pub struct NavigationCoordinator {
    state: NavigationState,
    resolver: SlugResolver,
    pages: Arc<dyn PageDirectory>,
    history: Arc<dyn BrowserHistory>,
}

impl NavigationCoordinator {
    /// Build a coordinator positioned at the history's current path.
    pub fn new(pages: Arc<dyn PageDirectory>, history: Arc<dyn BrowserHistory>) -> Self {
        let state = NavigationState::new(&history.current_path());
        Self {
            state,
            resolver: SlugResolver::new(Arc::clone(&pages)),
            pages,
            history,
        }
    }

    /// Current navigation state.
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Forget everything; used when the session ends.
    pub fn reset(&mut self) {
        self.state = NavigationState::new(&self.history.current_path());
    }

    /// Runner for the lookups returned by [`Self::apply`].
    pub fn runner(&self, token: Option<AccessToken>) -> LookupRunner {
        LookupRunner {
            resolver: self.resolver.clone(),
            pages: Arc::clone(&self.pages),
            token,
        }
    }

    /// Feed a trigger or a completion through the reducer.
    ///
    /// Room switches and URL pushes happen before this returns; the lookups
    /// still owed are handed back in request order.
    pub fn apply(
        &mut self,
        event: NavigationEvent,
        rooms: &mut dyn RoomSwitcher,
    ) -> Vec<PendingLookup> {
        let mut lookups = Vec::new();
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let Transition { state, effects } = transition(mem::take(&mut self.state), event);
            self.state = state;
            for effect in effects {
                match effect {
                    NavigationEffect::SwitchRoom { room } => {
                        queue.push_back(NavigationEvent::RoomChanged(rooms.switch_room(&room)));
                    }
                    NavigationEffect::PushUrl { path } => {
                        info!(path = %path, "pushing history entry");
                        self.history.push(&path);
                    }
                    NavigationEffect::ResolveSlug { ticket, room, slug } => {
                        lookups.push(PendingLookup::Slug { ticket, room, slug });
                    }
                    NavigationEffect::ResolvePageSlug { ticket, room, page } => {
                        lookups.push(PendingLookup::PageSlug { ticket, room, page });
                    }
                    NavigationEffect::ListPages { ticket, room } => {
                        lookups.push(PendingLookup::FirstPage { ticket, room });
                    }
                }
            }
        }
        lookups
    }

    /// Apply `event` and await every lookup it leads to.
    pub async fn dispatch(
        &mut self,
        event: NavigationEvent,
        ctx: DispatchContext<'_>,
    ) -> Result<(), NavigationError> {
        let DispatchContext { token, rooms } = ctx;
        let runner = self.runner(token.cloned());
        let mut pending = VecDeque::from(self.apply(event, rooms));
        while let Some(lookup) = pending.pop_front() {
            let completion = runner.run(lookup).await?;
            pending.extend(self.apply(completion, rooms));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
