//! Test utilities for the client crate.
//!
//! [`InMemoryWiki`] implements every outbound port over in-process data so
//! unit tests (in `src/`) and integration tests (in `tests/`) can drive the
//! whole navigation core without a server. It counts the requests each port
//! receives so tests can assert on redundant traffic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::app::{WikiApp, WikiPorts};
use crate::domain::ports::{
    AuthGateway, AuthGatewayError, BrowserHistory, MemoryTokenStore, PageDirectory,
    PageDirectoryError, PageSearch, PageSearchError, PublicRoomInfo, PublicShare,
    PublicShareError, RequestScope, RoomDirectory, RoomDirectoryError, TokenStore,
};
use crate::domain::{
    AccessToken, Credentials, PageId, PageRef, PageSlug, PageTreeNode, PublicPage, Role, Room,
    RoomName, SearchHit, UserId, UserProfile,
};
use crate::outbound::MemoryHistory;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    profile: UserProfile,
}

#[derive(Debug, Clone)]
struct Membership {
    room: Room,
    role: Role,
}

#[derive(Debug, Default)]
struct WikiData {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    rooms: Vec<Membership>,
    pages: HashMap<RoomName, Vec<PageTreeNode>>,
    default_logo: Option<String>,
    next_id: i64,
}

impl WikiData {
    fn profile_for(&self, token: &AccessToken) -> Option<&UserProfile> {
        let email = self.tokens.get(token.expose())?;
        self.accounts.get(email).map(|account| &account.profile)
    }

    fn find_page<'a>(&'a self, room: &RoomName, matches: impl Fn(&PageTreeNode) -> bool) -> Option<&'a PageTreeNode> {
        fn walk<'n>(
            nodes: &'n [PageTreeNode],
            matches: &dyn Fn(&PageTreeNode) -> bool,
        ) -> Option<&'n PageTreeNode> {
            nodes.iter().find_map(|node| {
                if matches(node) {
                    Some(node)
                } else {
                    walk(&node.children, matches)
                }
            })
        }
        walk(self.pages.get(room)?, &matches)
    }

    fn shared_room(&self, share: &str) -> Option<&Room> {
        self.rooms
            .iter()
            .map(|membership| &membership.room)
            .find(|room| room.public_slug.as_deref() == Some(share))
    }
}

/// Request counters per port operation.
#[derive(Debug, Default)]
pub struct CallCounts {
    /// `RoomDirectory::my_rooms`.
    pub room_listings: AtomicUsize,
    /// `RoomDirectory::my_role`.
    pub role_lookups: AtomicUsize,
    /// `PageDirectory::page_by_slug`.
    pub slug_lookups: AtomicUsize,
    /// `PageDirectory::page_by_id`.
    pub id_lookups: AtomicUsize,
    /// `PageDirectory::page_tree`.
    pub tree_listings: AtomicUsize,
    /// `PageSearch::search`.
    pub searches: AtomicUsize,
}

impl CallCounts {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Read a counter.
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// In-process wiki server implementing every outbound port.
///
/// # Examples
/// ```
/// use wiki_client::domain::Role;
/// use wiki_client::test_support::InMemoryWiki;
///
/// let wiki = InMemoryWiki::new()
///     .with_account("ada@example.org", "secret")
///     .with_room("teamA", Role::Editor)
///     .with_page("teamA", "setup", "Setup");
/// assert_eq!(wiki.page_id("teamA", "setup").map(|id| id.get()), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryWiki {
    data: Mutex<WikiData>,
    /// Requests received so far.
    pub calls: CallCounts,
}

impl InMemoryWiki {
    /// Empty wiki.
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, WikiData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an active account.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        {
            let mut data = self.data();
            let id = UserId::new(i64::try_from(data.accounts.len()).unwrap_or(i64::MAX) + 1);
            data.accounts.insert(
                email.to_owned(),
                Account {
                    password: password.to_owned(),
                    profile: UserProfile {
                        id,
                        email: email.to_owned(),
                        is_active: true,
                        is_superuser: false,
                    },
                },
            );
        }
        self
    }

    /// Grant superuser status to `email`.
    #[must_use]
    pub fn with_superuser(self, email: &str) -> Self {
        if let Some(account) = self.data().accounts.get_mut(email) {
            account.profile.is_superuser = true;
        }
        self
    }

    /// Add a room the account belongs to with `role`.
    ///
    /// # Panics
    ///
    /// Panics when `name` is not a valid room name.
    #[must_use]
    pub fn with_room(self, name: &str, role: Role) -> Self {
        let name = RoomName::new(name).expect("valid room name");
        self.data().rooms.push(Membership {
            room: Room {
                display_name: name.as_str().to_uppercase(),
                name,
                logo_url: None,
                welcome_page_id: None,
                public_slug: None,
            },
            role,
        });
        self
    }

    /// Add a top-level page to `room`; ids are assigned in insertion order.
    ///
    /// # Panics
    ///
    /// Panics when `room` or `slug` is malformed.
    #[must_use]
    pub fn with_page(self, room: &str, slug: &str, title: &str) -> Self {
        {
            let mut data = self.data();
            data.next_id += 1;
            let node = PageTreeNode {
                id: PageId::new(data.next_id),
                title: title.to_owned(),
                slug: PageSlug::new(slug).expect("valid slug"),
                path: data.next_id.to_string(),
                children: Vec::new(),
            };
            data.pages
                .entry(RoomName::new(room).expect("valid room name"))
                .or_default()
                .push(node);
        }
        self
    }

    /// Use the page `slug` as the welcome page of `room`.
    #[must_use]
    pub fn with_welcome_page(self, room: &str, slug: &str) -> Self {
        let id = self.page_id(room, slug);
        if let Some(membership) = self
            .data()
            .rooms
            .iter_mut()
            .find(|membership| membership.room.name.as_str() == room)
        {
            membership.room.welcome_page_id = id;
        }
        self
    }

    /// Publish `room` under `share`.
    #[must_use]
    pub fn with_public_share(self, room: &str, share: &str) -> Self {
        if let Some(membership) = self
            .data()
            .rooms
            .iter_mut()
            .find(|membership| membership.room.name.as_str() == room)
        {
            membership.room.public_slug = Some(share.to_owned());
        }
        self
    }

    /// Installation default logo.
    #[must_use]
    pub fn with_default_logo(self, logo: &str) -> Self {
        self.data().default_logo = Some(logo.to_owned());
        self
    }

    /// Identifier of the page `slug` in `room`.
    pub fn page_id(&self, room: &str, slug: &str) -> Option<PageId> {
        let room = RoomName::new(room).ok()?;
        self.data()
            .find_page(&room, |node| node.slug.as_str() == slug)
            .map(|node| node.id)
    }

    /// Remove the page `slug` from `room`.
    pub fn delete_page(&self, room: &str, slug: &str) {
        let Ok(room) = RoomName::new(room) else {
            return;
        };
        if let Some(pages) = self.data().pages.get_mut(&room) {
            pages.retain(|node| node.slug.as_str() != slug);
        }
    }

    /// Drop the membership for `room`.
    pub fn leave_room(&self, room: &str) {
        self.data()
            .rooms
            .retain(|membership| membership.room.name.as_str() != room);
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        self.data().tokens.clear();
    }

    /// Assemble a [`WikiApp`] over this wiki, an in-memory token store and
    /// an in-memory history positioned at `path`.
    pub fn app_at(self: &Arc<Self>, path: &str) -> (WikiApp, Arc<MemoryHistory>) {
        self.app_with_tokens(path, Arc::new(MemoryTokenStore::default()))
    }

    /// As [`Self::app_at`], with a caller-supplied token store.
    pub fn app_with_tokens(
        self: &Arc<Self>,
        path: &str,
        tokens: Arc<dyn TokenStore>,
    ) -> (WikiApp, Arc<MemoryHistory>) {
        let history = Arc::new(MemoryHistory::new(path));
        let history_port: Arc<dyn BrowserHistory> = history.clone();
        let app = WikiApp::new(WikiPorts {
            auth: self.clone(),
            tokens,
            rooms: self.clone(),
            pages: self.clone(),
            search: self.clone(),
            public: self.clone(),
            history: history_port,
        });
        (app, history)
    }
}

#[async_trait]
impl AuthGateway for InMemoryWiki {
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, AuthGatewayError> {
        let mut data = self.data();
        let account = data
            .accounts
            .get(credentials.email())
            .filter(|account| account.password == credentials.password())
            .ok_or_else(AuthGatewayError::invalid_credentials)?;
        let raw = format!("token-{}-{}", account.profile.id, data.tokens.len() + 1);
        data.tokens.insert(raw.clone(), credentials.email().to_owned());
        AccessToken::new(raw).ok_or_else(|| AuthGatewayError::decode("empty token"))
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), AuthGatewayError> {
        let mut data = self.data();
        if data.accounts.contains_key(credentials.email()) {
            return Err(AuthGatewayError::rejected("email already registered"));
        }
        let id = UserId::new(i64::try_from(data.accounts.len()).unwrap_or(i64::MAX) + 1);
        data.accounts.insert(
            credentials.email().to_owned(),
            Account {
                password: credentials.password().to_owned(),
                profile: UserProfile {
                    id,
                    email: credentials.email().to_owned(),
                    is_active: true,
                    is_superuser: false,
                },
            },
        );
        Ok(())
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, AuthGatewayError> {
        self.data()
            .profile_for(token)
            .cloned()
            .ok_or_else(AuthGatewayError::unauthorized)
    }
}

#[async_trait]
impl RoomDirectory for InMemoryWiki {
    async fn my_rooms(&self, token: &AccessToken) -> Result<Vec<Room>, RoomDirectoryError> {
        CallCounts::bump(&self.calls.room_listings);
        let data = self.data();
        data.profile_for(token)
            .ok_or_else(RoomDirectoryError::unauthorized)?;
        Ok(data
            .rooms
            .iter()
            .map(|membership| membership.room.clone())
            .collect())
    }

    async fn my_role(
        &self,
        token: &AccessToken,
        room: &RoomName,
    ) -> Result<Option<Role>, RoomDirectoryError> {
        CallCounts::bump(&self.calls.role_lookups);
        let data = self.data();
        data.profile_for(token)
            .ok_or_else(RoomDirectoryError::unauthorized)?;
        Ok(data
            .rooms
            .iter()
            .find(|membership| &membership.room.name == room)
            .map(|membership| membership.role))
    }

    async fn default_logo(&self) -> Result<Option<String>, RoomDirectoryError> {
        Ok(self.data().default_logo.clone())
    }
}

impl InMemoryWiki {
    fn authorise(&self, scope: &RequestScope) -> Result<RoomName, PageDirectoryError> {
        let data = self.data();
        let token = scope.token().ok_or_else(PageDirectoryError::unauthorized)?;
        data.profile_for(token)
            .ok_or_else(PageDirectoryError::unauthorized)?;
        let room = scope
            .tenant()
            .ok_or_else(|| PageDirectoryError::forbidden("tenant header missing"))?;
        if data.rooms.iter().any(|membership| &membership.room.name == room) {
            Ok(room.clone())
        } else {
            Err(PageDirectoryError::forbidden(format!("not a member of {room}")))
        }
    }
}

#[async_trait]
impl PageDirectory for InMemoryWiki {
    async fn page_by_slug(
        &self,
        scope: &RequestScope,
        slug: &PageSlug,
    ) -> Result<PageRef, PageDirectoryError> {
        CallCounts::bump(&self.calls.slug_lookups);
        let room = self.authorise(scope)?;
        self.data()
            .find_page(&room, |node| &node.slug == slug)
            .map(PageTreeNode::page_ref)
            .ok_or_else(PageDirectoryError::not_found)
    }

    async fn page_by_id(
        &self,
        scope: &RequestScope,
        id: PageId,
    ) -> Result<PageRef, PageDirectoryError> {
        CallCounts::bump(&self.calls.id_lookups);
        let room = self.authorise(scope)?;
        self.data()
            .find_page(&room, |node| node.id == id)
            .map(PageTreeNode::page_ref)
            .ok_or_else(PageDirectoryError::not_found)
    }

    async fn page_tree(&self, scope: &RequestScope) -> Result<Vec<PageTreeNode>, PageDirectoryError> {
        CallCounts::bump(&self.calls.tree_listings);
        let room = self.authorise(scope)?;
        Ok(self.data().pages.get(&room).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PageSearch for InMemoryWiki {
    async fn search(&self, scope: &RequestScope, query: &str) -> Result<Vec<SearchHit>, PageSearchError> {
        CallCounts::bump(&self.calls.searches);
        let data = self.data();
        let token = scope.token().ok_or_else(PageSearchError::unauthorized)?;
        data.profile_for(token)
            .ok_or_else(PageSearchError::unauthorized)?;
        let needle = query.to_lowercase();
        let hits = data
            .pages
            .iter()
            .filter(|(room, _)| scope.tenant().is_none_or(|tenant| tenant == *room))
            .flat_map(|(_, nodes)| nodes.iter())
            .filter(|node| node.title.to_lowercase().contains(&needle))
            .map(|node| SearchHit {
                id: node.id,
                title: node.title.clone(),
                slug: node.slug.clone(),
                headline: node.title.clone(),
                rank: 1.0,
            })
            .collect();
        Ok(hits)
    }
}

#[async_trait]
impl PublicShare for InMemoryWiki {
    async fn share_info(&self, share: &str) -> Result<PublicRoomInfo, PublicShareError> {
        let data = self.data();
        let room = data
            .shared_room(share)
            .ok_or_else(PublicShareError::not_found)?;
        Ok(PublicRoomInfo {
            display_name: room.display_name.clone(),
            logo_url: room.logo_url.clone(),
        })
    }

    async fn share_tree(&self, share: &str) -> Result<Vec<PageTreeNode>, PublicShareError> {
        let data = self.data();
        let room = data
            .shared_room(share)
            .ok_or_else(PublicShareError::not_found)?;
        Ok(data.pages.get(&room.name).cloned().unwrap_or_default())
    }

    async fn share_page(&self, share: &str, page: PageId) -> Result<PublicPage, PublicShareError> {
        let data = self.data();
        let room = data
            .shared_room(share)
            .ok_or_else(PublicShareError::not_found)?;
        data.find_page(&room.name, |node| node.id == page)
            .map(|node| PublicPage {
                id: node.id,
                title: node.title.clone(),
                slug: node.slug.clone(),
                content: None,
            })
            .ok_or_else(PublicShareError::not_found)
    }
}
