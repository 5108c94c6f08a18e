//! Tests for the navigation coordinator runtime.

use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockPageDirectory, PageDirectoryError};
use crate::domain::{PageId, PageRef, PageSlug, PageTreeNode, RoomName, RoomSelection};

struct RecordingHistory {
    entries: Mutex<Vec<String>>,
}

impl RecordingHistory {
    fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(vec![path.to_owned()]),
        })
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("history lock").clone()
    }
}

impl BrowserHistory for RecordingHistory {
    fn current_path(&self) -> String {
        self.entries
            .lock()
            .expect("history lock")
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_owned())
    }

    fn push(&self, path: &str) {
        self.entries.lock().expect("history lock").push(path.to_owned());
    }

    fn len(&self) -> usize {
        self.entries.lock().expect("history lock").len()
    }
}

#[derive(Default)]
struct Switcher {
    switched: Vec<RoomName>,
}

impl RoomSwitcher for Switcher {
    fn switch_room(&mut self, room: &RoomName) -> RoomSelection {
        self.switched.push(room.clone());
        RoomSelection {
            name: room.clone(),
            welcome_page: None,
        }
    }
}

fn name(raw: &str) -> RoomName {
    RoomName::new(raw).expect("room name")
}

fn node(id: i64, slug: &str) -> PageTreeNode {
    PageTreeNode {
        id: PageId::new(id),
        title: slug.to_owned(),
        slug: PageSlug::new(slug).expect("slug"),
        path: id.to_string(),
        children: Vec::new(),
    }
}

#[fixture]
fn token() -> AccessToken {
    AccessToken::new("t").expect("token")
}

fn rooms_loaded() -> NavigationEvent {
    NavigationEvent::RoomsLoaded {
        rooms: vec![name("teamA"), name("teamB")],
        active: Some(RoomSelection {
            name: name("teamA"),
            welcome_page: None,
        }),
    }
}

async fn boot(
    coordinator: &mut NavigationCoordinator,
    token: Option<&AccessToken>,
    switcher: &mut Switcher,
    path: &str,
) -> Result<(), NavigationError> {
    coordinator
        .dispatch(
            rooms_loaded(),
            DispatchContext {
                token,
                rooms: &mut *switcher,
            },
        )
        .await?;
    coordinator
        .dispatch(
            NavigationEvent::Startup {
                path: path.to_owned(),
            },
            DispatchContext {
                token,
                rooms: &mut *switcher,
            },
        )
        .await
}

#[rstest]
#[tokio::test]
async fn cross_room_url_switches_then_resolves(token: AccessToken) {
    let mut pages = MockPageDirectory::new();
    pages
        .expect_page_by_slug()
        .times(1)
        .withf(|scope, slug| {
            scope.tenant().map(RoomName::as_str) == Some("teamB") && slug.as_str() == "setup"
        })
        .return_once(|_, _| {
            Ok(PageRef {
                id: PageId::new(12),
                slug: PageSlug::new("setup").expect("slug"),
            })
        });
    pages.expect_page_tree().times(0);
    let history = RecordingHistory::at("/teamB/setup");
    let mut coordinator = NavigationCoordinator::new(Arc::new(pages), history.clone());
    let mut switcher = Switcher::default();

    boot(&mut coordinator, Some(&token), &mut switcher, "/teamB/setup")
        .await
        .expect("dispatch");

    assert_eq!(switcher.switched, vec![name("teamB")]);
    assert_eq!(coordinator.state().selected_page(), Some(PageId::new(12)));
    assert_eq!(history.entries(), vec!["/teamB/setup".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn root_path_lists_pages_and_pushes_selection(token: AccessToken) {
    let mut pages = MockPageDirectory::new();
    pages
        .expect_page_tree()
        .times(1)
        .return_once(|_| Ok(vec![node(1, "home"), node(2, "later")]));
    let history = RecordingHistory::at("/");
    let mut coordinator = NavigationCoordinator::new(Arc::new(pages), history.clone());
    let mut switcher = Switcher::default();

    boot(&mut coordinator, Some(&token), &mut switcher, "/")
        .await
        .expect("dispatch");

    assert_eq!(coordinator.state().selected_page(), Some(PageId::new(1)));
    assert_eq!(history.entries(), vec!["/".to_owned(), "/teamA/home".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn listing_failure_selects_nothing(token: AccessToken) {
    let mut pages = MockPageDirectory::new();
    pages
        .expect_page_tree()
        .return_once(|_| Err(PageDirectoryError::transport("offline")));
    let history = RecordingHistory::at("/");
    let mut coordinator = NavigationCoordinator::new(Arc::new(pages), history.clone());
    let mut switcher = Switcher::default();

    boot(&mut coordinator, Some(&token), &mut switcher, "/")
        .await
        .expect("dispatch");

    assert!(coordinator.state().selected_page().is_none());
    assert_eq!(history.entries(), vec!["/".to_owned(), "/teamA".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn resolution_without_token_is_fatal() {
    let mut pages = MockPageDirectory::new();
    pages.expect_page_by_slug().times(0);
    let history = RecordingHistory::at("/teamA/setup");
    let mut coordinator = NavigationCoordinator::new(Arc::new(pages), history);
    let mut switcher = Switcher::default();

    let error = boot(&mut coordinator, None, &mut switcher, "/teamA/setup")
        .await
        .expect_err("no session");

    assert_eq!(error, NavigationError::SessionMissing);
}

#[rstest]
#[tokio::test]
async fn reset_returns_to_fresh_state(token: AccessToken) {
    let mut pages = MockPageDirectory::new();
    pages
        .expect_page_tree()
        .return_once(|_| Ok(vec![node(1, "home")]));
    let history = RecordingHistory::at("/");
    let mut coordinator = NavigationCoordinator::new(Arc::new(pages), history);
    let mut switcher = Switcher::default();
    boot(&mut coordinator, Some(&token), &mut switcher, "/")
        .await
        .expect("dispatch");

    coordinator.reset();

    assert!(!coordinator.state().url_handled());
    assert!(coordinator.state().selected_page().is_none());
    assert_eq!(coordinator.state().location(), "/teamA/home");
}

#[rstest]
fn apply_hands_lookups_back_without_running_them() {
    let mut pages = MockPageDirectory::new();
    pages.expect_page_by_slug().times(0);
    let history = RecordingHistory::at("/teamB/setup");
    let mut coordinator = NavigationCoordinator::new(Arc::new(pages), history);
    let mut switcher = Switcher::default();
    assert!(coordinator.apply(rooms_loaded(), &mut switcher).is_empty());

    let pending = coordinator.apply(
        NavigationEvent::Startup {
            path: "/teamB/setup".to_owned(),
        },
        &mut switcher,
    );

    assert_eq!(switcher.switched, vec![name("teamB")]);
    assert!(matches!(
        pending.as_slice(),
        [PendingLookup::Slug { room, slug, .. }] if room == &name("teamB") && slug.as_str() == "setup"
    ));
    assert!(coordinator.state().pending_slug_switch().is_some());
}

#[rstest]
#[tokio::test]
async fn rejected_token_while_listing_is_fatal(token: AccessToken) {
    let mut pages = MockPageDirectory::new();
    pages
        .expect_page_tree()
        .return_once(|_| Err(PageDirectoryError::unauthorized()));
    let history = RecordingHistory::at("/");
    let mut coordinator = NavigationCoordinator::new(Arc::new(pages), history.clone());
    let mut switcher = Switcher::default();

    let error = boot(&mut coordinator, Some(&token), &mut switcher, "/")
        .await
        .expect_err("token rejected");

    assert_eq!(error, NavigationError::TokenRejected);
    assert_eq!(history.entries(), vec!["/".to_owned()]);
}
