//! Tests for the application shell over the in-memory wiki.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MemoryTokenStore;
use crate::domain::{Role, RoomName};
use crate::test_support::{CallCounts, InMemoryWiki};

const EMAIL: &str = "ada@example.org";
const PASSWORD: &str = "correct-horse";

#[fixture]
fn wiki() -> Arc<InMemoryWiki> {
    Arc::new(
        InMemoryWiki::new()
            .with_account(EMAIL, PASSWORD)
            .with_room("teamA", Role::Editor)
            .with_room("teamB", Role::Viewer)
            .with_page("teamA", "setup", "Setup")
            .with_page("teamA", "deploy", "Deploy")
            .with_page("teamB", "intro", "Intro")
            .with_public_share("teamB", "team-b-docs"),
    )
}

fn room(name: &str) -> RoomName {
    RoomName::new(name).expect("room name")
}

#[rstest]
#[tokio::test]
async fn boot_without_token_shows_login(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/teamA/setup");

    app.boot().await.expect("boot");

    assert_eq!(app.view(), View::Login);
    assert_eq!(CallCounts::get(&wiki.calls.room_listings), 0);
}

#[rstest]
#[tokio::test]
async fn login_at_root_selects_first_page(wiki: Arc<InMemoryWiki>) {
    let (mut app, history) = wiki.app_at("/");

    app.login(EMAIL, PASSWORD).await.expect("login");

    let View::Editor {
        room: active,
        page,
        capabilities,
        ..
    } = app.view()
    else {
        panic!("expected editor view");
    };
    assert_eq!(active, room("teamA"));
    assert_eq!(page, wiki.page_id("teamA", "setup"));
    assert!(capabilities.can_edit);
    assert_eq!(history.entries(), vec!["/", "/teamA/setup"]);
    assert_eq!(CallCounts::get(&wiki.calls.role_lookups), 1);
}

#[rstest]
#[tokio::test]
async fn wrong_password_keeps_login_view(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/");

    let error = app.login(EMAIL, "nope").await.expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(app.view(), View::Login);
}

#[rstest]
#[tokio::test]
async fn persisted_token_restores_deep_link(wiki: Arc<InMemoryWiki>) {
    let tokens = Arc::new(MemoryTokenStore::default());
    let (mut first, _) = wiki.app_with_tokens("/", tokens.clone());
    first.login(EMAIL, PASSWORD).await.expect("login");

    let (mut app, history) = wiki.app_with_tokens("/teamB/intro", tokens);
    assert_eq!(app.view(), View::Loading);
    app.boot().await.expect("boot");

    let View::Editor {
        room: active,
        page,
        capabilities,
        ..
    } = app.view()
    else {
        panic!("expected editor view");
    };
    assert_eq!(active, room("teamB"));
    assert_eq!(page, wiki.page_id("teamB", "intro"));
    assert!(!capabilities.can_edit, "viewer role");
    assert_eq!(history.entries(), vec!["/teamB/intro"]);
}

#[rstest]
#[tokio::test]
async fn revoked_token_forces_logout(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/");
    app.login(EMAIL, PASSWORD).await.expect("login");

    wiki.revoke_tokens();
    let error = app.after_admin_mutation().await.expect_err("revoked");

    assert!(error.is_auth_failure());
    assert!(app.session().is_none());
    assert!(app.registry().active_room().is_none());
    assert_eq!(app.view(), View::Login);
}

#[rstest]
#[tokio::test]
async fn switching_rooms_reloads_role_and_url(wiki: Arc<InMemoryWiki>) {
    let (mut app, history) = wiki.app_at("/");
    app.login(EMAIL, PASSWORD).await.expect("login");

    app.switch_room("teamB").await.expect("switch");

    assert_eq!(app.registry().active_room(), Some(&room("teamB")));
    assert_eq!(app.registry().role(), Some(Role::Viewer));
    assert_eq!(
        history.entries().last().map(String::as_str),
        Some("/teamB/intro")
    );
    assert_eq!(CallCounts::get(&wiki.calls.role_lookups), 2);
}

#[rstest]
#[tokio::test]
async fn malformed_room_name_is_rejected(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/");
    app.login(EMAIL, PASSWORD).await.expect("login");

    let error = app.switch_room("bad room").await.expect_err("invalid");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn logout_clears_rooms_and_selection(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/");
    app.login(EMAIL, PASSWORD).await.expect("login");

    app.logout();

    assert_eq!(app.view(), View::Login);
    assert!(app.rooms().is_empty());
    assert!(app.navigation().state().selected_page().is_none());
}

#[rstest]
#[tokio::test]
async fn search_is_scoped_to_active_room(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/");
    app.login(EMAIL, PASSWORD).await.expect("login");

    let hits = app.search("  intro ").await.expect("search");
    assert!(hits.is_empty(), "intro lives in teamB");

    let hits = app.search("deploy").await.expect("search");
    assert_eq!(hits.len(), 1);
    assert!(app.search("   ").await.expect("blank").is_empty());
    assert_eq!(CallCounts::get(&wiki.calls.searches), 2);
}

#[rstest]
#[tokio::test]
async fn public_path_shows_share_without_session(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/public/team-b-docs");
    app.boot().await.expect("boot");

    assert_eq!(
        app.view(),
        View::PublicShare {
            share: "team-b-docs".to_owned()
        }
    );
    let view = app.open_public("team-b-docs").await.expect("share");
    assert_eq!(view.info.display_name, "TEAMB");
    assert_eq!(view.page.map(|page| page.slug.as_str().to_owned()), Some("intro".to_owned()));
}

#[rstest]
#[tokio::test]
async fn member_of_no_room_sees_empty_state() {
    let wiki = Arc::new(InMemoryWiki::new().with_account(EMAIL, PASSWORD));
    let (mut app, history) = wiki.app_at("/");

    app.login(EMAIL, PASSWORD).await.expect("login");

    assert_eq!(app.view(), View::NoRooms);
    assert_eq!(history.entries(), vec!["/"]);
}

#[rstest]
#[tokio::test]
async fn dashboard_path_is_left_alone(wiki: Arc<InMemoryWiki>) {
    let (mut app, history) = wiki.app_at("/dashboard");

    app.login(EMAIL, PASSWORD).await.expect("login");

    assert_eq!(app.view(), View::Dashboard);
    assert_eq!(history.entries(), vec!["/dashboard"]);
    assert_eq!(CallCounts::get(&wiki.calls.tree_listings), 0);
}

#[rstest]
#[tokio::test]
async fn newer_history_trigger_supersedes_lookup_in_flight(wiki: Arc<InMemoryWiki>) {
    let (mut app, history) = wiki.app_at("/");
    app.login(EMAIL, PASSWORD).await.expect("login");
    let entries = history.entries();

    let stale = app
        .begin(NavigationEvent::HistoryNavigated {
            path: "/teamA/deploy".to_owned(),
        })
        .await
        .expect("first trigger");
    let current = app
        .begin(NavigationEvent::HistoryNavigated {
            path: "/teamB/intro".to_owned(),
        })
        .await
        .expect("second trigger");
    let runner = app.lookup_runner();
    let stale_outcome = runner.run(stale.into_iter().next().expect("lookup")).await;
    let current_outcome = runner.run(current.into_iter().next().expect("lookup")).await;

    let follow_up = app.complete(stale_outcome).await.expect("stale completion");
    assert!(follow_up.is_empty());
    assert!(app.navigation().state().selected_page().is_none());
    assert_eq!(app.registry().active_room(), Some(&room("teamB")));

    let follow_up = app.complete(current_outcome).await.expect("completion");
    assert!(follow_up.is_empty());
    assert_eq!(
        app.navigation().state().selected_page(),
        wiki.page_id("teamB", "intro")
    );
    assert_eq!(app.registry().role(), Some(Role::Viewer));
    assert_eq!(history.entries(), entries);
}

#[rstest]
#[tokio::test]
async fn rejected_token_during_page_lookup_forces_logout(wiki: Arc<InMemoryWiki>) {
    let (mut app, _) = wiki.app_at("/");
    app.login(EMAIL, PASSWORD).await.expect("login");

    wiki.revoke_tokens();
    let error = app
        .history_navigated("/teamA/deploy")
        .await
        .expect_err("token revoked");

    assert!(error.is_auth_failure());
    assert!(app.session().is_none());
    assert_eq!(app.view(), View::Login);
}
