//! Browser path shapes understood by the client.
//!
//! The URL is the durable record of navigation; everything the coordinator
//! keeps in memory can be rebuilt from it. Parsing never fails: shapes that
//! do not match a known pattern come back as [`AppRoute::Unrecognized`].

use super::page::PageSlug;
use super::room::RoomName;

const LOGIN: &str = "login";
const DASHBOARD: &str = "dashboard";
const ADMIN: &str = "admin";
const PUBLIC_SHARE: &str = "public";

/// Parsed browser path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRoute {
    /// `/` or an empty path.
    Root,
    /// `/login`.
    Login,
    /// `/dashboard`.
    Dashboard,
    /// `/admin`.
    Admin,
    /// `/public/{share}`: read-only shared room, no session required.
    PublicShare(String),
    /// `/{room}`.
    Room(RoomName),
    /// `/{room}/{slug}`.
    RoomPage {
        /// Room segment.
        room: RoomName,
        /// Page slug segment.
        slug: PageSlug,
    },
    /// Anything else.
    Unrecognized,
}

impl AppRoute {
    /// Parse a browser path. Query strings and fragments are ignored, as is a
    /// single trailing slash.
    ///
    /// # Examples
    /// ```
    /// use wiki_client::domain::AppRoute;
    ///
    /// assert_eq!(AppRoute::parse("/dashboard"), AppRoute::Dashboard);
    /// assert!(matches!(AppRoute::parse("/teamA/intro?x=1"), AppRoute::RoomPage { .. }));
    /// ```
    pub fn parse(path: &str) -> Self {
        let normalized = normalize_path(path);
        let segments: Vec<&str> = normalized
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Self::Root,
            [LOGIN] => Self::Login,
            [DASHBOARD] => Self::Dashboard,
            [ADMIN] => Self::Admin,
            [PUBLIC_SHARE, share] => Self::PublicShare((*share).to_owned()),
            [room] => RoomName::new(*room).map_or(Self::Unrecognized, Self::Room),
            [room, slug] => match (RoomName::new(*room), PageSlug::new(*slug)) {
                (Ok(room), Ok(slug)) => Self::RoomPage { room, slug },
                _ => Self::Unrecognized,
            },
            _ => Self::Unrecognized,
        }
    }

    /// Room segment, when the path names one.
    pub fn room(&self) -> Option<&RoomName> {
        match self {
            Self::Room(room) | Self::RoomPage { room, .. } => Some(room),
            _ => None,
        }
    }

    /// Whether the path belongs to a surface that the navigation core leaves
    /// alone (login, dashboard, admin, public share).
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            Self::Login | Self::Dashboard | Self::Admin | Self::PublicShare(_)
        )
    }
}

/// Path shown for a room with an optional selected page.
///
/// # Examples
/// ```
/// use wiki_client::domain::{room_path, PageSlug, RoomName};
///
/// let room = RoomName::new("teamA").unwrap();
/// let slug = PageSlug::new("setup").unwrap();
/// assert_eq!(room_path(&room, Some(&slug)), "/teamA/setup");
/// assert_eq!(room_path(&room, None), "/teamA");
/// ```
pub fn room_path(room: &RoomName, slug: Option<&PageSlug>) -> String {
    match slug {
        Some(slug) => format!("/{room}/{slug}"),
        None => format!("/{room}"),
    }
}

/// Strip query, fragment and a trailing slash; always start with `/`.
pub fn normalize_path(path: &str) -> String {
    let without_fragment = path.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    let trimmed = without_query.trim();
    let body = trimmed.trim_start_matches('/');
    let body = body.strip_suffix('/').unwrap_or(body);
    format!("/{body}")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn room(name: &str) -> RoomName {
        RoomName::new(name).expect("valid room")
    }

    #[rstest]
    #[case("", AppRoute::Root)]
    #[case("/", AppRoute::Root)]
    #[case("/login", AppRoute::Login)]
    #[case("/dashboard/", AppRoute::Dashboard)]
    #[case("/admin", AppRoute::Admin)]
    #[case("/public/ab12cd34", AppRoute::PublicShare("ab12cd34".to_owned()))]
    #[case("/teamA", AppRoute::Room(room("teamA")))]
    #[case("/teamA/a/b", AppRoute::Unrecognized)]
    #[case("/team%20A", AppRoute::Unrecognized)]
    #[case("/teamA/bad%slug", AppRoute::Unrecognized)]
    fn parses_known_shapes(#[case] path: &str, #[case] expected: AppRoute) {
        assert_eq!(AppRoute::parse(path), expected);
    }

    #[rstest]
    fn parses_room_page_and_ignores_query() {
        let parsed = AppRoute::parse("/teamB/onboarding?tab=history#top");
        assert_eq!(
            parsed,
            AppRoute::RoomPage {
                room: room("teamB"),
                slug: PageSlug::new("onboarding").expect("slug"),
            }
        );
        assert_eq!(parsed.room(), Some(&room("teamB")));
    }

    #[rstest]
    #[case("/teamA/intro/", "/teamA/intro")]
    #[case("teamA", "/teamA")]
    #[case("/?q=1", "/")]
    fn normalizes_paths(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_path(raw), expected);
    }

    #[rstest]
    fn surface_paths_are_flagged() {
        assert!(AppRoute::parse("/admin").is_surface());
        assert!(!AppRoute::parse("/teamA").is_surface());
    }
}
