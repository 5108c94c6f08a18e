//! DTOs for decoding wiki server JSON responses.
//!
//! Adapters decode into these transport DTOs first, then map into domain
//! records in one pass. Mapping failures are reported as plain strings and
//! wrapped into the caller's port error.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::PublicRoomInfo;
use crate::domain::{
    AccessToken, PageId, PageRef, PageSlug, PageTreeNode, PublicPage, Role, Room, RoomName,
    SearchHit, UserId, UserProfile,
};

#[derive(Debug, Deserialize)]
pub(super) struct TokenDto {
    pub(super) access_token: String,
}

impl TokenDto {
    pub(super) fn into_token(self) -> Result<AccessToken, String> {
        AccessToken::new(self.access_token).ok_or_else(|| "empty access token".to_owned())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: i64,
    pub(super) email: String,
    #[serde(default = "default_true")]
    pub(super) is_active: bool,
    #[serde(default)]
    pub(super) is_superuser: bool,
}

const fn default_true() -> bool {
    true
}

impl From<UserDto> for UserProfile {
    fn from(dto: UserDto) -> Self {
        Self {
            id: UserId::new(dto.id),
            email: dto.email,
            is_active: dto.is_active,
            is_superuser: dto.is_superuser,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RoomDto {
    pub(super) name: String,
    #[serde(default)]
    pub(super) display_name: Option<String>,
    #[serde(default)]
    pub(super) logo_url: Option<String>,
    #[serde(default)]
    pub(super) welcome_page_id: Option<i64>,
    #[serde(default)]
    pub(super) public_slug: Option<String>,
}

impl RoomDto {
    fn into_room(self) -> Result<Room, String> {
        let name = RoomName::new(self.name.as_str())
            .map_err(|error| format!("room {:?}: {error}", self.name))?;
        let display_name = self
            .display_name
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| self.name.clone());
        Ok(Room {
            name,
            display_name,
            logo_url: self.logo_url,
            welcome_page_id: self.welcome_page_id.map(PageId::new),
            public_slug: self.public_slug.filter(|slug| !slug.trim().is_empty()),
        })
    }
}

/// Decode a room listing, skipping rooms whose names cannot appear in a path.
pub(super) fn rooms_from_dtos(rooms: Vec<RoomDto>) -> Vec<Room> {
    rooms
        .into_iter()
        .filter_map(|dto| match dto.into_room() {
            Ok(room) => Some(room),
            Err(error) => {
                warn!(%error, "skipping room with unusable name");
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(super) struct RoleDto {
    #[serde(default)]
    pub(super) role: Option<String>,
}

impl RoleDto {
    pub(super) fn into_role(self) -> Result<Option<Role>, String> {
        let Some(raw) = self.role else {
            return Ok(None);
        };
        match raw.to_ascii_lowercase().as_str() {
            "owner" => Ok(Some(Role::Owner)),
            "admin" => Ok(Some(Role::Admin)),
            "editor" => Ok(Some(Role::Editor)),
            "viewer" => Ok(Some(Role::Viewer)),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DefaultLogoDto {
    #[serde(default)]
    pub(super) logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PageDto {
    pub(super) id: i64,
    pub(super) slug: String,
}

impl PageDto {
    pub(super) fn into_page_ref(self) -> Result<PageRef, String> {
        Ok(PageRef {
            id: PageId::new(self.id),
            slug: parse_slug(self.slug)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PageTreeNodeDto {
    pub(super) id: i64,
    pub(super) title: String,
    pub(super) slug: String,
    #[serde(default)]
    pub(super) path: String,
    #[serde(default)]
    pub(super) children: Vec<PageTreeNodeDto>,
}

impl PageTreeNodeDto {
    fn into_node(self) -> Result<PageTreeNode, String> {
        Ok(PageTreeNode {
            id: PageId::new(self.id),
            title: self.title,
            slug: parse_slug(self.slug)?,
            path: self.path,
            children: tree_from_dtos(self.children)?,
        })
    }
}

pub(super) fn tree_from_dtos(nodes: Vec<PageTreeNodeDto>) -> Result<Vec<PageTreeNode>, String> {
    nodes.into_iter().map(PageTreeNodeDto::into_node).collect()
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto {
    #[serde(default)]
    pub(super) results: Vec<SearchHitDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchHitDto {
    pub(super) id: i64,
    pub(super) title: String,
    pub(super) slug: String,
    #[serde(default)]
    pub(super) headline: String,
    #[serde(default)]
    pub(super) rank: f64,
}

impl SearchResponseDto {
    pub(super) fn into_hits(self) -> Result<Vec<SearchHit>, String> {
        self.results
            .into_iter()
            .map(|hit| {
                Ok(SearchHit {
                    id: PageId::new(hit.id),
                    title: hit.title,
                    slug: parse_slug(hit.slug)?,
                    headline: hit.headline,
                    rank: hit.rank,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PublicInfoDto {
    pub(super) name: String,
    #[serde(default)]
    pub(super) display_name: Option<String>,
    #[serde(default)]
    pub(super) logo_url: Option<String>,
}

impl From<PublicInfoDto> for PublicRoomInfo {
    fn from(dto: PublicInfoDto) -> Self {
        Self {
            display_name: dto.display_name.unwrap_or(dto.name),
            logo_url: dto.logo_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PublicPageDto {
    pub(super) id: i64,
    pub(super) title: String,
    pub(super) slug: String,
    #[serde(default)]
    pub(super) content: Option<Value>,
}

impl PublicPageDto {
    pub(super) fn into_page(self) -> Result<PublicPage, String> {
        let content = match self.content {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text),
            Some(document) => Some(document.to_string()),
        };
        Ok(PublicPage {
            id: PageId::new(self.id),
            title: self.title,
            slug: parse_slug(self.slug)?,
            content,
        })
    }
}

/// FastAPI style error body: `detail` is a message or a list of
/// validation issues.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) detail: Option<Value>,
}

impl ErrorBodyDto {
    pub(super) fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Array(issues) => issues
                .iter()
                .find_map(|issue| issue.get("msg").and_then(Value::as_str))
                .map(str::to_owned),
            _ => None,
        }
    }
}

fn parse_slug(raw: String) -> Result<PageSlug, String> {
    PageSlug::new(raw.as_str()).map_err(|error| format!("slug {raw:?}: {error}"))
}
