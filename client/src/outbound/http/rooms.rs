//! Reqwest-backed room directory adapter.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use super::api_client::{ApiClient, Reply};
use super::dto::{DefaultLogoDto, RoleDto, RoomDto, rooms_from_dtos};
use crate::domain::ports::{RequestScope, RoomDirectory, RoomDirectoryError};
use crate::domain::{AccessToken, Role, Room, RoomName};

/// [`RoomDirectory`] over the `admin/*` room endpoints.
#[derive(Debug, Clone)]
pub struct HttpRoomDirectory {
    api: ApiClient,
}

impl HttpRoomDirectory {
    /// Wrap a shared API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn get(&self, segments: &[&str], scope: &RequestScope) -> Result<Reply, RoomDirectoryError> {
        let request = self
            .api
            .request(Method::GET, self.api.endpoint(segments), scope);
        self.api
            .execute(request)
            .await
            .map_err(|error| RoomDirectoryError::transport(error.to_string()))
    }
}

#[async_trait]
impl RoomDirectory for HttpRoomDirectory {
    async fn my_rooms(&self, token: &AccessToken) -> Result<Vec<Room>, RoomDirectoryError> {
        let reply = self
            .get(&["admin", "my-rooms"], &RequestScope::authenticated(token))
            .await?;
        check_status(&reply)?;
        reply
            .decode::<Vec<RoomDto>>()
            .map(rooms_from_dtos)
            .map_err(RoomDirectoryError::decode)
    }

    async fn my_role(
        &self,
        token: &AccessToken,
        room: &RoomName,
    ) -> Result<Option<Role>, RoomDirectoryError> {
        let reply = self
            .get(
                &["admin", "my-role", room.as_str()],
                &RequestScope::authenticated(token),
            )
            .await?;
        if matches!(reply.status, StatusCode::NOT_FOUND | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        check_status(&reply)?;
        reply
            .decode::<RoleDto>()
            .and_then(RoleDto::into_role)
            .map_err(RoomDirectoryError::decode)
    }

    async fn default_logo(&self) -> Result<Option<String>, RoomDirectoryError> {
        let reply = self
            .get(&["admin", "default-logo"], &RequestScope::anonymous())
            .await?;
        if reply.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(&reply)?;
        reply
            .decode::<DefaultLogoDto>()
            .map(|dto| dto.logo_url)
            .map_err(RoomDirectoryError::decode)
    }
}

fn check_status(reply: &Reply) -> Result<(), RoomDirectoryError> {
    match reply.status {
        status if status.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(RoomDirectoryError::unauthorized()),
        StatusCode::FORBIDDEN => Err(RoomDirectoryError::forbidden(reply.describe())),
        _ => Err(RoomDirectoryError::transport(reply.describe())),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network status mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::OK, None)]
    #[case(StatusCode::UNAUTHORIZED, Some(RoomDirectoryError::unauthorized()))]
    #[case(
        StatusCode::FORBIDDEN,
        Some(RoomDirectoryError::forbidden("status 403: Not a member"))
    )]
    #[case(
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(RoomDirectoryError::transport("status 500: Not a member"))
    )]
    fn statuses_map_to_port_errors(
        #[case] status: StatusCode,
        #[case] expected: Option<RoomDirectoryError>,
    ) {
        let reply = Reply {
            status,
            body: br#"{"detail": "Not a member"}"#.to_vec(),
        };
        assert_eq!(check_status(&reply).err(), expected);
    }
}
