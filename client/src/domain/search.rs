//! Full-text search scoped to the active room.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{PageSearch, PageSearchError, RequestScope};
use crate::domain::{AccessToken, Error, RoomName, SearchHit};

/// Search service over the [`PageSearch`] port.
#[derive(Clone)]
pub struct SearchService {
    search: Arc<dyn PageSearch>,
}

impl SearchService {
    /// Wrap the search port.
    pub fn new(search: Arc<dyn PageSearch>) -> Self {
        Self { search }
    }

    /// Search `room` (or every room the caller can read when unset).
    ///
    /// A blank query returns no hits without contacting the server.
    pub async fn search(
        &self,
        token: &AccessToken,
        room: Option<&RoomName>,
        query: &str,
    ) -> Result<Vec<SearchHit>, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let scope = room.map_or_else(
            || RequestScope::authenticated(token),
            |room| RequestScope::for_room(token, room),
        );
        let hits = self
            .search
            .search(&scope, query)
            .await
            .map_err(|error| match error {
                PageSearchError::Unauthorized => Error::unauthorized(error.to_string()),
                PageSearchError::Transport { .. } => Error::network(error.to_string()),
                PageSearchError::Decode { .. } => Error::internal(error.to_string()),
            })?;
        debug!(query, hits = hits.len(), "search completed");
        Ok(hits)
    }
}
