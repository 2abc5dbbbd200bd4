//! HTTP implementation of the game backend contract.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::api::{GameBackend, RoomAuth};
use super::config::BackendConfig;
use super::error::{BackendError, BackendResult};
use super::models::{
    GameRecord, NewGame, NewPlayer, NewRoom, NewTurn, PlayerRecord, RemainingUpdate, RoomRecord,
    StatusUpdate, TurnRecord, WinnerUpdate,
};
use crate::dto::{GameSnapshotDto, GameStatus};
use crate::engine::GameSettings;

/// Header carrying a room-scoped scorer token.
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Error body the backend attaches to failed requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Game backend reached over its REST surface.
#[derive(Clone)]
pub struct HttpGameBackend {
    client: Client,
    base_url: Arc<str>,
    session_token: Option<Arc<str>>,
}

impl HttpGameBackend {
    /// Build a backend client from its configuration.
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| BackendError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.as_str()),
            session_token: config.session_token.map(|token| Arc::from(token.as_str())),
        })
    }

    fn request(&self, method: Method, path: &str, auth: Option<&RoomAuth>) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match auth {
            Some(RoomAuth::AdminToken(token)) => builder.header(ADMIN_TOKEN_HEADER, token),
            Some(RoomAuth::OwnerSession(session)) => builder.bearer_auth(session),
            None => match &self.session_token {
                Some(session) => builder.bearer_auth(session.as_ref()),
                None => builder,
            },
        }
    }

    /// Send a request whose target must exist; a 404 surfaces the backend's
    /// own message verbatim.
    async fn send_expect(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> BackendResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| BackendError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BackendError::Unauthorized {
                path: path.to_string(),
            }),
            StatusCode::NOT_FOUND => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .map(|body| body.message)
                    .unwrap_or_else(|_| format!("`{path}` not found"));
                Err(BackendError::NotFound { message })
            }
            status if status.is_success() => Ok(response),
            status => Err(BackendError::RequestStatus {
                path: path.to_string(),
                status,
            }),
        }
    }

    async fn decode<T>(&self, response: reqwest::Response, path: &str) -> BackendResult<T>
    where
        T: DeserializeOwned,
    {
        response
            .json::<T>()
            .await
            .map_err(|source| BackendError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    /// GET a resource that may legitimately be absent.
    async fn fetch_optional<T>(&self, path: &str) -> BackendResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path, None)
            .send()
            .await
            .map_err(|source| BackendError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => self.decode(response, path).await.map(Some),
            status => Err(BackendError::RequestStatus {
                path: path.to_string(),
                status,
            }),
        }
    }
}

impl GameBackend for HttpGameBackend {
    fn create_room(&self, room: NewRoom) -> BoxFuture<'static, BackendResult<RoomRecord>> {
        let backend = self.clone();
        Box::pin(async move {
            let path = "rooms".to_string();
            let builder = backend.request(Method::POST, &path, None).json(&room);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }

    fn room_by_code(
        &self,
        code: &str,
    ) -> BoxFuture<'static, BackendResult<Option<RoomRecord>>> {
        let backend = self.clone();
        let path = format!("rooms/by-code/{code}");
        Box::pin(async move { backend.fetch_optional(&path).await })
    }

    fn create_game(
        &self,
        room_id: &str,
        settings: &GameSettings,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<GameRecord>> {
        let backend = self.clone();
        let path = format!("rooms/{room_id}/games");
        let payload = NewGame {
            mode: settings.mode.starting_score(),
            double_out: settings.double_out,
        };
        let auth = auth.clone();
        Box::pin(async move {
            let builder = backend
                .request(Method::POST, &path, Some(&auth))
                .json(&payload);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }

    fn game_by_id(&self, game_id: &str) -> BoxFuture<'static, BackendResult<Option<GameRecord>>> {
        let backend = self.clone();
        let path = format!("games/{game_id}");
        Box::pin(async move { backend.fetch_optional(&path).await })
    }

    fn games_by_room(&self, room_id: &str) -> BoxFuture<'static, BackendResult<Vec<GameRecord>>> {
        let backend = self.clone();
        let path = format!("rooms/{room_id}/games");
        Box::pin(async move {
            let builder = backend.request(Method::GET, &path, None);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }

    fn add_player(
        &self,
        game_id: &str,
        name: &str,
        seat_order: u32,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<PlayerRecord>> {
        let backend = self.clone();
        let path = format!("games/{game_id}/players");
        let payload = NewPlayer {
            name: name.to_string(),
            seat_order,
        };
        let auth = auth.clone();
        Box::pin(async move {
            let builder = backend
                .request(Method::POST, &path, Some(&auth))
                .json(&payload);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }

    fn players_by_game(
        &self,
        game_id: &str,
    ) -> BoxFuture<'static, BackendResult<Vec<PlayerRecord>>> {
        let backend = self.clone();
        let path = format!("games/{game_id}/players");
        Box::pin(async move {
            let builder = backend.request(Method::GET, &path, None);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }

    fn create_turn(
        &self,
        game_id: &str,
        turn: NewTurn,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<TurnRecord>> {
        let backend = self.clone();
        let path = format!("games/{game_id}/turns");
        let auth = auth.clone();
        Box::pin(async move {
            let builder = backend
                .request(Method::POST, &path, Some(&auth))
                .json(&turn);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }

    fn turns_by_game(
        &self,
        game_id: &str,
        limit: u32,
        offset: u32,
    ) -> BoxFuture<'static, BackendResult<Vec<TurnRecord>>> {
        let backend = self.clone();
        let path = format!("games/{game_id}/turns");
        Box::pin(async move {
            let builder = backend
                .request(Method::GET, &path, None)
                .query(&[("limit", limit), ("offset", offset)]);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }

    fn update_player_remaining(
        &self,
        player_id: &str,
        remaining: u16,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        let path = format!("players/{player_id}/remaining");
        let auth = auth.clone();
        Box::pin(async move {
            let builder = backend
                .request(Method::PUT, &path, Some(&auth))
                .json(&RemainingUpdate { remaining });
            backend.send_expect(builder, &path).await?;
            Ok(())
        })
    }

    fn set_game_winner(
        &self,
        game_id: &str,
        player_id: &str,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        let path = format!("games/{game_id}/winner");
        let payload = WinnerUpdate {
            player_id: player_id.to_string(),
        };
        let auth = auth.clone();
        Box::pin(async move {
            let builder = backend
                .request(Method::PUT, &path, Some(&auth))
                .json(&payload);
            backend.send_expect(builder, &path).await?;
            Ok(())
        })
    }

    fn update_game_status(
        &self,
        game_id: &str,
        status: GameStatus,
        auth: &RoomAuth,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        let path = format!("games/{game_id}/status");
        let auth = auth.clone();
        Box::pin(async move {
            let builder = backend
                .request(Method::PUT, &path, Some(&auth))
                .json(&StatusUpdate { status });
            backend.send_expect(builder, &path).await?;
            Ok(())
        })
    }

    fn fetch_snapshot(
        &self,
        game_id: &str,
    ) -> BoxFuture<'static, BackendResult<GameSnapshotDto>> {
        let backend = self.clone();
        let path = format!("games/{game_id}/snapshot");
        Box::pin(async move {
            let builder = backend.request(Method::GET, &path, None);
            let response = backend.send_expect(builder, &path).await?;
            backend.decode(response, &path).await
        })
    }
}
