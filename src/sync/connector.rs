//! Opening the per-game realtime channel.
//!
//! The transport only needs a stream of raw text messages; how the channel is
//! established is behind [`ChannelConnector`] so tests can script channels
//! and other transports can be plugged in.

use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::sync::transport::TransportError;

/// Live subscription to one game's event channel: raw inbound messages until
/// the channel errors or the peer closes it.
pub type EventChannel = BoxStream<'static, Result<String, TransportError>>;

/// Strategy for opening the logical channel of a game.
pub trait ChannelConnector: Send + Sync {
    /// Open the channel for `game_id`. Reconnection attempts call this again
    /// with the same id.
    fn open(&self, game_id: &str) -> BoxFuture<'static, Result<EventChannel, TransportError>>;
}

#[cfg(feature = "ws-transport")]
pub use ws::WsConnector;

#[cfg(feature = "ws-transport")]
mod ws {
    use futures::StreamExt;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;

    use super::{BoxFuture, ChannelConnector, EventChannel, TransportError};

    /// WebSocket-backed connector addressing `<base>/ws/games/<game_id>`.
    pub struct WsConnector {
        base_url: String,
    }

    impl WsConnector {
        /// Connector rooted at `base_url` (`ws://` or `wss://`).
        pub fn new(base_url: impl Into<String>) -> Self {
            let mut base_url: String = base_url.into();
            while base_url.ends_with('/') {
                base_url.pop();
            }
            Self { base_url }
        }

        fn channel_url(&self, game_id: &str) -> String {
            format!("{}/ws/games/{game_id}", self.base_url)
        }
    }

    impl ChannelConnector for WsConnector {
        fn open(&self, game_id: &str) -> BoxFuture<'static, Result<EventChannel, TransportError>> {
            let url = self.channel_url(game_id);
            Box::pin(async move {
                let (socket, _response) = connect_async(url.as_str()).await.map_err(|source| {
                    TransportError::Open {
                        url: url.clone(),
                        source: Box::new(source),
                    }
                })?;

                let messages = socket.filter_map(|message| async move {
                    match message {
                        Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                        Ok(Message::Close(_)) => Some(Err(TransportError::Closed)),
                        // Pings, pongs, and binary frames are transport noise.
                        Ok(_) => None,
                        Err(source) => Some(Err(TransportError::Read {
                            source: Box::new(source),
                        })),
                    }
                });

                Ok(messages.boxed())
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn channel_url_is_rooted_at_the_game() {
            let connector = WsConnector::new("ws://darts.local:9000/");
            assert_eq!(
                connector.channel_url("g-42"),
                "ws://darts.local:9000/ws/games/g-42"
            );
        }
    }
}
