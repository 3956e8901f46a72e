use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use futures_util::{SinkExt, StreamExt};
use time::{OffsetDateTime, format_description};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{trace, warn};

use crate::infra::ConnectionError;
use crate::protocol::{ClientMessage, Direction, ServerMessage};

/// WebSocket connection to the game server, one JSON message per text frame.
pub struct GameConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    replay_file: Option<ReplayFile>,
}

/// `host:port` becomes `ws://host:port`; full `ws://` or `wss://` URLs pass through.
pub fn server_url(host: &str) -> String {
    if host.starts_with("ws://") || host.starts_with("wss://") {
        host.to_string()
    } else {
        format!("ws://{}", host)
    }
}

impl GameConnection {
    pub async fn new(host: &str, replay_file: Option<ReplayFile>) -> Result<Self, ConnectionError> {
        let (socket, _response) = connect_async(server_url(host)).await?;
        Ok(GameConnection {
            socket,
            replay_file,
        })
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<(), ConnectionError> {
        let text = serde_json::to_string(message)?;
        trace!("-> {}", text);
        self.record(&text);

        self.socket.send(Message::text(text)).await?;
        Ok(())
    }

    pub async fn send_connect(&mut self, name: &str) -> Result<(), ConnectionError> {
        self.send(&ClientMessage::Connect {
            name: name.to_string(),
        })
        .await
    }

    pub async fn send_move(
        &mut self,
        player_id: i32,
        direction: Direction,
    ) -> Result<(), ConnectionError> {
        self.send(&ClientMessage::Move {
            player_id,
            direction,
        })
        .await
    }

    /// Wait for the next server message. `None` once the server closes the
    /// socket. Frames that do not parse are logged and skipped.
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>, ConnectionError> {
        while let Some(frame) = self.socket.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => return Ok(None),
                Ok(Message::Binary(_)) => {
                    warn!("Skipping binary frame");
                    continue;
                }
                Ok(_) => continue,
                Err(WsError::ConnectionClosed)
                | Err(WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)) => {
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            };

            let text = text.as_str();
            if text.trim().is_empty() {
                continue;
            }
            trace!("<- {}", text);
            self.record(text);

            match serde_json::from_str(text) {
                Ok(message) => return Ok(Some(message)),
                Err(err) => warn!("Skipping malformed message: {}", err),
            }
        }
        Ok(None)
    }

    fn record(&mut self, line: &str) {
        let failed = match &mut self.replay_file {
            Some(replay_file) => replay_file.append(line).err(),
            None => None,
        };
        if let Some(err) = failed {
            warn!("Replay recording stopped: {}", err);
            self.replay_file = None;
        }
    }
}

/// Every message of a session, one JSON document per line.
pub struct ReplayFile {
    path: PathBuf,
    file: File,
}

impl ReplayFile {
    pub fn new(replays_folder: &str, player_name: &str) -> Result<Self, io::Error> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let format = format_description::parse("[year][month][day]-[hour][minute][second]")
            .map_err(io::Error::other)?;
        let date_time_str = now.format(&format).map_err(io::Error::other)?;

        let path = Path::new(replays_folder).join(format!("{} - {}.ctf", player_name, date_time_str));

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;
        Ok(ReplayFile { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()
    }
}
