use std::time::Instant;

use tracing::{info, trace, warn};

use crate::infra::{GameConnection, GameObserver};
use crate::planners::Planner;
use crate::protocol::ServerMessage;
use crate::state::WorldState;

pub struct Game {
    connection: GameConnection,
    observer: Box<dyn GameObserver>,
    planner: Planner,
    world: WorldState,
    player_name: String,
}

impl Game {
    pub fn new(
        connection: GameConnection,
        observer: impl GameObserver + 'static,
        player_name: String,
    ) -> Self {
        Self {
            connection,
            observer: Box::new(observer),
            planner: Planner::new(),
            world: WorldState::new(),
            player_name,
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Play one game: register, then answer every move request until the
    /// server announces the end of the game or hangs up.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.connection.send_connect(&self.player_name).await?;

        while let Some(message) = self.connection.next_message().await? {
            match message {
                ServerMessage::Connected { player_id, .. } => {
                    self.world.set_player_id(player_id);
                    self.observer.on_connected(player_id);
                }
                ServerMessage::MoveRequest(request) => {
                    let tick_start = Instant::now();

                    let Some(player_id) = self.world.player_id else {
                        warn!("Move request before connection was confirmed, ignoring");
                        continue;
                    };
                    if !self.world.update(&request) {
                        continue;
                    }
                    self.observer.on_state_update(&self.world);

                    let (tactic, direction) = self.planner.decide_action(&mut self.world);
                    self.observer.on_tactic_selected(&tactic, &self.world);
                    self.observer.on_action_selected(direction, &self.world);

                    self.connection.send_move(player_id, direction).await?;

                    let tick_duration = tick_start.elapsed();
                    if tick_duration.as_millis() > 100 {
                        warn!(
                            "Round {} took {:.2}ms (action: {:?})",
                            self.world.round,
                            tick_duration.as_secs_f64() * 1000.0,
                            direction
                        );
                    }
                }
                ServerMessage::ResponseOk { msg } => trace!("Server: {}", msg),
                ServerMessage::Error { msg } => self.observer.on_server_error(&msg.to_string()),
                ServerMessage::GameOver { winner } => {
                    self.observer.on_game_finished(winner.as_ref(), &self.world);
                    self.world.reset_for_new_game();
                    return Ok(());
                }
                ServerMessage::Ignored => {}
            }
        }

        info!("Server closed the connection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::Tactic;
    use crate::protocol::{Direction, PlayerRecord};
    use futures_util::{SinkExt, StreamExt};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message;

    #[derive(Clone, Default)]
    struct RecordingObserver {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl GameObserver for RecordingObserver {
        fn on_connected(&mut self, player_id: i32) {
            self.events.lock().unwrap().push(format!("connected {}", player_id));
        }

        fn on_state_update(&mut self, world: &WorldState) {
            self.events.lock().unwrap().push(format!("round {}", world.round));
        }

        fn on_tactic_selected(&mut self, tactic: &Tactic, _world: &WorldState) {
            self.events.lock().unwrap().push(format!("{:?}", tactic));
        }

        fn on_action_selected(&mut self, direction: Direction, _world: &WorldState) {
            self.events
                .lock()
                .unwrap()
                .push(direction.as_str_name().to_string());
        }

        fn on_game_finished(&mut self, winner: Option<&PlayerRecord>, _world: &WorldState) {
            let winner = winner.map(|w| w.id).unwrap_or(-1);
            self.events.lock().unwrap().push(format!("winner {}", winner));
        }
    }

    const MOVE_REQUEST: &str = r#"{"type":"MoveRequest","map":{"width":4,"height":1,"fields":[[1,1,1,1]]},"players":[{"id":5,"name":"razor1911","isAlive":true,"hasFlag":false,"basePosition":{"x":0,"y":0},"viewRange":2,"maxMovesPerRound":3,"movesLeft":3,"x":0,"y":0}],"flag":{"x":3,"y":0}}"#;

    #[tokio::test]
    async fn test_session_answers_move_request() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();

            let connect = socket.next().await.unwrap().unwrap().into_text().unwrap();
            socket
                .send(Message::text(
                    r#"{"type":"Connected","msg":"Connected","playerId":5}"#,
                ))
                .await
                .unwrap();
            socket.send(Message::text(MOVE_REQUEST)).await.unwrap();
            let reply = socket.next().await.unwrap().unwrap().into_text().unwrap();
            socket
                .send(Message::text(r#"{"type":"Error","msg":"late move"}"#))
                .await
                .unwrap();
            socket
                .send(Message::text(r#"{"type":"GameOver","winner":null}"#))
                .await
                .unwrap();
            (connect.as_str().to_string(), reply.as_str().to_string())
        });

        let connection = GameConnection::new(&addr.to_string(), None).await.unwrap();
        let observer = RecordingObserver::default();
        let events = Arc::clone(&observer.events);
        let mut game = Game::new(connection, observer, "razor1911".to_string());

        game.run().await.unwrap();

        let (connect, reply) = server.await.unwrap();
        let connect: serde_json::Value = serde_json::from_str(&connect).unwrap();
        assert_eq!(connect["name"], "razor1911");

        let reply: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(
            reply,
            serde_json::json!({"type": "Move", "playerId": 5, "move": "right"})
        );

        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "connected 5".to_string(),
                "round 1".to_string(),
                "Advance(Position { x: 3, y: 0 })".to_string(),
                "right".to_string(),
                "winner -1".to_string(),
            ]
        );

        // World is cleared for the next game, identity kept
        assert_eq!(game.world().player_id, Some(5));
        assert!(game.world().grid.is_none());
    }
}
