//! UDP game server implementation.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use skirmish_shared::{ClientMessage, InventoryAction, PlayerInput, ServerMessage, WorldSnapshot};

use super::admission::admit;
use crate::auth::AuthService;
use crate::entities::ServerPlayer;
use crate::error::JoinError;
use crate::persistence::{CharacterRecord, PersistenceService};
use crate::world::GameWorld;

/// Maximum incoming packet size
const MAX_PACKET_SIZE: usize = 1200;

/// Admitted client
#[derive(Debug)]
pub struct ClientConnection {
    pub addr: SocketAddr,
    /// Runtime id in the world
    pub player_id: u64,
    pub character_id: u64,
    pub last_seen: Instant,
}

impl ClientConnection {
    pub fn new(addr: SocketAddr, player_id: u64, character_id: u64) -> Self {
        Self {
            addr,
            player_id,
            character_id,
            last_seen: Instant::now(),
        }
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Result of an admission task
#[derive(Debug)]
struct JoinOutcome {
    addr: SocketAddr,
    result: Result<CharacterRecord, JoinError>,
}

/// Game server
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: HashMap<SocketAddr, ClientConnection>,
    /// Addresses with an admission task in flight
    pending_joins: HashSet<SocketAddr>,
    join_tx: mpsc::Sender<JoinOutcome>,
    join_rx: mpsc::Receiver<JoinOutcome>,
    next_player_id: u64,
    auth: Arc<dyn AuthService>,
    persistence: Arc<dyn PersistenceService>,
    timeout: Duration,
}

impl Server {
    /// Create a new server bound to `addr`
    pub async fn bind(
        addr: &str,
        auth: Arc<dyn AuthService>,
        persistence: Arc<dyn PersistenceService>,
        timeout: Duration,
    ) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(addr).await?;
        let (join_tx, join_rx) = mpsc::channel(64);

        Ok(Self {
            socket: Arc::new(socket),
            clients: HashMap::new(),
            pending_joins: HashSet::new(),
            join_tx,
            join_rx,
            next_player_id: 1,
            auth,
            persistence,
            timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.socket.local_addr()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Apply everything that arrived since the last tick: finished joins,
    /// queued packets and timeouts.
    pub async fn process_incoming(&mut self, world: &mut GameWorld) {
        while let Ok(outcome) = self.join_rx.try_recv() {
            self.finish_join(outcome, world).await;
        }

        let mut buf = [0u8; MAX_PACKET_SIZE];

        // Non-blocking receive loop
        loop {
            match self.socket.try_recv_from(&mut buf) {
                Ok((len, addr)) => {
                    self.handle_packet(&buf[..len], addr, world).await;
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    break;
                }
                Err(e) => {
                    error!("Error receiving packet: {}", e);
                    break;
                }
            }
        }

        self.check_timeouts(world);
    }

    /// Handle a received packet
    async fn handle_packet(&mut self, data: &[u8], addr: SocketAddr, world: &mut GameWorld) {
        let message = match ClientMessage::deserialize(data) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Failed to deserialize packet from {}: {}", addr, e);
                return;
            }
        };

        if let Some(client) = self.clients.get_mut(&addr) {
            client.last_seen = Instant::now();
        }

        match message {
            ClientMessage::Join {
                protocol_version,
                token,
                character_id,
            } => {
                self.handle_join(addr, protocol_version, token, character_id).await;
            }
            ClientMessage::PlayerInput(input) => {
                self.handle_player_input(addr, input, world);
            }
            ClientMessage::InventoryAction(action) => {
                self.handle_inventory_action(addr, action, world).await;
            }
            ClientMessage::Disconnect => {
                self.drop_connection(addr, world, "disconnected");
            }
        }
    }

    /// Start admission on a background task. The result is picked up by the
    /// next `process_incoming`.
    async fn handle_join(
        &mut self,
        addr: SocketAddr,
        protocol_version: u32,
        token: String,
        character_id: Option<u64>,
    ) {
        if let Some(client) = self.clients.get(&addr) {
            // Lost AssignId, answer again
            let msg = ServerMessage::AssignId { id: client.player_id };
            self.send_to(addr, &msg).await;
            return;
        }
        if !self.pending_joins.insert(addr) {
            return;
        }

        let auth = Arc::clone(&self.auth);
        let persistence = Arc::clone(&self.persistence);
        let tx = self.join_tx.clone();
        tokio::spawn(async move {
            let result = admit(&*auth, &*persistence, protocol_version, &token, character_id).await;
            let _ = tx.send(JoinOutcome { addr, result }).await;
        });
    }

    async fn finish_join(&mut self, outcome: JoinOutcome, world: &mut GameWorld) {
        let JoinOutcome { addr, result } = outcome;
        self.pending_joins.remove(&addr);

        let result = result.and_then(|record| {
            if world.players().any(|p| p.character_id == record.character_id) {
                Err(JoinError::AlreadyInWorld(record.character_id))
            } else {
                Ok(record)
            }
        });
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Join from {} rejected: {}", addr, e);
                let msg = ServerMessage::JoinRejected { reason: e.to_string() };
                self.send_to(addr, &msg).await;
                return;
            }
        };

        let player_id = self.next_player_id;
        self.next_player_id += 1;

        let player = ServerPlayer::from_record(player_id, &record, world.items());
        world.add_player(player);
        self.clients
            .insert(addr, ClientConnection::new(addr, player_id, record.character_id));
        info!("Client {} joined as player {}", addr, player_id);

        self.send_to(addr, &ServerMessage::AssignId { id: player_id }).await;
    }

    /// Keep only the newest input; it is read by the next tick
    fn handle_player_input(&mut self, addr: SocketAddr, input: PlayerInput, world: &mut GameWorld) {
        if let Some(client) = self.clients.get(&addr) {
            world.set_player_input(client.player_id, input);
        }
    }

    async fn handle_inventory_action(&mut self, addr: SocketAddr, action: InventoryAction, world: &mut GameWorld) {
        let Some(client) = self.clients.get(&addr) else {
            return;
        };
        let reply = world.handle_inventory_action(client.player_id, &action);
        self.send_to(addr, &reply).await;
    }

    /// Forget a connection, remove its player and save it
    fn drop_connection(&mut self, addr: SocketAddr, world: &mut GameWorld, reason: &str) {
        self.pending_joins.remove(&addr);
        let Some(connection) = self.clients.remove(&addr) else {
            return;
        };

        if let Some(player) = world.remove_player(connection.player_id) {
            self.persistence.save_character(player.to_record());
            info!(
                "Player {} ('{}', character {}) {}",
                connection.player_id, player.name, connection.character_id, reason
            );
        }
    }

    fn check_timeouts(&mut self, world: &mut GameWorld) {
        let timed_out: Vec<SocketAddr> = self
            .clients
            .values()
            .filter(|c| c.is_timed_out(self.timeout))
            .map(|c| c.addr)
            .collect();

        for addr in timed_out {
            warn!("Client {} timed out", addr);
            self.drop_connection(addr, world, "timed out");
        }
    }

    /// Send the tick's snapshot to every admitted client
    pub async fn broadcast_snapshot(&self, snapshot: WorldSnapshot) {
        let data = ServerMessage::GameState(snapshot).serialize();
        for addr in self.clients.keys() {
            if let Err(e) = self.socket.send_to(&data, addr).await {
                error!("Failed to broadcast to {}: {}", addr, e);
            }
        }
    }

    /// Save every connected player (shutdown)
    pub fn save_all_players(&self, world: &GameWorld) {
        for client in self.clients.values() {
            if let Some(player) = world.get_player(client.player_id) {
                self.persistence.save_character(player.to_record());
            }
        }
    }

    /// Send a message to a specific address
    async fn send_to(&self, addr: SocketAddr, msg: &ServerMessage) {
        let data = msg.serialize();
        if let Err(e) = self.socket.send_to(&data, addr).await {
            error!("Failed to send to {}: {}", addr, e);
        }
    }
}
