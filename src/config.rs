//! Server configuration

use std::net::SocketAddr;

use crate::display::map::DEFAULT_DEPTH;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP listen address
    pub listen_addr: SocketAddr,
    /// Path to the world database
    pub db_path: String,
    /// Minimap exploration depth, in rooms from the player
    pub map_depth: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9001".parse().unwrap(),
            db_path: "world.db".to_string(),
            map_depth: DEFAULT_DEPTH,
        }
    }
}
