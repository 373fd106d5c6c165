//! A Battlesnake that avoids walls and bodies one step ahead and otherwise moves at random.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod server;

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub use engine::{decide, Board, Direction, MoveEngine};

/// Install the global subscriber: `info` by default, `RUST_LOG` overrides.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
}
