// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Terminal multiplexer implementations
//!
//! tmux is the only backend tmux-noc drives; the trait lives in
//! `noc-mux-core` so the domain crate can be exercised against fakes.

use tracing::{debug, info, instrument, warn};

pub mod detection;
#[cfg(feature = "tmux")]
pub mod tmux;

pub use detection::*;
#[cfg(feature = "tmux")]
pub use tmux::TmuxMultiplexer;

use noc_mux_core::*;

/// Get the default multiplexer for the current system
#[instrument(fields(component = "noc_mux", operation = "default_multiplexer"))]
pub fn default_multiplexer() -> Result<Box<dyn Multiplexer + Send + Sync>, MuxError> {
    info!("Starting multiplexer detection");

    #[cfg(feature = "tmux")]
    {
        let tmux = tmux::TmuxMultiplexer::new();
        if tmux.is_available() {
            if !is_in_tmux() {
                warn!("tmux is installed but TMUX is not set; commands target the default server");
            }
            info!(multiplexer = "tmux", "Found available multiplexer");
            return Ok(Box::new(tmux));
        }
        debug!(multiplexer = "tmux", "Multiplexer not available");
    }

    warn!("No supported multiplexer found");
    Err(MuxError::NotAvailable("No supported multiplexer found"))
}
