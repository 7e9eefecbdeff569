//! Terrain strategies with controllable behaviour.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};

use levelforge_domain::{AlgorithmParameters, TileGrid, TileType};
use tokio::sync::oneshot;

use crate::generation::TerrainGenerator;

/// Panics on every call.
pub struct BrokenTerrain;

impl TerrainGenerator for BrokenTerrain {
    fn name(&self) -> &str {
        "broken"
    }

    fn generate(&self, _: usize, _: usize, _: i64, _: &AlgorithmParameters) -> TileGrid {
        panic!("broken terrain")
    }
}

/// Open ground; blocks inside one chosen call until released.
pub struct GatedTerrain {
    calls: AtomicUsize,
    block_on_call: usize,
    reached: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// Test-side handle of a `GatedTerrain`.
pub struct Gate {
    reached: Option<oneshot::Receiver<()>>,
    release: mpsc::Sender<()>,
}

/// A strategy that blocks during call `block_on_call` (zero-based).
pub fn gated(block_on_call: usize) -> (GatedTerrain, Gate) {
    let (reached_tx, reached_rx) = oneshot::channel();
    let (release_tx, release_rx) = mpsc::channel();
    (
        GatedTerrain {
            calls: AtomicUsize::new(0),
            block_on_call,
            reached: Mutex::new(Some(reached_tx)),
            release: Mutex::new(release_rx),
        },
        Gate {
            reached: Some(reached_rx),
            release: release_tx,
        },
    )
}

impl Gate {
    /// Wait until the strategy is blocked inside the gated call.
    pub async fn reached(&mut self) {
        let reached = self.reached.take().expect("gate already reached");
        reached.await.expect("gated call never happened");
    }

    /// Let the blocked call finish.
    pub fn release(&self) {
        let _ = self.release.send(());
    }
}

impl TerrainGenerator for GatedTerrain {
    fn name(&self) -> &str {
        "gated"
    }

    fn generate(&self, width: usize, height: usize, _: i64, _: &AlgorithmParameters) -> TileGrid {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.block_on_call {
            if let Some(reached) = self.reached.lock().expect("reached lock").take() {
                let _ = reached.send(());
            }
            // A dropped gate releases too
            let _ = self.release.lock().expect("release lock").recv();
        }
        TileGrid::filled(width, height, TileType::Ground)
    }
}
