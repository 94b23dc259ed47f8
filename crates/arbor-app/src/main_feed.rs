//! Main feed cells.
//!
//! Cells are recycled by the platform list views; a cell's bindings live
//! in its own bag and are reset on reuse so a stale binding can never
//! fire for the wrong model.

use arbor_core::{CancelBag, EventSource, MainScheduler};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The trending board teaser shown in the feed header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingBoardModel {
    /// Board title.
    pub title: String,
    /// Teaser content line.
    pub content: String,
}

/// Header cell surfacing the trending board.
pub struct TrendingBoardHeader {
    board: Mutex<Option<TrendingBoardModel>>,
    board_tap: EventSource<TrendingBoardModel>,
    cancel_bag: CancelBag,
}

impl TrendingBoardHeader {
    /// Create an unbound cell.
    pub fn new(scheduler: &MainScheduler) -> Self {
        Self {
            board: Mutex::new(None),
            board_tap: EventSource::new(scheduler),
            cancel_bag: CancelBag::new(),
        }
    }

    /// Emits the bound board when the cell is tapped.
    pub fn board_tap(&self) -> EventSource<TrendingBoardModel> {
        self.board_tap.clone()
    }

    /// The cell's binding bag.
    pub fn cancel_bag(&self) -> &CancelBag {
        &self.cancel_bag
    }

    /// Configure the cell for a board.
    pub fn bind_model(&self, board: TrendingBoardModel) {
        *self.board.lock() = Some(board);
    }

    /// A tap on an unbound cell is ignored.
    pub fn handle_tap(&self) {
        let Some(board) = self.board.lock().clone() else {
            return;
        };
        self.board_tap.send(board);
    }

    /// Recycle: kill the old bindings and drop the model before the cell
    /// is configured again.
    pub fn prepare_for_reuse(&self) {
        self.cancel_bag.reset();
        *self.board.lock() = None;
    }
}
