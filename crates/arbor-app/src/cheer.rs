//! Cheer feature, at its interface boundary.
//!
//! Sending a cheer is another feature's business; the briefing flow only
//! needs to show the message-template sheet and get the selection back.

use std::sync::Arc;

use arbor_core::{CancelBag, EventSource, MainScheduler};
use arbor_flow::{Scene, ViewModel};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Which template set the sheet offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheerMessageKind {
    /// Templates for a member met for the first time.
    CheerStranger,
    /// Templates for an existing friend.
    CheerFriend,
}

/// One selectable message template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheerMessageModel {
    /// Template identifier.
    pub id: u64,
    /// Message text.
    pub text: String,
}

/// The member a cheer is aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheerTargetModel {
    /// Community member id.
    pub member_id: u64,
    /// Display name.
    pub member_name: String,
    /// Whether the two members have never interacted before.
    pub is_first_meeting: bool,
}

/// A completed selection: target, message and anonymity choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheerSelectionModel {
    /// Who the cheer is for.
    pub target: CheerTargetModel,
    /// The chosen template.
    pub message: CheerMessageModel,
    /// Whether the sender stays anonymous.
    pub is_anonymous: bool,
}

/// Input sources owned by the sheet view.
pub struct CheerSheetInput {
    /// A template was tapped.
    pub message_tap: EventSource<CheerMessageModel>,
    /// The anonymous switch changed.
    pub anonymous_toggle: EventSource<bool>,
}

/// Output sources consumed by the sheet view and the coordinator.
pub struct CheerSheetOutput {
    /// The chosen message with the anonymity flag applied.
    pub selection: EventSource<(CheerMessageModel, bool)>,
}

/// View model for the message-template sheet.
pub struct CheerMessageSheetViewModel {
    kind: CheerMessageKind,
    selection: EventSource<(CheerMessageModel, bool)>,
    anonymous: Arc<Mutex<bool>>,
}

impl CheerMessageSheetViewModel {
    /// Create a sheet view model offering `kind` templates.
    pub fn new(scheduler: &MainScheduler, kind: CheerMessageKind) -> Self {
        Self {
            kind,
            selection: EventSource::new(scheduler),
            anonymous: Arc::new(Mutex::new(false)),
        }
    }

    /// Which template set this sheet offers.
    pub fn kind(&self) -> CheerMessageKind {
        self.kind
    }

    /// The selection source the coordinator consumes.
    pub fn selection(&self) -> EventSource<(CheerMessageModel, bool)> {
        self.selection.clone()
    }
}

impl ViewModel for CheerMessageSheetViewModel {
    type Input = CheerSheetInput;
    type Output = CheerSheetOutput;

    fn transform(&self, input: Self::Input, cancel_bag: &CancelBag) -> Self::Output {
        {
            let anonymous = self.anonymous.clone();
            input
                .anonymous_toggle
                .subscribe(move |flag| {
                    *anonymous.lock() = *flag;
                })
                .store_in(cancel_bag);
        }
        {
            let anonymous = self.anonymous.clone();
            let selection = self.selection.clone();
            input
                .message_tap
                .subscribe(move |message| {
                    selection.send((message.clone(), *anonymous.lock()));
                })
                .store_in(cancel_bag);
        }
        CheerSheetOutput {
            selection: self.selection.clone(),
        }
    }
}

/// A built message sheet with its overlay sizing.
#[derive(Clone)]
pub struct CheerSheet {
    /// The sheet scene.
    pub scene: Scene<CheerMessageSheetViewModel>,
    /// Minimum sheet height in points.
    pub minimum_content_height: u32,
}

/// Builds cheer scenes. One call per instantiation, no hidden state.
pub trait CheerFeatureBuildable: Send + Sync {
    /// Build the message-template sheet for `kind`.
    fn make_message_sheet(&self, kind: CheerMessageKind) -> CheerSheet;
}
