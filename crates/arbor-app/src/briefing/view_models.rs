//! Briefing view models.
//!
//! The coordinator-facing sources are owned by the view model and wired
//! before the view binds: the coordinator subscribes right after the
//! factory call, the view calls `transform` when it loads, and the
//! Output bundle hands the view clones of the same sources.

use arbor_core::{CancelBag, EventSource, MainScheduler};
use arbor_flow::ViewModel;

use crate::cheer::{CheerSelectionModel, CheerTargetModel};

use super::models::{BriefingCardModel, BriefingResultModel};

// ─── Main scene ─────────────────────────────────────────────────────────

/// Input sources owned by the main scene view.
pub struct BriefingMainInput {
    /// The view finished loading.
    pub view_did_load: EventSource<()>,
    /// The navigation back (close) button.
    pub back_button_tap: EventSource<()>,
    /// The "check today's briefing" button.
    pub check_briefing_button_tap: EventSource<()>,
}

/// Output sources for the main scene.
pub struct BriefingMainOutput {
    /// Date line for the header label.
    pub today: EventSource<String>,
    /// The user wants to leave the flow.
    pub back_requested: EventSource<()>,
    /// The user wants today's briefing.
    pub briefing_requested: EventSource<()>,
}

/// View model for the briefing entry scene.
pub struct BriefingMainViewModel {
    date_line: String,
    today: EventSource<String>,
    back_requested: EventSource<()>,
    briefing_requested: EventSource<()>,
}

impl BriefingMainViewModel {
    /// Create the view model with the formatted date line to display.
    pub fn new(scheduler: &MainScheduler, date_line: impl Into<String>) -> Self {
        Self {
            date_line: date_line.into(),
            today: EventSource::new(scheduler),
            back_requested: EventSource::new(scheduler),
            briefing_requested: EventSource::new(scheduler),
        }
    }

    /// Coordinator-facing: the user wants to leave the flow.
    pub fn back_requested(&self) -> EventSource<()> {
        self.back_requested.clone()
    }

    /// Coordinator-facing: the user wants today's briefing.
    pub fn briefing_requested(&self) -> EventSource<()> {
        self.briefing_requested.clone()
    }
}

impl ViewModel for BriefingMainViewModel {
    type Input = BriefingMainInput;
    type Output = BriefingMainOutput;

    fn transform(&self, input: Self::Input, cancel_bag: &CancelBag) -> Self::Output {
        {
            let today = self.today.clone();
            let date_line = self.date_line.clone();
            input
                .view_did_load
                .subscribe(move |_| today.send(date_line.clone()))
                .store_in(cancel_bag);
        }
        {
            let back_requested = self.back_requested.clone();
            input
                .back_button_tap
                .subscribe(move |_| back_requested.send(()))
                .store_in(cancel_bag);
        }
        {
            let briefing_requested = self.briefing_requested.clone();
            input
                .check_briefing_button_tap
                .subscribe(move |_| briefing_requested.send(()))
                .store_in(cancel_bag);
        }
        BriefingMainOutput {
            today: self.today.clone(),
            back_requested: self.back_requested.clone(),
            briefing_requested: self.briefing_requested.clone(),
        }
    }
}

// ─── Result scene ───────────────────────────────────────────────────────

/// Input sources owned by the result scene view.
pub struct BriefingResultInput {
    /// The view finished loading.
    pub view_did_load: EventSource<()>,
    /// The navigation back button.
    pub back_button_tap: EventSource<()>,
    /// The cheer button, carrying the target member.
    pub cheer_button_tap: EventSource<CheerTargetModel>,
    /// The "receive today's card" button.
    pub receive_card_button_tap: EventSource<BriefingCardModel>,
    /// A tap on a member's profile image.
    pub profile_image_tap: EventSource<u64>,
}

/// Output sources for the result scene.
pub struct BriefingResultOutput {
    /// The briefing to render.
    pub result: EventSource<BriefingResultModel>,
    /// The user wants to close the flow.
    pub back_requested: EventSource<()>,
    /// The user wants to cheer for a member.
    pub cheer_requested: EventSource<CheerTargetModel>,
    /// The user wants the card flow.
    pub card_flow_requested: EventSource<BriefingCardModel>,
    /// The user wants a member profile.
    pub profile_requested: EventSource<u64>,
    /// A cheer round-trip completed; the view reacts (toast, haptics).
    pub cheer_completed: EventSource<CheerSelectionModel>,
}

/// View model for the briefing result scene.
pub struct BriefingResultViewModel {
    result_model: BriefingResultModel,
    result: EventSource<BriefingResultModel>,
    back_requested: EventSource<()>,
    cheer_requested: EventSource<CheerTargetModel>,
    card_flow_requested: EventSource<BriefingCardModel>,
    profile_requested: EventSource<u64>,
    cheer_completed: EventSource<CheerSelectionModel>,
}

impl BriefingResultViewModel {
    /// Create the view model for one briefing.
    pub fn new(scheduler: &MainScheduler, result_model: BriefingResultModel) -> Self {
        Self {
            result_model,
            result: EventSource::new(scheduler),
            back_requested: EventSource::new(scheduler),
            cheer_requested: EventSource::new(scheduler),
            card_flow_requested: EventSource::new(scheduler),
            profile_requested: EventSource::new(scheduler),
            cheer_completed: EventSource::new(scheduler),
        }
    }

    /// Coordinator-facing: close the flow.
    pub fn back_requested(&self) -> EventSource<()> {
        self.back_requested.clone()
    }

    /// Coordinator-facing: run the cheer overlay.
    pub fn cheer_requested(&self) -> EventSource<CheerTargetModel> {
        self.cheer_requested.clone()
    }

    /// Coordinator-facing: run the card flow.
    pub fn card_flow_requested(&self) -> EventSource<BriefingCardModel> {
        self.card_flow_requested.clone()
    }

    /// Coordinator-facing: open a member profile.
    pub fn profile_requested(&self) -> EventSource<u64> {
        self.profile_requested.clone()
    }

    /// View-facing: a completed cheer round-trip.
    pub fn cheer_completed(&self) -> EventSource<CheerSelectionModel> {
        self.cheer_completed.clone()
    }

    /// Fed by the coordinator after the overlay round-trip.
    pub fn complete_cheer(&self, selection: CheerSelectionModel) {
        self.cheer_completed.send(selection);
    }
}

impl ViewModel for BriefingResultViewModel {
    type Input = BriefingResultInput;
    type Output = BriefingResultOutput;

    fn transform(&self, input: Self::Input, cancel_bag: &CancelBag) -> Self::Output {
        {
            let result = self.result.clone();
            let model = self.result_model.clone();
            input
                .view_did_load
                .subscribe(move |_| result.send(model.clone()))
                .store_in(cancel_bag);
        }
        {
            let back_requested = self.back_requested.clone();
            input
                .back_button_tap
                .subscribe(move |_| back_requested.send(()))
                .store_in(cancel_bag);
        }
        {
            let cheer_requested = self.cheer_requested.clone();
            input
                .cheer_button_tap
                .subscribe(move |target| cheer_requested.send(target.clone()))
                .store_in(cancel_bag);
        }
        {
            let card_flow_requested = self.card_flow_requested.clone();
            input
                .receive_card_button_tap
                .subscribe(move |card| card_flow_requested.send(card.clone()))
                .store_in(cancel_bag);
        }
        {
            let profile_requested = self.profile_requested.clone();
            input
                .profile_image_tap
                .subscribe(move |member_id| profile_requested.send(*member_id))
                .store_in(cancel_bag);
        }
        BriefingResultOutput {
            result: self.result.clone(),
            back_requested: self.back_requested.clone(),
            cheer_requested: self.cheer_requested.clone(),
            card_flow_requested: self.card_flow_requested.clone(),
            profile_requested: self.profile_requested.clone(),
            cheer_completed: self.cheer_completed.clone(),
        }
    }
}

// ─── Card scene ─────────────────────────────────────────────────────────

/// Input sources owned by the card scene view.
pub struct BriefingCardInput {
    /// The view finished loading.
    pub view_did_load: EventSource<()>,
    /// The close button.
    pub close_button_tap: EventSource<()>,
}

/// Output sources for the card scene.
pub struct BriefingCardOutput {
    /// The card to render.
    pub card: EventSource<BriefingCardModel>,
    /// The user is done with the card.
    pub finish_requested: EventSource<()>,
}

/// View model for the card scene.
pub struct BriefingCardViewModel {
    card_model: BriefingCardModel,
    card: EventSource<BriefingCardModel>,
    finish_requested: EventSource<()>,
}

impl BriefingCardViewModel {
    /// Create the view model for one card.
    pub fn new(scheduler: &MainScheduler, card_model: BriefingCardModel) -> Self {
        Self {
            card_model,
            card: EventSource::new(scheduler),
            finish_requested: EventSource::new(scheduler),
        }
    }

    /// Coordinator-facing: the user is done with the card.
    pub fn finish_requested(&self) -> EventSource<()> {
        self.finish_requested.clone()
    }
}

impl ViewModel for BriefingCardViewModel {
    type Input = BriefingCardInput;
    type Output = BriefingCardOutput;

    fn transform(&self, input: Self::Input, cancel_bag: &CancelBag) -> Self::Output {
        {
            let card = self.card.clone();
            let model = self.card_model.clone();
            input
                .view_did_load
                .subscribe(move |_| card.send(model.clone()))
                .store_in(cancel_bag);
        }
        {
            let finish_requested = self.finish_requested.clone();
            input
                .close_button_tap
                .subscribe(move |_| finish_requested.send(()))
                .store_in(cancel_bag);
        }
        BriefingCardOutput {
            card: self.card.clone(),
            finish_requested: self.finish_requested.clone(),
        }
    }
}
