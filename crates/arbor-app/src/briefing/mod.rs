//! The daily-briefing feature.

mod coordinators;
mod factory;
mod models;
mod use_case;
mod view_models;

pub use coordinators::{BriefingCardCoordinator, BriefingCoordinator, BriefingResultCoordinator};
pub use factory::BriefingFeatureBuildable;
pub use models::{BriefingCardModel, BriefingResultModel};
pub use use_case::{BriefingRepository, DailyBriefingUseCase};
pub use view_models::{
    BriefingCardInput, BriefingCardOutput, BriefingCardViewModel, BriefingMainInput,
    BriefingMainOutput, BriefingMainViewModel, BriefingResultInput, BriefingResultOutput,
    BriefingResultViewModel,
};
