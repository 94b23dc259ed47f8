//! Briefing scene factory boundary.

use arbor_flow::Scene;

use super::models::{BriefingCardModel, BriefingResultModel};
use super::view_models::{BriefingCardViewModel, BriefingMainViewModel, BriefingResultViewModel};

/// Builds briefing scenes. One call per scene instantiation, no hidden
/// global state; the platform shell supplies the concrete views.
pub trait BriefingFeatureBuildable: Send + Sync {
    /// Build the entry scene.
    fn make_briefing_main_scene(&self, date_line: &str) -> Scene<BriefingMainViewModel>;

    /// Build the result scene for a briefing.
    fn make_briefing_result_scene(
        &self,
        model: &BriefingResultModel,
    ) -> Scene<BriefingResultViewModel>;

    /// Build the card scene for a card.
    fn make_briefing_card_scene(&self, model: &BriefingCardModel) -> Scene<BriefingCardViewModel>;
}
