//! Daily-briefing flow parameter models.
//!
//! Immutable values passed parent → child at flow construction; a new
//! instance supersedes the old one on every flow start.

use serde::{Deserialize, Serialize};

/// The member's briefing for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingResultModel {
    /// The member the briefing is for.
    pub member_id: u64,
    /// Display name.
    pub member_name: String,
    /// The briefing message body.
    pub message: String,
    /// Backend-formatted date the briefing applies to.
    pub date: String,
}

/// A collectible card attached to a briefing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingCardModel {
    /// Card identifier.
    pub card_id: u64,
    /// Card name.
    pub name: String,
    /// Artwork location.
    pub image_url: String,
    /// Card flavor text.
    pub description: String,
}
