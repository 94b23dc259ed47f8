//! Overlay (bottom sheet) presentation chrome.

/// Layout configuration for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Minimum content height in points.
    pub min_height: u32,
}

impl OverlayConfig {
    /// Configuration for a message-template sheet.
    pub fn message_template(min_height: u32) -> Self {
        Self { min_height }
    }
}

/// Owns the presentation chrome for one overlay.
///
/// Platform shells decorate from this; the core only records the
/// configuration alongside the presented content.
#[derive(Debug, Clone)]
pub struct OverlayManager {
    config: OverlayConfig,
}

impl OverlayManager {
    /// Create a manager with the given configuration.
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// The overlay's layout configuration.
    pub fn config(&self) -> OverlayConfig {
        self.config
    }
}
