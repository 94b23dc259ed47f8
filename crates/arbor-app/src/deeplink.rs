//! Deep links into the community site.
//!
//! A member profile opens as `<base>/members/<id>` inside an embedded
//! web view pushed onto the current navigation stack. Everything beyond
//! building the URL and the scene is out of scope.

use arbor_core::precondition_failure;
use arbor_flow::SceneView;
use url::Url;

/// Build the profile URL for a community member.
pub fn member_profile_url(base: &Url, member_id: u64) -> Url {
    let mut url = base.clone();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments
                .pop_if_empty()
                .extend(["members", member_id.to_string().as_str()]);
        }
        Err(()) => {
            precondition_failure("community base URL cannot be a base");
        }
    }
    url
}

/// An embedded web view scene.
#[derive(Debug, Clone)]
pub struct EmbeddedWebScene {
    /// Presentation handle.
    pub view: SceneView,
    /// The page to load.
    pub url: Url,
}

impl EmbeddedWebScene {
    /// Create a web scene starting at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            view: SceneView::new("embedded-web"),
            url,
        }
    }
}
