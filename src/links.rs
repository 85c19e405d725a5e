use crate::error::{Result, TocError};

/// A TOC entry pointing at an in-page landmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocLink {
    pub href: String,
    /// Landmark id the link navigates to; `None` for links without a fragment.
    pub target: Option<String>,
}

impl TocLink {
    pub fn from_href(href: &str) -> Self {
        match parse_fragment(href) {
            Ok(target) => Self {
                href: href.to_string(),
                target: Some(target),
            },
            Err(e) => {
                log::warn!("Inert TOC link: {e}");
                Self {
                    href: href.to_string(),
                    target: None,
                }
            }
        }
    }

    pub fn points_at(&self, landmark_id: &str) -> bool {
        self.target.as_deref() == Some(landmark_id)
    }
}

/// Extract the fragment of an in-page href, e.g. `"#awards"` -> `"awards"`.
/// Links to other documents (`"/other.html#awards"`) are rejected.
pub fn parse_fragment(href: &str) -> Result<String> {
    match href.strip_prefix('#') {
        Some(fragment) if !fragment.is_empty() => Ok(fragment.to_string()),
        _ => Err(TocError::MissingFragment {
            href: href.to_string(),
        }),
    }
}

/// Index of the link that points at `landmark_id`. The first link wins when
/// several point at the same landmark, which keeps at most one link active.
pub fn link_for_landmark(links: &[TocLink], landmark_id: &str) -> Option<usize> {
    links.iter().position(|link| link.points_at(landmark_id))
}
