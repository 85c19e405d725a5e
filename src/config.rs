use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::TocError;

/// Longest delay a browser `setTimeout` accepts (a signed 32-bit millisecond count).
pub const MAX_DELAY_MS: u64 = i32::MAX as u64;

/// CSS selectors the controller resolves on the host page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Selectors {
    pub container: String,
    pub toggle: String,
    pub close: String,
    pub panel: String,
    pub links: String,
    pub landmarks: String,
    pub progress_bar: String,
    pub header: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: ".floating-toc".to_string(),
            toggle: ".toc-toggle".to_string(),
            close: ".toc-close".to_string(),
            panel: ".toc-panel".to_string(),
            links: ".toc-link".to_string(),
            landmarks: "section[id], .timeline-item[id], .year-section[id]".to_string(),
            progress_bar: ".toc-progress-bar".to_string(),
            header: "nav".to_string(),
        }
    }
}

impl Selectors {
    fn all(&self) -> [(&'static str, &str); 8] {
        [
            ("container", self.container.as_str()),
            ("toggle", self.toggle.as_str()),
            ("close", self.close.as_str()),
            ("panel", self.panel.as_str()),
            ("links", self.links.as_str()),
            ("landmarks", self.landmarks.as_str()),
            ("progress_bar", self.progress_bar.as_str()),
            ("header", self.header.as_str()),
        ]
    }
}

/// Tunables for the floating TOC. Distances are in host layout units
/// (CSS pixels in a browser, rows and columns in a terminal).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TocConfig {
    pub selectors: Selectors,
    /// Header height used when the page has no header element.
    pub header_fallback: f64,
    /// Added to the header height to form the active-section threshold line.
    pub detection_padding: f64,
    /// Added to the header height when scrolling a target into view.
    pub navigation_padding: f64,
    /// Scrolling down past this offset hides the widget.
    pub hide_after: f64,
    /// Viewports at most this wide close the panel after a link click.
    pub narrow_viewport: f64,
    pub focus_delay_ms: u64,
    pub navigate_close_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub deep_link_delay_ms: u64,
    /// Pages (matched as a substring of the URL path) where auto-hide is off.
    pub pinned_pages: Vec<String>,
    pub open_label: String,
    pub close_label: String,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            header_fallback: 60.0,
            detection_padding: 30.0,
            navigation_padding: 40.0,
            hide_after: 300.0,
            narrow_viewport: 768.0,
            focus_delay_ms: 100,
            navigate_close_delay_ms: 300,
            settle_delay_ms: 100,
            deep_link_delay_ms: 500,
            pinned_pages: vec!["publications.html".to_string()],
            open_label: "Open table of contents".to_string(),
            close_label: "Close table of contents".to_string(),
        }
    }
}

impl TocConfig {
    /// Preset for a terminal page where one row is one layout unit.
    pub fn terminal() -> Self {
        Self {
            header_fallback: 1.0,
            detection_padding: 1.0,
            navigation_padding: 1.0,
            hide_after: 10.0,
            narrow_viewport: 100.0,
            ..Self::default()
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(Path::new(file_path))
            .with_context(|| format!("Failed to read TOC config {file_path}"))?;
        let config = Self::from_json(&content)?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str::<Self>(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOC config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(file_path: Option<&str>, fallback: Self) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load TOC config from {path}: {e}");
                fallback
            }),
            None => fallback,
        }
    }

    pub fn validate(&self) -> Result<(), TocError> {
        let distances = [
            ("header_fallback", self.header_fallback),
            ("detection_padding", self.detection_padding),
            ("navigation_padding", self.navigation_padding),
            ("hide_after", self.hide_after),
            ("narrow_viewport", self.narrow_viewport),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(TocError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let delays = [
            ("focus_delay_ms", self.focus_delay_ms),
            ("navigate_close_delay_ms", self.navigate_close_delay_ms),
            ("settle_delay_ms", self.settle_delay_ms),
            ("deep_link_delay_ms", self.deep_link_delay_ms),
        ];
        for (name, value) in delays {
            if value > MAX_DELAY_MS {
                return Err(TocError::InvalidConfig(format!(
                    "{name} must be at most {MAX_DELAY_MS} ms, got {value}"
                )));
            }
        }

        for (name, selector) in self.selectors.all() {
            if selector.trim().is_empty() {
                return Err(TocError::InvalidConfig(format!(
                    "selector {name} is empty"
                )));
            }
        }

        if self.open_label.is_empty() || self.close_label.is_empty() {
            return Err(TocError::InvalidConfig(
                "accessibility labels must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    pub fn navigate_close_delay(&self) -> Duration {
        Duration::from_millis(self.navigate_close_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn deep_link_delay(&self) -> Duration {
        Duration::from_millis(self.deep_link_delay_ms)
    }

    pub fn is_pinned_path(&self, path: &str) -> bool {
        self.pinned_pages
            .iter()
            .any(|page| !page.is_empty() && path.contains(page.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hide_after": 120, "pinned_pages": []}}"#).unwrap();

        let config = TocConfig::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.hide_after, 120.0);
        assert!(config.pinned_pages.is_empty());
        assert_eq!(config.header_fallback, 60.0);
        assert_eq!(config.selectors.container, ".floating-toc");
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let config = TocConfig::load_or_default(
            Some(file.path().to_str().unwrap()),
            TocConfig::terminal(),
        );
        assert_eq!(config, TocConfig::terminal());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = TocConfig::load_or_default(Some("/nonexistent/toc.json"), TocConfig::default());
        assert_eq!(config, TocConfig::default());
    }

    #[test]
    fn test_validate_rejects_negative_distance() {
        let config = TocConfig {
            navigation_padding: -1.0,
            ..TocConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TocError::InvalidConfig(msg)) if msg.contains("navigation_padding")
        ));
    }

    #[test]
    fn test_validate_rejects_empty_selector() {
        let mut config = TocConfig::default();
        config.selectors.toggle = "  ".to_string();
        assert!(config.validate().is_err());
        assert!(TocConfig::from_json(r#"{"selectors": {"toggle": ""}}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_delay_beyond_timer_range() {
        let config = TocConfig {
            deep_link_delay_ms: MAX_DELAY_MS + 1,
            ..TocConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TocError::InvalidConfig(msg)) if msg.contains("deep_link_delay_ms")
        ));
        assert!(TocConfig::from_json(r#"{"settle_delay_ms": 4294967296}"#).is_err());

        let longest = TocConfig {
            focus_delay_ms: MAX_DELAY_MS,
            ..TocConfig::default()
        };
        assert!(longest.validate().is_ok());
    }

    #[test]
    fn test_pinned_path() {
        let config = TocConfig::default();
        assert!(config.is_pinned_path("/site/publications.html"));
        assert!(!config.is_pinned_path("/site/history.html"));
    }
}
