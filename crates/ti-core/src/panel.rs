//! Panel identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of every generated panel container id
pub const PANEL_PREFIX: &str = "viz";

/// Index-based identifier of a dashboard panel.
///
/// Panels are numbered in configuration order; the addressable container
/// name is `viz<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelId(pub usize);

impl PanelId {
    /// Position of the panel in the configured panel list
    pub fn index(self) -> usize {
        self.0
    }

    /// Container name of the panel (`viz<N>`)
    pub fn container_id(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PANEL_PREFIX, self.0)
    }
}

impl FromStr for PanelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(PANEL_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .map(PanelId)
            .ok_or_else(|| format!("'{}' is not a panel container id", s))
    }
}
