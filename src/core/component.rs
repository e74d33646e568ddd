use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

/// The three views the dashboard offers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnalysisKind {
    /// Whole-dataset metrics and rankings
    Overall,
    /// One startup's funding history
    Startup,
    /// One investor's portfolio
    Investor,
}

impl Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisKind::Overall => write!(f, "Overall Analysis"),
            AnalysisKind::Startup => write!(f, "Startup"),
            AnalysisKind::Investor => write!(f, "Investor"),
        }
    }
}

/// Core trait for the aggregation modules behind each dashboard view
pub trait AnalysisComponent: Send + Sync + Debug {
    /// Returns the component identifier
    fn id(&self) -> &str;

    /// Returns which dashboard view this component backs
    fn kind(&self) -> AnalysisKind;

    /// Get component-specific information
    fn get_info(&self) -> serde_json::Value;
}
