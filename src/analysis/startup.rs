use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::config::AnalysisConfig;
use crate::core::component::{AnalysisComponent, AnalysisKind};
use crate::core::dataset::{Dataset, FundingEvent};
use crate::core::error::{DashboardError, Result};

/// One round raised by a startup
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FundingRound {
    pub date: NaiveDate,
    pub round: String,
    pub investors: String,
    pub amount: f64,
}

/// Everything the startup page shows
#[derive(Debug, Clone, Serialize)]
pub struct StartupProfile {
    pub name: String,
    /// Total raised across all rounds
    pub funding: f64,
    pub sector: String,
    pub subsector: String,
    pub location: String,
    pub stage: String,
    pub investors: String,
    pub investment_date: NaiveDate,
    pub rounds: Vec<FundingRound>,
    pub similar_startups: Vec<String>,
}

/// Per-startup lookups.
///
/// Descriptive fields (sector, city, stage...) come from the startup's first
/// round in dataset order.
#[derive(Debug)]
pub struct StartupAnalysis {
    dataset: Arc<Dataset>,
    config: AnalysisConfig,
}

impl StartupAnalysis {
    pub fn new(dataset: Arc<Dataset>, config: AnalysisConfig) -> Self {
        Self { dataset, config }
    }

    fn rounds_of<'a>(&'a self, startup: &'a str) -> impl Iterator<Item = &'a FundingEvent> + 'a {
        self.dataset
            .events()
            .iter()
            .filter(move |e| !startup.is_empty() && e.startup == startup)
    }

    fn first_event(&self, startup: &str) -> Option<&FundingEvent> {
        self.dataset
            .events()
            .iter()
            .find(|e| !startup.is_empty() && e.startup == startup)
    }

    /// Sorted distinct startup names
    pub fn list_of_startups(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .dataset
            .events()
            .iter()
            .map(|e| e.startup.as_str())
            .filter(|name| !name.is_empty())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    pub fn sector(&self, startup: &str) -> Option<&str> {
        self.first_event(startup).map(|e| e.vertical.as_str())
    }

    pub fn subsector(&self, startup: &str) -> Option<&str> {
        self.first_event(startup).map(|e| e.subvertical.as_str())
    }

    pub fn location(&self, startup: &str) -> Option<&str> {
        self.first_event(startup).map(|e| e.city.as_str())
    }

    pub fn stage(&self, startup: &str) -> Option<&str> {
        self.first_event(startup).map(|e| e.round.as_str())
    }

    pub fn investors(&self, startup: &str) -> Option<&str> {
        self.first_event(startup).map(|e| e.investors.as_str())
    }

    pub fn investment_date(&self, startup: &str) -> Option<NaiveDate> {
        self.first_event(startup).map(|e| e.date)
    }

    /// Total raised; `None` for an unknown startup
    pub fn funding(&self, startup: &str) -> Option<f64> {
        self.first_event(startup)?;
        Some(self.rounds_of(startup).map(|e| e.amount).sum())
    }

    /// All rounds, newest first
    pub fn funding_rounds(&self, startup: &str) -> Vec<FundingRound> {
        let mut rounds: Vec<FundingRound> = self
            .rounds_of(startup)
            .map(|e| FundingRound {
                date: e.date,
                round: e.round.clone(),
                investors: e.investors.clone(),
                amount: e.amount,
            })
            .collect();
        rounds.sort_by(|a, b| b.date.cmp(&a.date));
        rounds
    }

    /// Other startups in the same vertical, in dataset order
    pub fn similar_startups(&self, startup: &str) -> Vec<String> {
        let vertical = match self.sector(startup) {
            Some(vertical) => vertical,
            None => return Vec::new(),
        };

        let mut seen = BTreeSet::new();
        self.dataset
            .events()
            .iter()
            .filter(|e| e.vertical == vertical && e.startup != startup && !e.startup.is_empty())
            .filter(|e| seen.insert(e.startup.as_str()))
            .map(|e| e.startup.clone())
            .collect()
    }

    pub fn profile(&self, startup: &str) -> Result<StartupProfile> {
        let first = self
            .first_event(startup)
            .ok_or_else(|| DashboardError::NotFound(format!("startup '{}'", startup)))?;

        let mut similar = self.similar_startups(startup);
        similar.truncate(self.config.similar_limit);

        Ok(StartupProfile {
            name: first.startup.clone(),
            funding: self.funding(startup).unwrap_or(0.0),
            sector: first.vertical.clone(),
            subsector: first.subvertical.clone(),
            location: first.city.clone(),
            stage: first.round.clone(),
            investors: first.investors.clone(),
            investment_date: first.date,
            rounds: self.funding_rounds(startup),
            similar_startups: similar,
        })
    }
}

impl AnalysisComponent for StartupAnalysis {
    fn id(&self) -> &str {
        "startup"
    }

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Startup
    }

    fn get_info(&self) -> serde_json::Value {
        json!({
            "startups": self.list_of_startups().len(),
            "similar_limit": self.config.similar_limit,
        })
    }
}
