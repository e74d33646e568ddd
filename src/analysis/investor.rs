use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::json;

use crate::config::AnalysisConfig;
use crate::core::aggregate::{group_sum, keyed, ranked, KeyedAmount};
use crate::core::component::{AnalysisComponent, AnalysisKind};
use crate::core::dataset::{split_investors, Dataset, FundingEvent};
use crate::core::error::{DashboardError, Result};

/// A row of the recent investments table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvestmentRow {
    pub date: NaiveDate,
    pub startup: String,
    pub vertical: String,
    pub city: String,
    pub investors: String,
    pub round: String,
    pub amount: f64,
}

impl From<&FundingEvent> for InvestmentRow {
    fn from(event: &FundingEvent) -> Self {
        Self {
            date: event.date,
            startup: event.startup.clone(),
            vertical: event.vertical.clone(),
            city: event.city.clone(),
            investors: event.investors.clone(),
            round: event.round.clone(),
            amount: event.amount,
        }
    }
}

/// Amount invested in a calendar year
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct YearAmount {
    pub year: i32,
    pub amount: f64,
}

/// Everything the investor page shows
#[derive(Debug, Clone, Serialize)]
pub struct InvestorProfile {
    pub name: String,
    pub deals: usize,
    pub recent_investments: Vec<InvestmentRow>,
    pub biggest_investments: Vec<KeyedAmount>,
    pub sectors: Vec<KeyedAmount>,
    pub subsectors: Vec<KeyedAmount>,
    pub cities: Vec<KeyedAmount>,
    pub rounds: Vec<KeyedAmount>,
    pub yoy: Vec<YearAmount>,
    pub similar_investors: Vec<String>,
}

/// Per-investor aggregations.
///
/// An investor's rounds are the events whose investors field contains the
/// name as a substring, so "Sequoia Capital" also picks up
/// "Sequoia Capital India".
#[derive(Debug)]
pub struct InvestorAnalysis {
    dataset: Arc<Dataset>,
    config: AnalysisConfig,
}

impl InvestorAnalysis {
    pub fn new(dataset: Arc<Dataset>, config: AnalysisConfig) -> Self {
        Self { dataset, config }
    }

    fn matching<'a>(&'a self, investor: &'a str) -> impl Iterator<Item = &'a FundingEvent> + 'a {
        let investor = investor.trim();
        self.dataset
            .events()
            .iter()
            .filter(move |e| !investor.is_empty() && e.mentions_investor(investor))
    }

    /// Sorted distinct investor names
    pub fn investor_list(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .dataset
            .events()
            .iter()
            .flat_map(|e| e.investor_names())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Number of rounds the investor took part in
    pub fn deal_count(&self, investor: &str) -> usize {
        self.matching(investor).count()
    }

    /// Latest rounds, newest first
    pub fn recent_investments(&self, investor: &str) -> Vec<InvestmentRow> {
        let mut events: Vec<&FundingEvent> = self.matching(investor).collect();
        events.sort_by(|a, b| b.date.cmp(&a.date));
        events
            .into_iter()
            .take(self.config.recent_limit)
            .map(InvestmentRow::from)
            .collect()
    }

    /// Startups that received the most from this investor
    pub fn biggest_investments(&self, investor: &str) -> Vec<KeyedAmount> {
        ranked(
            group_sum(self.matching(investor), |e| e.startup.clone()),
            self.config.biggest_limit,
        )
    }

    pub fn invested_sectors(&self, investor: &str) -> Vec<KeyedAmount> {
        keyed(group_sum(self.matching(investor), |e| e.vertical.clone()))
    }

    pub fn invested_subsectors(&self, investor: &str) -> Vec<KeyedAmount> {
        keyed(group_sum(self.matching(investor), |e| e.subvertical.clone()))
    }

    pub fn invested_cities(&self, investor: &str) -> Vec<KeyedAmount> {
        keyed(group_sum(self.matching(investor), |e| e.city.clone()))
    }

    pub fn invested_types(&self, investor: &str) -> Vec<KeyedAmount> {
        keyed(group_sum(self.matching(investor), |e| e.round.clone()))
    }

    pub fn yoy_investment(&self, investor: &str) -> Vec<YearAmount> {
        group_sum(self.matching(investor), |e| e.year)
            .into_iter()
            .map(|(year, amount)| YearAmount { year, amount })
            .collect()
    }

    /// Co-investors from the vertical of the investor's first round.
    ///
    /// Rounds that list only this investor or hide their investors are
    /// skipped. Names come back sorted and without the investor itself.
    pub fn similar_investor_candidates(&self, investor: &str) -> Vec<String> {
        let investor = investor.trim();
        let vertical = match self.matching(investor).next() {
            Some(event) => event.vertical.as_str(),
            None => return Vec::new(),
        };
        let marker = self.config.undisclosed_marker.to_lowercase();

        let names: BTreeSet<&str> = self
            .dataset
            .events()
            .iter()
            .filter(|e| e.vertical == vertical)
            .filter(|e| marker.is_empty() || !e.investors.to_lowercase().contains(&marker))
            .filter(|e| e.investors != investor)
            .flat_map(|e| split_investors(&e.investors))
            .filter(|name| *name != investor)
            .collect();

        debug!(
            "{} candidate similar investors for '{}' in '{}'",
            names.len(),
            investor,
            vertical
        );
        names.into_iter().map(str::to_string).collect()
    }

    /// Random pick of similar investors; all of them when there are few
    pub fn similar_investors<R: Rng + ?Sized>(&self, investor: &str, rng: &mut R) -> Vec<String> {
        self.similar_investor_candidates(investor)
            .choose_multiple(rng, self.config.similar_limit)
            .cloned()
            .collect()
    }

    pub fn profile<R: Rng + ?Sized>(&self, investor: &str, rng: &mut R) -> Result<InvestorProfile> {
        let deals = self.deal_count(investor);
        if deals == 0 {
            return Err(DashboardError::NotFound(format!("investor '{}'", investor)));
        }

        Ok(InvestorProfile {
            name: investor.trim().to_string(),
            deals,
            recent_investments: self.recent_investments(investor),
            biggest_investments: self.biggest_investments(investor),
            sectors: self.invested_sectors(investor),
            subsectors: self.invested_subsectors(investor),
            cities: self.invested_cities(investor),
            rounds: self.invested_types(investor),
            yoy: self.yoy_investment(investor),
            similar_investors: self.similar_investors(investor, rng),
        })
    }
}

impl AnalysisComponent for InvestorAnalysis {
    fn id(&self) -> &str {
        "investor"
    }

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Investor
    }

    fn get_info(&self) -> serde_json::Value {
        json!({
            "investors": self.investor_list().len(),
            "recent_limit": self.config.recent_limit,
            "biggest_limit": self.config.biggest_limit,
            "similar_limit": self.config.similar_limit,
        })
    }
}
