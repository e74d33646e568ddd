use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AnalysisConfig;
use crate::core::aggregate::{
    self, best_per_group, drop_zero, group_count, group_max, group_sum, merge_aliases, ranked,
    round_amounts, KeyedAmount, YearMonthPivot,
};
use crate::core::component::{AnalysisComponent, AnalysisKind};
use crate::core::dataset::{Dataset, FundingEvent};

/// Headline numbers at the top of the overall page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverallSummary {
    /// Total funding, rounded to whole crores
    pub total_invested: f64,
    /// Largest single round
    pub max_amount_infused: f64,
    /// Mean total funding per startup
    pub avg_ticket_size: f64,
    /// Distinct startups in the dataset
    pub total_funded_startups: usize,
}

/// One month of a month-over-month series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    /// `MM-YYYY`
    pub label: String,
    pub value: f64,
}

/// The most funded startup of a year
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct YearlyLeader {
    pub year: i32,
    pub startup: String,
    pub amount: f64,
}

/// Which month-over-month series to show
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MomMetric {
    /// Total funding per month
    #[default]
    Amount,
    /// Funding rounds per month
    Count,
}

/// Whole-dataset aggregations
#[derive(Debug)]
pub struct OverallAnalysis {
    dataset: Arc<Dataset>,
    config: AnalysisConfig,
}

impl OverallAnalysis {
    pub fn new(dataset: Arc<Dataset>, config: AnalysisConfig) -> Self {
        Self { dataset, config }
    }

    /// Rounds that carry a startup name; unnamed rounds only count toward totals
    fn named_events(&self) -> impl Iterator<Item = &FundingEvent> {
        self.dataset.events().iter().filter(|e| !e.startup.is_empty())
    }

    pub fn total_invested_amount(&self) -> f64 {
        self.dataset.events().iter().map(|e| e.amount).sum::<f64>().round()
    }

    /// Largest amount any startup received in a single round
    pub fn max_amount_infused(&self) -> f64 {
        aggregate::sort_desc(group_max(self.named_events(), |e| e.startup.as_str()))
            .first()
            .map(|(_, amount)| *amount)
            .unwrap_or(0.0)
    }

    /// Mean of per-startup total funding
    pub fn avg_ticket_size(&self) -> f64 {
        let per_startup = group_sum(self.named_events(), |e| e.startup.as_str());
        if per_startup.is_empty() {
            return 0.0;
        }
        per_startup.values().sum::<f64>() / per_startup.len() as f64
    }

    pub fn total_funded_startups(&self) -> usize {
        group_count(self.named_events(), |e| e.startup.as_str()).len()
    }

    pub fn summary(&self) -> OverallSummary {
        OverallSummary {
            total_invested: self.total_invested_amount(),
            max_amount_infused: self.max_amount_infused(),
            avg_ticket_size: self.avg_ticket_size(),
            total_funded_startups: self.total_funded_startups(),
        }
    }

    /// Total funding per month, oldest first
    pub fn total_funding_mom(&self) -> Vec<MonthlyPoint> {
        group_sum(self.dataset.events(), |e| (e.year, e.month))
            .into_iter()
            .map(|((year, month), value)| monthly_point(year, month, value))
            .collect()
    }

    /// Funding rounds per month, oldest first
    pub fn total_funded_startups_mom(&self) -> Vec<MonthlyPoint> {
        group_count(self.dataset.events(), |e| (e.year, e.month))
            .into_iter()
            .map(|((year, month), count)| monthly_point(year, month, count as f64))
            .collect()
    }

    pub fn mom(&self, metric: MomMetric) -> Vec<MonthlyPoint> {
        match metric {
            MomMetric::Amount => self.total_funding_mom(),
            MomMetric::Count => self.total_funded_startups_mom(),
        }
    }

    pub fn most_funded_sectors(&self) -> Vec<KeyedAmount> {
        let mut sectors = group_sum(self.dataset.events(), |e| e.vertical.clone());
        drop_zero(&mut sectors);
        let mut rows = ranked(sectors, self.config.top_n);
        round_amounts(&mut rows, 2);
        rows
    }

    pub fn most_funded_types(&self) -> Vec<KeyedAmount> {
        let mut rounds = group_sum(self.dataset.events(), |e| e.round.clone());
        drop_zero(&mut rounds);
        ranked(rounds, self.config.top_n)
    }

    /// Top cities, with alternate spellings folded together
    pub fn most_funded_cities(&self) -> Vec<KeyedAmount> {
        let mut cities = group_sum(self.dataset.events(), |e| e.city.clone());
        drop_zero(&mut cities);
        merge_aliases(&mut cities, &self.config.city_aliases);
        let mut rows = ranked(cities, self.config.top_n);
        round_amounts(&mut rows, 2);
        rows
    }

    pub fn most_funded_startups_yoy(&self) -> Vec<YearlyLeader> {
        let per_year = group_sum(self.named_events(), |e| (e.year, e.startup.clone()));
        best_per_group(per_year)
            .into_iter()
            .map(|(year, startup, amount)| YearlyLeader {
                year,
                startup,
                amount,
            })
            .collect()
    }

    /// Top investors by the total of rounds they took part in.
    ///
    /// Every investor on a round is credited with the full round amount.
    pub fn top_investors(&self) -> Vec<KeyedAmount> {
        let mut investors = std::collections::BTreeMap::new();
        for event in self.dataset.events() {
            for name in event.investor_names() {
                *investors.entry(name.to_string()).or_insert(0.0) += event.amount;
            }
        }
        merge_aliases(&mut investors, &self.config.investor_aliases);
        ranked(investors, self.config.top_n)
    }

    pub fn funding_year_month(&self) -> YearMonthPivot {
        aggregate::pivot_year_month(self.dataset.events())
    }
}

fn monthly_point(year: i32, month: u32, value: f64) -> MonthlyPoint {
    MonthlyPoint {
        year,
        month,
        label: format!("{:02}-{}", month, year),
        value,
    }
}

impl AnalysisComponent for OverallAnalysis {
    fn id(&self) -> &str {
        "overall"
    }

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Overall
    }

    fn get_info(&self) -> serde_json::Value {
        json!({
            "funding_events": self.dataset.len(),
            "top_n": self.config.top_n,
            "city_aliases": self.config.city_aliases,
            "investor_aliases": self.config.investor_aliases,
        })
    }
}
