use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::error::{DashboardError, Result};

/// Date layouts seen in the published funding datasets
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

/// One funding round as it appears in the dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundingEvent {
    /// Date the round was announced
    pub date: NaiveDate,
    /// Startup that raised the round
    pub startup: String,
    /// Industry sector ("vertical")
    pub vertical: String,
    /// Sub-sector ("subvertical")
    pub subvertical: String,
    /// Headquarters city
    pub city: String,
    /// Comma-delimited investor names, free text
    pub investors: String,
    /// Round type, e.g. "Seed Funding" or "Series B"
    pub round: String,
    /// Amount in crore rupees
    pub amount: f64,
    /// Calendar year of `date`
    pub year: i32,
    /// Calendar month of `date` (1-12)
    pub month: u32,
}

impl FundingEvent {
    /// Build an event, deriving year and month from the date
    pub fn new(
        date: NaiveDate,
        startup: &str,
        vertical: &str,
        subvertical: &str,
        city: &str,
        investors: &str,
        round: &str,
        amount: f64,
    ) -> Self {
        Self {
            date,
            startup: startup.to_string(),
            vertical: vertical.to_string(),
            subvertical: subvertical.to_string(),
            city: city.to_string(),
            investors: investors.to_string(),
            round: round.to_string(),
            amount,
            year: date.year(),
            month: date.month(),
        }
    }

    /// Individual investor names listed on this round
    pub fn investor_names(&self) -> impl Iterator<Item = &str> {
        split_investors(&self.investors)
    }

    /// Substring match against the raw investors field
    pub fn mentions_investor(&self, investor: &str) -> bool {
        self.investors.contains(investor)
    }
}

/// Split an investors field on commas, trimming and dropping empty names
pub fn split_investors(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|name| !name.is_empty())
}

/// Parse a dataset date, ignoring any time component after the date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..raw.len().min(10)).unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(head, format).ok())
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    if cleaned.trim().is_empty() {
        return Some(0.0);
    }
    cleaned.trim().parse::<f64>().ok().filter(|amount| amount.is_finite())
}

/// Row as it comes off the CSV reader
#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    #[serde(alias = "name")]
    startup: String,
    #[serde(default)]
    vertical: String,
    #[serde(default)]
    subvertical: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    investors: String,
    #[serde(default, alias = "type")]
    round: String,
    #[serde(default)]
    amount: String,
}

impl RawRecord {
    fn into_event(self, row: usize) -> Result<FundingEvent> {
        let date = parse_date(&self.date).ok_or_else(|| DashboardError::ParseError {
            row,
            message: format!("invalid date '{}'", self.date),
        })?;
        let amount = parse_amount(&self.amount).ok_or_else(|| DashboardError::ParseError {
            row,
            message: format!("invalid amount '{}'", self.amount),
        })?;

        Ok(FundingEvent::new(
            date,
            &self.startup,
            &self.vertical,
            &self.subvertical,
            &self.city,
            &self.investors,
            &self.round,
            amount,
        ))
    }
}

/// Summary of the loaded dataset for status pages
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub source: Option<String>,
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// The read-only funding table shared by every analysis
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    events: Vec<FundingEvent>,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Load the dataset from a CSV file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            DashboardError::LoadError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let mut dataset = Self::from_reader(file)?;
        dataset.source = Some(path.to_path_buf());

        match dataset.date_range() {
            Some((first, last)) => info!(
                "Loaded {} funding events from {} ({} to {})",
                dataset.len(),
                path.display(),
                first,
                last
            ),
            None => warn!("Dataset {} contains no funding events", path.display()),
        }

        Ok(dataset)
    }

    /// Parse CSV data with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut events = Vec::new();
        for (index, record) in rdr.deserialize::<RawRecord>().enumerate() {
            // 1-based, counting the header line
            let row = index + 2;
            events.push(record?.into_event(row)?);
        }

        Ok(Self::from_events(events))
    }

    /// Wrap already-built events
    pub fn from_events(events: Vec<FundingEvent>) -> Self {
        Self {
            events,
            source: None,
        }
    }

    pub fn events(&self) -> &[FundingEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Earliest and latest event dates
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.events.iter().map(|e| e.date).min()?;
        let last = self.events.iter().map(|e| e.date).max()?;
        Some((first, last))
    }

    pub fn summary(&self) -> DatasetSummary {
        let range = self.date_range();
        DatasetSummary {
            source: self.source.as_ref().map(|p| p.display().to_string()),
            rows: self.len(),
            first_date: range.map(|(first, _)| first),
            last_date: range.map(|(_, last)| last),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Small dataset shared by the analysis and handler tests
    pub(crate) const SAMPLE_CSV: &str = "\
date,startup,vertical,subvertical,city,investors,round,amount
2020-01-09,BYJU'S,EdTech,E-learning,Bengaluru,Tiger Global Management,Private Equity Round,1500.5
2020-01-13,Shuttl,Transportation,App based shuttle service,Gurgaon,Susquehanna Growth Equity,Series C,66
2020-01-09,Mamaearth,E-commerce,Retailer of baby and toddler products,Bangalore,Sequoia Capital India,Series B,136.5
2019-12-05,Ola,Transportation,Ride hailing,Bangalore,\"SoftBank Group, Tiger Global Management\",Series J,2000
2019-07-20,Swiggy,Food Delivery,Online food ordering,Bangalore,\"Softbank, Naspers\",Series I,700
2019-07-02,Ola,Transportation,Ride hailing,Bangalore,Softbank,Series I,300
2018-03-15,Zomato,Food Delivery,Restaurant discovery,Gurgaon,\"Sequoia Capital India, Info Edge\",Series E,400
2018-03-28,Rapido,Transportation,Bike taxi,Bengaluru,Undisclosed Investors,Seed Funding,0
2018-11-02,Unacademy,EdTech,Online courses,Bangalore,\"Sequoia Capital India, Blume Ventures\",Series D,250
2017-05-18,Paytm,FinTech,Digital payments,Noida,SoftBank Group,Private Equity Round,9000
";

    pub(crate) fn sample_dataset() -> Dataset {
        Dataset::from_reader(SAMPLE_CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 9).unwrap();
        assert_eq!(parse_date("2020-01-09"), Some(expected));
        assert_eq!(parse_date("09/01/2020"), Some(expected));
        assert_eq!(parse_date("09.01.2020"), Some(expected));
        assert_eq!(parse_date("2020-01-09 00:00:00"), Some(expected));
        assert_eq!(parse_date("January 2020"), None);
    }

    #[test]
    fn test_load_sample_derives_year_and_month() {
        let dataset = sample_dataset();
        assert_eq!(dataset.len(), 10);

        let byjus = &dataset.events()[0];
        assert_eq!(byjus.startup, "BYJU'S");
        assert_eq!(byjus.year, 2020);
        assert_eq!(byjus.month, 1);
        assert_eq!(byjus.amount, 1500.5);
    }

    #[test]
    fn test_investor_names_are_split_and_trimmed() {
        let dataset = sample_dataset();
        let ola = &dataset.events()[3];
        let names: Vec<&str> = ola.investor_names().collect();
        assert_eq!(names, vec!["SoftBank Group", "Tiger Global Management"]);
        assert!(ola.mentions_investor("Tiger Global"));
        assert!(!ola.mentions_investor("tiger global"));
    }

    #[test]
    fn test_blank_amount_is_zero_and_name_alias_columns() {
        let csv = "date,name,vertical,subvertical,city,investors,type,amount\n\
                   2016-04-01,Acme,Retail,,Pune,Angel One,Seed,\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let event = &dataset.events()[0];
        assert_eq!(event.startup, "Acme");
        assert_eq!(event.round, "Seed");
        assert_eq!(event.amount, 0.0);
        assert_eq!(event.subvertical, "");
    }

    // Test that a row without a startup name still loads
    #[test]
    fn test_blank_startup_row_is_kept() {
        let csv = "date,startup,vertical,subvertical,city,investors,round,amount\n\
                   2016-04-01,Acme,Retail,,Pune,Angel One,Seed,10\n\
                   2016-05-01,,Retail,,Pune,Angel One,Seed,90\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.events()[1].startup, "");
        assert_eq!(dataset.events()[1].amount, 90.0);
    }

    #[test]
    fn test_bad_date_reports_row() {
        let csv = "date,startup,vertical,subvertical,city,investors,round,amount\n\
                   2016-04-01,Acme,Retail,,Pune,Angel One,Seed,1\n\
                   not-a-date,Beta,Retail,,Pune,Angel One,Seed,1\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            DashboardError::ParseError { row, .. } => assert_eq!(row, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let csv = "date,startup,vertical,subvertical,city,investors,round,amount\n\
                   2016-04-01,Acme,Retail,,Pune,Angel One,Seed,lots\n";
        assert!(matches!(
            Dataset::from_reader(csv.as_bytes()),
            Err(DashboardError::ParseError { row: 2, .. })
        ));
    }

    #[test]
    fn test_load_from_file_records_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();

        let dataset = Dataset::load(file.path()).unwrap();
        let summary = dataset.summary();
        assert_eq!(summary.rows, 10);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2017, 5, 18));
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2020, 1, 13));
        assert!(summary.source.is_some());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = Dataset::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::LoadError(_)));
    }
}
