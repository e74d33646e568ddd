//! Group-by building blocks shared by the analyses.
//!
//! Groups are kept in `BTreeMap`s so anything that is not explicitly ranked
//! comes out in key order. Ranking uses a stable sort, so equal totals keep
//! their key order as well.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::dataset::FundingEvent;

/// A grouping key with its aggregated amount
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KeyedAmount {
    pub key: String,
    pub amount: f64,
}

/// Sum of `amount` per key
pub fn group_sum<'a, K, I, F>(events: I, key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = &'a FundingEvent>,
    F: Fn(&'a FundingEvent) -> K,
{
    let mut groups = BTreeMap::new();
    for event in events {
        *groups.entry(key(event)).or_insert(0.0) += event.amount;
    }
    groups
}

/// Number of events per key
pub fn group_count<'a, K, I, F>(events: I, key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    I: IntoIterator<Item = &'a FundingEvent>,
    F: Fn(&'a FundingEvent) -> K,
{
    let mut groups = BTreeMap::new();
    for event in events {
        *groups.entry(key(event)).or_insert(0) += 1;
    }
    groups
}

/// Largest single `amount` per key
pub fn group_max<'a, K, I, F>(events: I, key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = &'a FundingEvent>,
    F: Fn(&'a FundingEvent) -> K,
{
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for event in events {
        groups
            .entry(key(event))
            .and_modify(|max| *max = max.max(event.amount))
            .or_insert(event.amount);
    }
    groups
}

/// Remove groups whose total is exactly zero
pub fn drop_zero<K: Ord>(groups: &mut BTreeMap<K, f64>) {
    groups.retain(|_, amount| *amount != 0.0);
}

/// Fold each alias group into its canonical name.
///
/// When the canonical name has no group of its own the alias total is
/// carried over under the canonical name.
pub fn merge_aliases(groups: &mut BTreeMap<String, f64>, aliases: &BTreeMap<String, String>) {
    for (alias, canonical) in aliases {
        if alias == canonical {
            continue;
        }
        if let Some(amount) = groups.remove(alias) {
            *groups.entry(canonical.clone()).or_insert(0.0) += amount;
        }
    }
}

/// Groups ordered by amount, largest first
pub fn sort_desc<K>(groups: BTreeMap<K, f64>) -> Vec<(K, f64)> {
    let mut rows: Vec<(K, f64)> = groups.into_iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows
}

/// First `n` rows
pub fn top_n<T>(mut rows: Vec<T>, n: usize) -> Vec<T> {
    rows.truncate(n);
    rows
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Round every row's amount in place
pub fn round_amounts(rows: &mut [KeyedAmount], places: i32) {
    for row in rows.iter_mut() {
        row.amount = round_to(row.amount, places);
    }
}

/// Key-ordered groups as display rows
pub fn keyed(groups: BTreeMap<String, f64>) -> Vec<KeyedAmount> {
    groups
        .into_iter()
        .map(|(key, amount)| KeyedAmount { key, amount })
        .collect()
}

/// The `n` largest groups as display rows
pub fn ranked(groups: BTreeMap<String, f64>, n: usize) -> Vec<KeyedAmount> {
    top_n(sort_desc(groups), n)
        .into_iter()
        .map(|(key, amount)| KeyedAmount { key, amount })
        .collect()
}

/// For each outer key keep the inner key with the largest amount.
///
/// Ties go to the inner key that sorts first.
pub fn best_per_group<G, K>(groups: BTreeMap<(G, K), f64>) -> Vec<(G, K, f64)>
where
    G: Ord + Clone,
    K: Ord,
{
    let mut best: BTreeMap<G, (K, f64)> = BTreeMap::new();
    for ((outer, inner), amount) in groups {
        match best.get(&outer) {
            Some((_, current)) if *current >= amount => {}
            _ => {
                best.insert(outer, (inner, amount));
            }
        }
    }
    best.into_iter()
        .map(|(outer, (inner, amount))| (outer, inner, amount))
        .collect()
}

/// Year x month table of funding totals
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct YearMonthPivot {
    /// Row labels, ascending
    pub years: Vec<i32>,
    /// Column labels, always 1 through 12
    pub months: Vec<u32>,
    /// `cells[row][month - 1]`, `None` where no event fell in that month
    pub cells: Vec<Vec<Option<f64>>>,
}

impl YearMonthPivot {
    /// Largest cell value, used for colour scaling
    pub fn max_value(&self) -> Option<f64> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .copied()
            .fold(None, |max, v| Some(max.map_or(v, |m: f64| m.max(v))))
    }
}

/// Pivot summed amounts by year (rows) and month (columns)
pub fn pivot_year_month<'a, I>(events: I) -> YearMonthPivot
where
    I: IntoIterator<Item = &'a FundingEvent>,
{
    let sums = group_sum(events, |e| (e.year, e.month));
    let years: Vec<i32> = {
        let mut years: Vec<i32> = sums.keys().map(|(year, _)| *year).collect();
        years.dedup();
        years
    };
    let months: Vec<u32> = (1..=12).collect();

    let cells = years
        .iter()
        .map(|year| {
            months
                .iter()
                .map(|month| sums.get(&(*year, *month)).copied())
                .collect()
        })
        .collect();

    YearMonthPivot {
        years,
        months,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::tests::sample_dataset;

    #[test]
    fn test_group_sum_and_count_by_city() {
        let dataset = sample_dataset();
        let sums = group_sum(dataset.events(), |e| e.city.clone());
        assert_eq!(sums["Gurgaon"], 466.0);
        assert_eq!(sums["Noida"], 9000.0);

        let counts = group_count(dataset.events(), |e| e.city.as_str());
        assert_eq!(counts["Bangalore"], 5);
        assert_eq!(counts["Bengaluru"], 2);
    }

    #[test]
    fn test_group_max() {
        let dataset = sample_dataset();
        let max = group_max(dataset.events(), |e| e.startup.as_str());
        assert_eq!(max["Ola"], 2000.0);
    }

    #[test]
    fn test_merge_aliases_folds_into_canonical() {
        let mut groups = BTreeMap::from([
            ("Bangalore".to_string(), 100.0),
            ("Bengaluru".to_string(), 50.0),
            ("Pune".to_string(), 10.0),
        ]);
        let aliases = BTreeMap::from([("Bengaluru".to_string(), "Bangalore".to_string())]);
        merge_aliases(&mut groups, &aliases);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Bangalore"], 150.0);
    }

    #[test]
    fn test_merge_aliases_without_canonical_renames() {
        let mut groups = BTreeMap::from([("Softbank".to_string(), 30.0)]);
        let aliases = BTreeMap::from([("Softbank".to_string(), "SoftBank Group".to_string())]);
        merge_aliases(&mut groups, &aliases);
        assert_eq!(groups.get("SoftBank Group"), Some(&30.0));
        assert!(!groups.contains_key("Softbank"));
    }

    #[test]
    fn test_ranked_is_stable_on_ties() {
        let groups = BTreeMap::from([
            ("b".to_string(), 5.0),
            ("a".to_string(), 5.0),
            ("c".to_string(), 9.0),
            ("d".to_string(), 1.0),
        ]);
        let rows = ranked(groups, 3);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_drop_zero_and_round() {
        let mut groups = BTreeMap::from([("x", 0.0), ("y", 1.0)]);
        drop_zero(&mut groups);
        assert_eq!(groups.len(), 1);
        assert_eq!(round_to(2.34567, 2), 2.35);

        let mut rows = vec![KeyedAmount { key: "x".to_string(), amount: 1.006 }];
        round_amounts(&mut rows, 2);
        assert_eq!(rows[0].amount, 1.01);
    }

    #[test]
    fn test_best_per_group() {
        let groups = BTreeMap::from([
            ((2019, "Ola"), 2300.0),
            ((2019, "Swiggy"), 700.0),
            ((2020, "Acme"), 10.0),
            ((2020, "Beta"), 10.0),
        ]);
        let best = best_per_group(groups);
        assert_eq!(best, vec![(2019, "Ola", 2300.0), (2020, "Acme", 10.0)]);
    }

    #[test]
    fn test_pivot_year_month() {
        let dataset = sample_dataset();
        let pivot = pivot_year_month(dataset.events());
        assert_eq!(pivot.years, vec![2017, 2018, 2019, 2020]);
        assert_eq!(pivot.months.len(), 12);
        // rows follow `years`, columns are month - 1
        assert_eq!(pivot.cells[3][0], Some(1703.0));
        assert_eq!(pivot.cells[2][6], Some(1000.0));
        assert_eq!(pivot.cells[2][0], None);
        assert_eq!(pivot.max_value(), Some(9000.0));
    }
}
