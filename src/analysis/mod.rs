//! Aggregation modules behind the three dashboard views
//!
//! Each analysis holds a handle to the shared read-only dataset and runs its
//! group-by pipelines on demand.

pub mod investor;
pub mod overall;
pub mod startup;

pub use investor::InvestorAnalysis;
pub use overall::OverallAnalysis;
pub use startup::StartupAnalysis;

/// Pad or cut a list to exactly `slots` entries; missing slots are empty.
pub fn display_slots(items: &[String], slots: usize) -> Vec<String> {
    (0..slots)
        .map(|i| items.get(i).cloned().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_slots_pads_with_empty() {
        let items = vec!["Shuttl".to_string(), "Rapido".to_string()];
        assert_eq!(display_slots(&items, 4), vec!["Shuttl", "Rapido", "", ""]);
        assert_eq!(display_slots(&items, 1), vec!["Shuttl"]);
        assert_eq!(display_slots(&[], 2), vec!["", ""]);
    }
}
