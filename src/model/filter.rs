//! Label normalization and row filtering.
//!
//! Runs before grouping, so everything downstream only ever sees rows from the
//! configured year and age window, with cleaned species labels.

use crate::domain::{ChartConfig, Record};

/// Remove the first occurrence of `strip` from a raw species label.
pub fn normalize_species(raw: &str, strip: &str) -> String {
    if strip.is_empty() {
        return raw.to_string();
    }
    raw.replacen(strip, "", 1)
}

/// Whether an already-normalized record survives the filter.
pub fn keep(record: &Record, config: &ChartConfig) -> bool {
    if record.year != config.year {
        return false;
    }
    if record.age < config.min_age || record.age > config.max_age {
        return false;
    }
    let exclude = config.exclude_substring.to_lowercase();
    exclude.is_empty() || !record.species.to_lowercase().contains(&exclude)
}

/// Normalize labels and keep only qualifying rows, preserving input order.
pub fn filter_records(records: &[Record], config: &ChartConfig) -> Vec<Record> {
    records
        .iter()
        .map(|r| Record {
            species: normalize_species(&r.species, &config.strip_substring),
            ..r.clone()
        })
        .filter(|r| keep(r, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_first_occurrence_only() {
        assert_eq!(normalize_species("BearAnimal", "Animal"), "Bear");
        assert_eq!(normalize_species("AnimalAnimal", "Animal"), "Animal");
        assert_eq!(normalize_species("Wolf", "Animal"), "Wolf");
        assert_eq!(normalize_species("Wolf", ""), "Wolf");
    }

    #[test]
    fn filter_window_and_exclusion() {
        let config = ChartConfig::default();
        let rows = vec![
            Record::new(2009, "BearAnimal", 5, 10.0),
            Record::new(2008, "Bear", 5, 10.0),
            Record::new(2009, "Bear", 0, 10.0),
            Record::new(2009, "Bear", 40, 10.0),
            Record::new(2009, "Bear", 41, 10.0),
            Record::new(2009, "OtherAnimal", 5, 10.0),
            Record::new(2009, "Brothers", 5, 10.0),
        ];
        let out = filter_records(&rows, &config);
        let kept: Vec<(&str, i64)> = out.iter().map(|r| (r.species.as_str(), r.age)).collect();
        assert_eq!(kept, vec![("Bear", 5), ("Bear", 40)]);
    }

    #[test]
    fn exclusion_is_case_insensitive() {
        let config = ChartConfig {
            exclude_substring: "OTHER".to_string(),
            ..ChartConfig::default()
        };
        assert!(!keep(&Record::new(2009, "misc other", 3, 1.0), &config));
        assert!(keep(&Record::new(2009, "Deer", 3, 1.0), &config));
    }
}
