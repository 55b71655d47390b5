//! The chart data model: species series, baseline, totals and axis domains.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    AgePoint, AggregateAgePoint, AxisDomains, ChartConfig, Record, SpeciesSeries, Totals, ViewMode,
};
use crate::model::filter::filter_records;

/// Plotting-ready structures derived once from the loaded records.
///
/// Everything except the `ratio` fields is fixed after [`ChartDataModel::ingest`].
/// Ratios (and the axis domains) are recomputed in place by
/// [`ChartDataModel::set_mode`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartDataModel {
    species: Vec<SpeciesSeries>,
    baseline: Vec<AggregateAgePoint>,
    totals: Totals,
    mode: Option<ViewMode>,
    domains: Option<AxisDomains>,
}

impl ChartDataModel {
    /// Filter, group, rank and aggregate raw records.
    ///
    /// Empty (or fully filtered) input yields an empty model, not an error.
    pub fn ingest(records: &[Record], config: &ChartConfig) -> Self {
        let filtered = filter_records(records, config);
        let mut species = group_by_species(&filtered);

        // `sort_by` is stable: equal totals keep first-appearance order.
        species.sort_by(|a, b| b.total_size.total_cmp(&a.total_size));
        species.truncate(config.top_n);

        let totals = compute_totals(&species);
        let baseline = totals
            .age_totals
            .iter()
            .map(|(&age, &size)| AggregateAgePoint { age, size, ratio: 0.0 })
            .collect();

        debug!(
            records = records.len(),
            filtered = filtered.len(),
            species = species.len(),
            total_size = totals.total_size,
            "chart model ingested"
        );

        Self {
            species,
            baseline,
            totals,
            mode: None,
            domains: None,
        }
    }

    /// Recompute every `ratio` for `mode` and return the matching axis domains.
    ///
    /// Returns `None` when there is nothing to plot; callers should skip the
    /// axis update in that case.
    pub fn set_mode(&mut self, mode: ViewMode) -> Option<AxisDomains> {
        let total = self.totals.total_size;

        for series in &mut self.species {
            let species_total = series.total_size;
            for point in &mut series.ages {
                let share = safe_div(point.size, species_total);
                point.ratio = match mode {
                    ViewMode::Absolute => share,
                    ViewMode::Relative => {
                        let age_size = self.totals.age_totals.get(&point.age).copied().unwrap_or(0.0);
                        share - safe_div(age_size, total)
                    }
                };
            }
        }

        for point in &mut self.baseline {
            point.ratio = match mode {
                ViewMode::Absolute => safe_div(point.size, total),
                ViewMode::Relative => 0.0,
            };
        }

        self.mode = Some(mode);
        self.domains = compute_domains(&self.species, mode);

        debug!(
            mode = mode.display_name(),
            age_totals = ?self.totals.age_totals,
            domains = ?self.domains,
            "ratios recomputed"
        );

        self.domains
    }

    /// Retained species, descending by total size.
    pub fn species(&self) -> &[SpeciesSeries] {
        &self.species
    }

    /// Population-wide series, ascending by age.
    pub fn baseline(&self) -> &[AggregateAgePoint] {
        &self.baseline
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Mode of the last `set_mode` call, if any.
    pub fn mode(&self) -> Option<ViewMode> {
        self.mode
    }

    /// Domains of the last `set_mode` call, if any.
    pub fn domains(&self) -> Option<AxisDomains> {
        self.domains
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Group by species in first-appearance order; duplicate ages are summed.
fn group_by_species(records: &[Record]) -> Vec<SpeciesSeries> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, BTreeMap<i64, f64>, f64)> = Vec::new();

    for r in records {
        let slot = *index.entry(r.species.as_str()).or_insert_with(|| {
            groups.push((r.species.clone(), BTreeMap::new(), 0.0));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        *group.1.entry(r.age).or_insert(0.0) += r.size;
        group.2 += r.size;
    }

    groups
        .into_iter()
        .map(|(species, ages, total_size)| SpeciesSeries {
            species,
            ages: ages
                .into_iter()
                .map(|(age, size)| AgePoint { age, size, ratio: 0.0 })
                .collect(),
            total_size,
        })
        .collect()
}

fn compute_totals(species: &[SpeciesSeries]) -> Totals {
    let mut age_totals = BTreeMap::new();
    for series in species {
        for point in &series.ages {
            *age_totals.entry(point.age).or_insert(0.0) += point.size;
        }
    }
    Totals {
        total_size: species.iter().map(|s| s.total_size).sum(),
        age_totals,
    }
}

fn compute_domains(species: &[SpeciesSeries], mode: ViewMode) -> Option<AxisDomains> {
    let mut age_min = i64::MAX;
    let mut age_max = i64::MIN;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for point in species.iter().flat_map(|s| s.ages.iter()) {
        age_min = age_min.min(point.age);
        age_max = age_max.max(point.age);
        y_min = y_min.min(point.ratio);
        y_max = y_max.max(point.ratio);
    }

    if age_min > age_max || !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }

    let y = match mode {
        ViewMode::Absolute => [y_min, y_max],
        ViewMode::Relative => {
            let m = y_min.abs().max(y_max.abs());
            [-m, m]
        }
    };

    Some(AxisDomains {
        x: [age_min as f64, age_max as f64],
        y,
    })
}

/// Zero-sized totals give a zero share instead of NaN.
fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Vec<Record> {
        vec![
            Record::new(2009, "BearAnimal", 5, 10.0),
            Record::new(2009, "BearAnimal", 6, 20.0),
            Record::new(2009, "WolfAnimal", 5, 5.0),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn worked_example_ingest() {
        let model = ChartDataModel::ingest(&example(), &ChartConfig::default());

        let names: Vec<&str> = model.species().iter().map(|s| s.species.as_str()).collect();
        assert_eq!(names, vec!["Bear", "Wolf"]);
        assert_eq!(model.species()[0].total_size, 30.0);
        assert_eq!(model.species()[1].total_size, 5.0);

        let bear_ages: Vec<(i64, f64)> = model.species()[0].ages.iter().map(|p| (p.age, p.size)).collect();
        assert_eq!(bear_ages, vec![(5, 10.0), (6, 20.0)]);

        assert_eq!(model.totals().total_size, 35.0);
        let age_totals: Vec<(i64, f64)> = model.totals().age_totals.iter().map(|(&a, &s)| (a, s)).collect();
        assert_eq!(age_totals, vec![(5, 15.0), (6, 20.0)]);

        let baseline: Vec<(i64, f64)> = model.baseline().iter().map(|p| (p.age, p.size)).collect();
        assert_eq!(baseline, vec![(5, 15.0), (6, 20.0)]);
        assert!(model.mode().is_none());
    }

    #[test]
    fn absolute_mode_ratios_and_domains() {
        let mut model = ChartDataModel::ingest(&example(), &ChartConfig::default());
        let domains = model.set_mode(ViewMode::Absolute).unwrap();

        let bear = &model.species()[0];
        assert!(approx(bear.ages[0].ratio, 10.0 / 30.0));
        assert!(approx(bear.ages[1].ratio, 20.0 / 30.0));
        assert!(approx(model.species()[1].ages[0].ratio, 1.0));
        assert!(approx(model.baseline()[0].ratio, 15.0 / 35.0));
        assert!(approx(model.baseline()[1].ratio, 20.0 / 35.0));

        assert_eq!(domains.x, [5.0, 6.0]);
        assert!(approx(domains.y[0], 10.0 / 30.0));
        assert!(approx(domains.y[1], 1.0));
        assert_eq!(model.domains(), Some(domains));
        assert_eq!(model.mode(), Some(ViewMode::Absolute));
    }

    #[test]
    fn relative_mode_is_centered() {
        let mut model = ChartDataModel::ingest(&example(), &ChartConfig::default());
        let domains = model.set_mode(ViewMode::Relative).unwrap();

        let bear = &model.species()[0];
        assert!(approx(bear.ages[0].ratio, 10.0 / 30.0 - 15.0 / 35.0));
        assert!(approx(bear.ages[1].ratio, 20.0 / 30.0 - 20.0 / 35.0));
        assert!(approx(model.species()[1].ages[0].ratio, 1.0 - 15.0 / 35.0));
        assert!(model.baseline().iter().all(|p| p.ratio == 0.0));

        assert_eq!(domains.y[1], -domains.y[0]);
        assert!(approx(domains.y[1], 1.0 - 15.0 / 35.0));
    }

    #[test]
    fn toggling_back_restores_absolute_ratios() {
        let mut model = ChartDataModel::ingest(&example(), &ChartConfig::default());
        let first = model.set_mode(ViewMode::Absolute);
        let snapshot = model.species().to_vec();
        model.set_mode(ViewMode::Relative);
        let again = model.set_mode(ViewMode::Absolute);
        assert_eq!(first, again);
        assert_eq!(model.species(), snapshot.as_slice());
    }

    #[test]
    fn top_n_keeps_largest_and_drops_from_totals() {
        let config = ChartConfig {
            top_n: 2,
            ..ChartConfig::default()
        };
        let rows = vec![
            Record::new(2009, "Small", 7, 1.0),
            Record::new(2009, "Big", 5, 100.0),
            Record::new(2009, "Mid", 6, 50.0),
        ];
        let model = ChartDataModel::ingest(&rows, &config);
        let names: Vec<&str> = model.species().iter().map(|s| s.species.as_str()).collect();
        assert_eq!(names, vec!["Big", "Mid"]);
        assert_eq!(model.totals().total_size, 150.0);
        assert!(!model.totals().age_totals.contains_key(&7));
        assert_eq!(model.baseline().len(), 2);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let rows = vec![
            Record::new(2009, "Cat", 3, 4.0),
            Record::new(2009, "Ant", 3, 4.0),
            Record::new(2009, "Bee", 3, 4.0),
        ];
        let model = ChartDataModel::ingest(&rows, &ChartConfig::default());
        let names: Vec<&str> = model.species().iter().map(|s| s.species.as_str()).collect();
        assert_eq!(names, vec!["Cat", "Ant", "Bee"]);
    }

    #[test]
    fn ages_sorted_and_duplicates_merged() {
        let rows = vec![
            Record::new(2009, "Elk", 9, 1.0),
            Record::new(2009, "Elk", 2, 2.0),
            Record::new(2009, "Elk", 9, 3.0),
        ];
        let model = ChartDataModel::ingest(&rows, &ChartConfig::default());
        let ages: Vec<(i64, f64)> = model.species()[0].ages.iter().map(|p| (p.age, p.size)).collect();
        assert_eq!(ages, vec![(2, 2.0), (9, 4.0)]);
        assert_eq!(model.species()[0].total_size, 6.0);
    }

    #[test]
    fn empty_input_has_no_domains() {
        let mut model = ChartDataModel::ingest(&[], &ChartConfig::default());
        assert!(model.is_empty());
        assert!(model.baseline().is_empty());
        assert_eq!(model.totals().total_size, 0.0);
        assert_eq!(model.set_mode(ViewMode::Absolute), None);
        assert_eq!(model.set_mode(ViewMode::Relative), None);
    }

    #[test]
    fn zero_sized_species_do_not_produce_nan() {
        let rows = vec![Record::new(2009, "Ghost", 4, 0.0)];
        let mut model = ChartDataModel::ingest(&rows, &ChartConfig::default());
        let domains = model.set_mode(ViewMode::Absolute).unwrap();
        assert_eq!(domains.y, [0.0, 0.0]);
        assert_eq!(model.baseline()[0].ratio, 0.0);
    }
}
