//! Formatted terminal output: dataset summary, species table, age table.

use crate::domain::{ChartConfig, fmt_percent, fmt_size};
use crate::io::ingest::IngestedData;
use crate::model::ChartDataModel;

/// Format the run summary (ingest stats + filters + domains).
pub fn format_summary(ingest: &IngestedData, model: &ChartDataModel, config: &ChartConfig) -> String {
    let mut out = String::new();

    out.push_str("=== ages - species size by age ===\n");
    out.push_str(&format!(
        "Rows: read={} | used={} | rejected={}\n",
        ingest.rows_read,
        ingest.rows_used(),
        ingest.row_errors.len(),
    ));
    out.push_str(&format!(
        "Filter: year={} | age=[{}, {}] | exclude=\"{}\" | strip=\"{}\" | top={}\n",
        config.year,
        config.min_age,
        config.max_age,
        config.exclude_substring,
        config.strip_substring,
        config.top_n,
    ));
    out.push_str(&format!(
        "Species: n={} | total size={}\n",
        model.species().len(),
        fmt_size(model.totals().total_size),
    ));

    match (model.mode(), model.domains()) {
        (Some(mode), Some(d)) => out.push_str(&format!(
            "Mode: {} | age=[{:.0}, {:.0}] | ratio=[{}, {}]\n",
            mode.display_name(),
            d.x[0],
            d.x[1],
            fmt_percent(d.y[0]),
            fmt_percent(d.y[1]),
        )),
        _ => out.push_str("Mode: - (no data to plot)\n"),
    }

    out.push('\n');
    out.push_str(&format_species_table(model));
    out.push('\n');
    out.push_str(&format_age_table(model));

    out
}

/// One row per retained species: label, age span, peak share.
pub fn format_species_table(model: &ChartDataModel) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<4} {:<24} {:>10} {:>9} {:>8}\n", "rank", "species", "total", "ages", "peak").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<24} {:-<10} {:-<9} {:-<8}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for (idx, s) in model.species().iter().enumerate() {
        let span = match (s.ages.first(), s.ages.last()) {
            (Some(a), Some(b)) => format!("{}-{}", a.age, b.age),
            _ => "-".to_string(),
        };
        let peak = s
            .ages
            .iter()
            .map(|p| p.ratio)
            .fold(f64::NEG_INFINITY, f64::max);
        let peak = if peak.is_finite() { fmt_percent(peak) } else { "-".to_string() };

        out.push_str(
            format!(
                "{:<4} {:<24} {:>10} {:>9} {:>8}\n",
                idx + 1,
                truncate(&s.species, 24),
                fmt_size(s.total_size),
                span,
                peak,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// The baseline: summed size and ratio per age.
pub fn format_age_table(model: &ChartDataModel) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>4} {:>10} {:>8}\n", "age", "size", "ratio").trim_end());
    out.push('\n');
    out.push_str(format!("{:->4} {:->10} {:->8}\n", "", "", "").trim_end());
    out.push('\n');

    for p in model.baseline() {
        out.push_str(&format!(
            "{:>4} {:>10} {:>8}\n",
            p.age,
            fmt_size(p.size),
            fmt_percent(p.ratio)
        ));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, ViewMode};

    fn model() -> ChartDataModel {
        let rows = vec![
            Record::new(2009, "Bear", 5, 10.0),
            Record::new(2009, "Bear", 6, 20.0),
            Record::new(2009, "Wolf", 5, 5.0),
        ];
        ChartDataModel::ingest(&rows, &ChartConfig::default())
    }

    #[test]
    fn species_table_rows() {
        let mut model = model();
        model.set_mode(ViewMode::Absolute);
        let table = format_species_table(&model);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("1    Bear"));
        assert!(lines[2].ends_with("5-6      67%"));
        assert!(lines[3].ends_with("100%"));
    }

    #[test]
    fn summary_mentions_counts_and_domains() {
        let mut model = model();
        model.set_mode(ViewMode::Relative);
        let ingest = IngestedData {
            records: Vec::new(),
            row_errors: Vec::new(),
            rows_read: 3,
        };
        let txt = format_summary(&ingest, &model, &ChartConfig::default());
        assert!(txt.contains("Rows: read=3 | used=0 | rejected=0"));
        assert!(txt.contains("Species: n=2 | total size=35"));
        assert!(txt.contains("Mode: relative | age=[5, 6] | ratio=[-57%, 57%]"));
    }

    #[test]
    fn summary_without_mode() {
        let model = ChartDataModel::ingest(&[], &ChartConfig::default());
        let txt = format_summary(&IngestedData::default(), &model, &ChartConfig::default());
        assert!(txt.contains("Mode: - (no data to plot)"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
