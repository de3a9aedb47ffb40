use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use survey_model::{Correlation, QuestionLabels, RankingPolicy};
use survey_prep::PartitionSummary;

use crate::types::{CorrelateResult, PrepareResult, TargetSummary};

pub fn print_correlations(result: &CorrelateResult) {
    let labels = &result.labels;
    let vector = &result.vector;
    println!("Input: {}", result.input.display());
    println!("{}", target_heading(vector.target(), labels));
    println!("Ranking: {}", ranking_name(vector.policy()));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rank"),
        header_cell("Column"),
        header_cell("Question"),
        header_cell("r"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (rank, entry) in vector.entries().iter().take(result.shown).enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            column_cell(&entry.column),
            question_cell(labels, &entry.column),
            coefficient_cell(entry),
        ]);
    }
    println!("{table}");
    if result.shown < vector.len() {
        println!("({} of {} columns shown)", result.shown, vector.len());
    }
}

pub fn print_preparation(result: &PrepareResult) {
    let labels = &result.labels;
    println!("Input: {}", result.input.display());
    match &result.output_dir {
        Some(dir) => println!("Output: {}", dir.display()),
        None => println!("Output: (dry run)"),
    }
    let report = &result.clean_report;
    let dropped =
        report.dropped_columns.len() + report.text_columns.len() + report.empty_columns.len();
    if dropped > 0 {
        println!("Dropped columns: {dropped}");
    }
    for outcome in &result.targets {
        println!();
        println!("{}", target_heading(&outcome.target, labels));
        match &outcome.result {
            Ok(summary) => print_target(summary, labels),
            Err(error) => eprintln!("error: {error}"),
        }
    }
}

fn print_target(summary: &TargetSummary, labels: &QuestionLabels) {
    let partitions = &summary.partitions;
    println!(
        "Excluded rows: {} (sentinel or missing target)",
        partitions.excluded_rows
    );

    let mut features = Table::new();
    features.set_header(vec![
        header_cell("#"),
        header_cell("Feature"),
        header_cell("Question"),
    ]);
    apply_table_style(&mut features);
    align_column(&mut features, 0, CellAlignment::Right);
    for (index, column) in partitions.selection.features().iter().enumerate() {
        features.add_row(vec![
            Cell::new(index + 1),
            column_cell(column),
            question_cell(labels, column),
        ]);
    }
    println!("{features}");

    let total = partitions.total_rows();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Partition"),
        header_cell("Rows"),
        header_cell("Share"),
        header_cell("Classes"),
        header_cell("File"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for partition in &summary.summaries {
        let share = if total == 0 {
            0.0
        } else {
            partition.rows as f64 / total as f64
        };
        let file = summary.outputs.as_ref().map(|paths| match partition.name {
            "train" => &paths.train,
            "validation" => &paths.validation,
            _ => &paths.test,
        });
        table.add_row(vec![
            Cell::new(partition.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(partition.rows),
            Cell::new(format!("{:.1}%", share * 100.0)),
            Cell::new(class_breakdown(partition)),
            match file {
                Some(path) => Cell::new(path.display()),
                None => dim_cell("-"),
            },
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
        dim_cell("100.0%"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
}

/// `1: 40 (44.4%), 2: 50 (55.6%)`
fn class_breakdown(summary: &PartitionSummary) -> String {
    summary
        .classes
        .iter()
        .map(|(class, count)| {
            format!(
                "{class}: {count} ({:.1}%)",
                summary.proportion(*class) * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn column_cell(column: &str) -> Cell {
    Cell::new(column)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn question_cell(labels: &QuestionLabels, column: &str) -> Cell {
    match labels.get(column) {
        Some(text) => Cell::new(text),
        None => dim_cell("-"),
    }
}

/// `Target: SOC5B (Felt depressed)`, or just the code when unlabelled.
fn target_heading(target: &str, labels: &QuestionLabels) -> String {
    match labels.get(target) {
        Some(text) => format!("Target: {target} ({text})"),
        None => format!("Target: {target}"),
    }
}

fn ranking_name(policy: RankingPolicy) -> &'static str {
    match policy {
        RankingPolicy::Signed => "signed",
        RankingPolicy::Absolute => "absolute",
    }
}

fn coefficient_text(entry: &Correlation) -> String {
    if entry.is_defined() {
        format!("{:+.4}", entry.coefficient)
    } else {
        "n/a".to_string()
    }
}

fn coefficient_cell(entry: &Correlation) -> Cell {
    let text = coefficient_text(entry);
    if !entry.is_defined() {
        return dim_cell(text);
    }
    let cell = Cell::new(text);
    if entry.coefficient < 0.0 {
        cell.fg(Color::Red)
    } else {
        cell.fg(Color::Green)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_shows_label_only_when_configured() {
        let labels = QuestionLabels::new().with_label("SOC5B", "Felt depressed");
        assert_eq!(target_heading("SOC5B", &labels), "Target: SOC5B (Felt depressed)");
        assert_eq!(target_heading("RARE", &labels), "Target: RARE");
        assert_eq!(target_heading("RARE", &QuestionLabels::new()), "Target: RARE");
    }

    #[test]
    fn undefined_coefficients_print_as_not_available() {
        assert_eq!(coefficient_text(&Correlation::new("FLAT", f64::NAN)), "n/a");
        assert_eq!(coefficient_text(&Correlation::new("Q01", -0.25)), "-0.2500");
        assert_eq!(ranking_name(RankingPolicy::Absolute), "absolute");
    }
}
