use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use epi_core::RunSummary;
use epi_model::{CohortFlow, ModelResult};

/// Significance level used only to highlight p-values.
const HIGHLIGHT_ALPHA: f64 = 0.05;

pub fn print_summary(summary: &RunSummary) {
    println!("Seed: {}", summary.seed);
    println!("Model summary: {}", summary.artifacts.model_summary.display());
    println!("Cohort flow: {}", summary.artifacts.cohort_flow.display());
    println!("Data profile: {}", summary.artifacts.data_profile.display());
    println!("Run metadata: {}", summary.artifacts.run_metadata.display());
    println!("{}", results_table(&summary.results));
    println!("{}", cohort_flow_table(&summary.cohort_flow));
}

fn results_table(results: &[ModelResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Model"),
        header_cell("Exposure"),
        header_cell("Term"),
        header_cell("Coef"),
        header_cell("95% CI"),
        header_cell("P-value"),
        header_cell("Effect"),
    ]);
    apply_table_style(&mut table);
    for index in [3, 4, 5, 6] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    if results.is_empty() {
        table.add_row(vec![dim_cell("(no results)")]);
    }
    for result in results {
        table.add_row(vec![
            Cell::new(result.model_type.as_str()),
            Cell::new(&result.exposure).fg(Color::Blue),
            Cell::new(&result.term),
            Cell::new(format!("{:.4}", result.coef)),
            Cell::new(format!("{:.4} to {:.4}", result.lower_ci, result.upper_ci)),
            p_value_cell(result.p_value),
            Cell::new(format!("{:.4}", result.effect)).add_attribute(Attribute::Bold),
        ]);
    }
    table
}

fn cohort_flow_table(flow: &CohortFlow) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (step, count) in flow.steps() {
        table.add_row(vec![Cell::new(step), Cell::new(count)]);
    }
    table
}

fn p_value_cell(p_value: f64) -> Cell {
    let text = format_p_value(p_value);
    if p_value < HIGHLIGHT_ALPHA {
        Cell::new(text).fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new(text)
    }
}

fn format_p_value(p_value: f64) -> String {
    if p_value < 1e-4 {
        format!("{p_value:.2e}")
    } else {
        format!("{p_value:.4}")
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use epi_model::ModelType;

    #[test]
    fn tiny_p_values_use_scientific_notation() {
        assert_eq!(format_p_value(0.0312), "0.0312");
        assert_eq!(format_p_value(0.00001234), "1.23e-5");
    }

    #[test]
    fn results_table_has_one_row_per_result() {
        let results = vec![
            ModelResult::new(ModelType::Logistic, "x", "x", 0.6, (0.4, 0.8), 0.0001),
            ModelResult::new(ModelType::Logistic, "x", "age", 0.02, (-0.01, 0.05), 0.2),
        ];
        let table = results_table(&results);
        assert_eq!(table.row_count(), 2);
        let text = table.to_string();
        assert!(text.contains("logistic"));
        assert!(text.contains("1.8221"));
    }

    #[test]
    fn cohort_flow_table_lists_steps_in_order() {
        let text = cohort_flow_table(&CohortFlow::new(500, 490)).to_string();
        let input = text.find("input_rows").unwrap();
        let analysis = text.find("analysis_rows").unwrap();
        let excluded = text.find("excluded_rows").unwrap();
        assert!(input < analysis && analysis < excluded);
    }
}
