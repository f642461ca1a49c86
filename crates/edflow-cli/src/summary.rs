use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use edflow_cli::types::RunResult;
use edflow_model::StageReport;

pub fn print_summary(result: &RunResult) {
    if result.dry_run {
        println!("Dry run: no files written");
    } else {
        println!("Output: {}", result.output_dir.display());
    }
    println!("Visits: {}  Events: {}", result.visits, result.events);
    print_stage_table(&result.stages);
    print_analysis_table(result);
}

fn print_stage_table(stages: &[StageReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Events In"),
        header_cell("Events Out"),
        header_cell("Visits Out"),
        header_cell("Dropped"),
        header_cell("Synthesized"),
        header_cell("Relabeled"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for stage in stages {
        let dropped = stage
            .dropped_events
            .iter()
            .chain(stage.dropped_visits.iter())
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect::<Vec<_>>();
        table.add_row(vec![
            stage_cell(stage),
            Cell::new(stage.events_in),
            Cell::new(stage.events_out),
            Cell::new(stage.visits_out),
            counts_cell(&dropped, Color::Yellow),
            counts_cell(&format_counts(&stage.synthesized), Color::Green),
            counts_cell(&format_counts(&stage.relabeled), Color::Cyan),
        ]);
    }
    println!("{table}");
}

fn print_analysis_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Analysis"),
        header_cell("Visits"),
        header_cell("Edges"),
        header_cell("Excluded Visits"),
        header_cell("Pruned Edges"),
        header_cell("Injected Edges"),
        header_cell("Ties"),
        header_cell("Dead Ends"),
        header_cell("Files"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 8, CellAlignment::Right);
    for analysis in &result.analyses {
        let summary = &analysis.summary;
        table.add_row(vec![
            Cell::new(&summary.analysis)
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.visits),
            Cell::new(summary.edges),
            count_cell(summary.excluded_visits, Color::Yellow),
            count_cell(summary.pruned_edges, Color::Yellow),
            count_cell(summary.injected_edges, Color::Green),
            count_cell(summary.ordering_ties, Color::Red),
            counts_cell(&summary.dead_ends, Color::Yellow),
            count_cell(analysis.outputs.len(), Color::Green),
        ]);
    }
    println!("{table}");
}

fn format_counts(counts: &BTreeMap<String, usize>) -> Vec<String> {
    counts
        .iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect()
}

fn stage_cell(stage: &StageReport) -> Cell {
    if stage.is_noop() {
        dim_cell(&stage.stage)
    } else {
        Cell::new(&stage.stage).add_attribute(Attribute::Bold)
    }
}

fn counts_cell(lines: &[String], color: Color) -> Cell {
    if lines.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(lines.join("\n")).fg(color)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
