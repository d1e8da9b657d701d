use std::collections::HashMap;
use std::iter;

use clap::ValueEnum;
use itertools::Itertools;
use tabled::builder::Builder;
use tabled::settings::themes::Colorization;
use tabled::settings::{Color, Style};

use crate::measurements::{IoMeasurement, ToJson};
use crate::source_sink::IoType;

#[derive(ValueEnum, Default, Clone, Debug)]
pub enum DisplayFormat {
    #[default]
    Table,
    GhJson,
}

/// Renders one row per benchmark name and one column per io type, coloring
/// each cell against the first io type, which serves as the baseline.
pub fn render_table(
    all_measurements: Vec<IoMeasurement>,
    io_types: &[IoType],
) -> anyhow::Result<()> {
    let mut measurements: HashMap<IoType, Vec<IoMeasurement>> =
        HashMap::with_capacity(io_types.len());
    for m in all_measurements {
        measurements.entry(m.io_type).or_default().push(m);
    }

    let baseline_type = io_types[0];
    let baseline = measurements[&baseline_type].clone();

    let mut table_builder = Builder::default();
    let mut colors = vec![];

    table_builder.push_record(
        iter::once("Benchmark".to_owned())
            .chain(io_types.iter().map(|io_type| io_type.to_string()))
            .collect_vec(),
    );

    for (idx, baseline_measure) in baseline.iter().enumerate() {
        let baseline_nanos = baseline_measure.time.as_nanos();
        let mut row = vec![baseline_measure.name.clone()];
        for (col_idx, io_type) in io_types.iter().enumerate() {
            let measurement = &measurements[io_type][idx];
            let nanos = measurement.time.as_nanos();

            if *io_type != baseline_type {
                colors.push(Colorization::exact(
                    vec![color(baseline_nanos, nanos)],
                    (idx + 1, col_idx + 1),
                ));
            }

            let ratio = nanos as f64 / baseline_nanos as f64;
            row.push(format!("{:.2?} ({ratio:.2})", measurement.time));
        }
        table_builder.push_record(row);
    }

    let mut table = table_builder.build();
    table.with(Style::modern());

    for color in colors.into_iter() {
        table.with(color);
    }

    println!("{table}");

    Ok(())
}

pub fn print_measurements_json<T: ToJson>(all_measurements: Vec<T>) -> anyhow::Result<()> {
    for measurement in all_measurements {
        // This has to be `println!` and go to stdout, because we capture it from there.
        println!("{}", serde_json::to_string(&measurement.to_json())?)
    }

    Ok(())
}

fn color(baseline: u128, value: u128) -> Color {
    if value > (baseline + baseline / 2) {
        Color::BG_RED | Color::FG_BLACK
    } else if value > (baseline + baseline / 10) {
        Color::BG_YELLOW | Color::FG_BLACK
    } else {
        Color::BG_BRIGHT_GREEN | Color::FG_BLACK
    }
}
