use std::hint::black_box;
use std::io::{self, Read, Write};

use bench_io::bench_run::run_with_setup;
use bench_io::cache::try_drop_l3_cache;
use bench_io::display::{DisplayFormat, print_measurements_json, render_table};
use bench_io::measurements::IoMeasurement;
use bench_io::segments::segments_in_chunk;
use bench_io::source_sink::{IoType, SourceSinkPair};
use bench_io::{default_env_filter, feature_flagged_allocator, setup_logger};
use clap::Parser;
use indicatif::ProgressBar;
use rand::{Rng, SeedableRng as _};
use tracing::info;

feature_flagged_allocator!();

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "10")]
    iterations: usize,
    /// Payload size in bytes written through each sink.
    #[arg(short, long, default_value = "67108864")]
    payload_size: usize,
    #[arg(long, value_delimiter = ',', value_enum, default_values_t = vec![
        IoType::HostBuffer,
        IoType::FilePath,
        IoType::DeviceBuffer,
        IoType::Void,
    ])]
    io_types: Vec<IoType>,
    /// Number of chunks for the segmented read pass.
    #[arg(long, default_value = "8")]
    chunks: usize,
    /// Number of file segments the payload is treated as.
    #[arg(long, default_value = "64")]
    segments: usize,
    #[arg(short, long)]
    verbose: bool,
    #[arg(short, long, default_value_t, value_enum)]
    display_format: DisplayFormat,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logger(default_env_filter(args.verbose));

    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let payload: Vec<u8> = (0..args.payload_size).map(|_| rng.random()).collect();
    info!(
        "benchmarking {} byte payloads over {:?}",
        payload.len(),
        args.io_types
    );

    let progress = ProgressBar::new(args.io_types.len() as u64);
    let mut measurements = Vec::new();

    for &io_type in &args.io_types {
        let mut pair = SourceSinkPair::new(io_type)?;

        measurements.push(IoMeasurement {
            name: "write".to_string(),
            io_type,
            bytes: payload.len() as u64,
            time: run_with_setup(
                args.iterations,
                || try_drop_l3_cache().unwrap(),
                |()| {
                    let mut sink = pair.make_sink().unwrap();
                    sink.write_all(&payload).unwrap();
                    sink.flush().unwrap();
                },
            ),
        });

        // One final write session so every read below sees identical bytes.
        let mut sink = pair.make_sink()?;
        sink.write_all(&payload)?;
        sink.flush()?;
        drop(sink);

        measurements.push(IoMeasurement {
            name: "read-full".to_string(),
            io_type,
            bytes: payload.len() as u64,
            time: run_with_setup(
                args.iterations,
                || try_drop_l3_cache().unwrap(),
                |()| {
                    black_box(pair.make_source().unwrap().read_all().unwrap().len());
                },
            ),
        });

        measurements.push(IoMeasurement {
            name: "read-chunked".to_string(),
            io_type,
            bytes: payload.len() as u64,
            time: run_with_setup(
                args.iterations,
                || try_drop_l3_cache().unwrap(),
                |()| {
                    for chunk in 0..args.chunks {
                        read_chunk(&mut pair, payload.len(), args.segments, args.chunks, chunk)
                            .unwrap();
                    }
                },
            ),
        });

        progress.inc(1);
    }

    match args.display_format {
        DisplayFormat::Table => render_table(measurements, &args.io_types)?,
        DisplayFormat::GhJson => print_measurements_json(measurements)?,
    }

    progress.finish();
    Ok(())
}

/// Streams the byte span covered by one chunk's segments out of the source,
/// the way a segmented reader would restrict an iteration to its chunk.
fn read_chunk(
    pair: &mut SourceSinkPair,
    payload_len: usize,
    num_segments: usize,
    num_chunks: usize,
    chunk: usize,
) -> io::Result<u64> {
    let segment_range = segments_in_chunk(num_segments, num_chunks, chunk);
    let segment_size = payload_len.div_ceil(num_segments.max(1));
    let start = (segment_range.start * segment_size).min(payload_len);
    let end = (segment_range.end * segment_size).min(payload_len);

    let mut reader = pair.make_source()?.into_read()?;
    io::copy(&mut reader.by_ref().take(start as u64), &mut io::sink())?;

    let mut chunk_bytes = Vec::with_capacity(end - start);
    reader.take((end - start) as u64).read_to_end(&mut chunk_bytes)?;
    Ok(black_box(chunk_bytes.len() as u64))
}
