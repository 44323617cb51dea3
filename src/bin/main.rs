use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use bgpstream_stats::analyze::{analyze, AnalyzeConfig};
use bgpstream_stats::broker::{collectors_in_source, get_collectors};
use bgpstream_stats::pool::default_workers;
use bgpstream_stats::topology::AsTopology;
use bgpstream_stats::{BgpStream, JsonlSource, RecordType, StreamError};
use clap::{Parser, Subcommand};

/// bgpstream-stats analyzes historical BGP data streams and extracts
/// high-level statistics.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count elements and records per peer, collector and day.
    Count {
        /// Record input: a JSONL file path or URL.
        #[clap(short, long)]
        input: String,

        /// Start time in epoch seconds. (Rounded down to the nearest day.)
        #[clap(short, long)]
        start_time: u64,

        /// End time in epoch seconds. (Rounded up to the nearest day.)
        #[clap(short, long)]
        end_time: u64,

        /// One of 'ribs' or 'updates'.
        #[clap(short = 't', long)]
        data_type: RecordType,

        /// Analyze only the given collectors. When omitted the collector
        /// list comes from the broker URL if one is given, otherwise from a
        /// scan of the input.
        #[clap(short, long)]
        collector: Vec<String>,

        /// Broker meta URL to fetch the collector list from.
        #[clap(short, long)]
        broker_url: Option<String>,

        /// Number of worker threads. Defaults to the available parallelism.
        #[clap(short, long)]
        workers: Option<usize>,

        /// Output directory.
        #[clap(short, long, default_value = "./")]
        outdir: PathBuf,
    },
    /// Summarize the AS adjacencies seen in an input.
    Topology {
        /// Record input: a JSONL file path or URL.
        #[clap(short, long)]
        input: String,

        /// Filter expression, e.g. "collector rrc06 and type ribs".
        #[clap(short, long)]
        filter: Option<String>,
    },
    /// Print the records and elements of an input.
    Print {
        /// Record input: a JSONL file path or URL.
        #[clap(short, long)]
        input: String,

        /// Filter expression, e.g. "collector rrc06 and type updates".
        #[clap(short, long)]
        filter: Option<String>,

        /// Start of the time interval filter, epoch seconds (inclusive).
        #[clap(short, long)]
        start_time: Option<u64>,

        /// End of the time interval filter, epoch seconds (inclusive).
        #[clap(short, long)]
        end_time: Option<u64>,
    },
}

fn open_stream(
    input: &str,
    filter: &Option<String>,
    start_time: Option<u64>,
    end_time: Option<u64>,
) -> Result<BgpStream<JsonlSource>, StreamError> {
    let mut stream = BgpStream::new(JsonlSource::open(input)?);
    if let Some(expr) = filter {
        stream = stream.add_filter_string(expr)?;
    }
    if let (Some(start), Some(end)) = (start_time, end_time) {
        stream = stream.add_interval_filter(start, end);
    }
    stream.start()
}

fn run(opts: Opts) -> Result<(), StreamError> {
    match opts.command {
        Command::Count {
            input,
            start_time,
            end_time,
            data_type,
            collector,
            broker_url,
            workers,
            outdir,
        } => {
            let collectors = if !collector.is_empty() {
                collector
            } else if let Some(url) = &broker_url {
                get_collectors(url)?
            } else {
                collectors_in_source(JsonlSource::open(&input)?)?
            };
            if collectors.is_empty() {
                return Err(StreamError::ConfigError(
                    "no collectors to analyze".to_string(),
                ));
            }

            let cfg = AnalyzeConfig {
                start: start_time,
                end: end_time,
                record_type: data_type,
                collectors,
                workers: workers.unwrap_or_else(default_workers),
            };
            let analysis = analyze(&cfg, |_unit| JsonlSource::open(&input))?;

            let outfile = outdir.join(analysis.file_name());
            let file = File::create(&outfile)?;
            analysis.write_csv(BufWriter::new(file))?;
            log::info!("wrote {}", outfile.display());
        }
        Command::Topology { input, filter } => {
            let stream = open_stream(&input, &filter, None, None)?;
            let mut topology = AsTopology::new();
            for elem in stream.into_elem_iter() {
                topology.add_elem(&elem);
            }
            println!("Processed {} elems", topology.elem_count());
            println!("Found {} AS adjacencies", topology.adjacency_count());
        }
        Command::Print {
            input,
            filter,
            start_time,
            end_time,
        } => {
            let mut stream = open_stream(&input, &filter, start_time, end_time)?;
            while let Some(record) = stream.next_record()? {
                println!(
                    "{} {}.{} {}",
                    record.status, record.project, record.collector, record.timestamp
                );
                for elem in &record.elems {
                    println!("\t{}", elem);
                }
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let opts: Opts = Opts::parse();
    if let Err(e) = run(opts) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
