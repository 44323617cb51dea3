use std::path::PathBuf;

use bgpstream_stats::db::{add_mrt_file, create_tables, list_files};
use clap::Parser;
use rusqlite::Connection;

/// bgpstream-db maintains the SQLite inventory of archived MRT files.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// File containing the sqlite database.
    #[clap(name = "SQLITE_DB")]
    sqlite_db: PathBuf,

    /// List the MRT files in the database.
    #[clap(short, long)]
    list_files: bool,

    /// Path to the MRT file to add to the database.
    #[clap(short = 'M', long)]
    add_mrt_file: Option<String>,

    /// BGP project the file belongs to.
    #[clap(short, long)]
    proj: Option<String>,

    /// BGP collector the file belongs to.
    #[clap(short, long)]
    coll: Option<String>,

    /// BGP type, one of 'ribs' or 'updates'.
    #[clap(short = 't', long)]
    bgp_type: Option<String>,

    /// Time associated with the MRT file, epoch seconds.
    #[clap(short = 'T', long)]
    file_time: Option<i64>,

    /// Time span of an updates file, minutes.
    #[clap(short = 'u', long)]
    updates_time_span: Option<i64>,
}

fn main() {
    env_logger::init();

    let opts: Opts = Opts::parse();

    let conn = match Connection::open(&opts.sqlite_db) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("cannot open {}: {}", opts.sqlite_db.display(), e);
            std::process::exit(1);
        }
    };
    if let Err(e) = create_tables(&conn) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if !opts.list_files && opts.add_mrt_file.is_none() {
        println!(
            "No actions required, creating the database file {}",
            opts.sqlite_db.display()
        );
    }

    if opts.list_files {
        match list_files(&conn) {
            Ok(files) => {
                println!("Files in database: {}", files.len());
                for f in files {
                    println!(
                        "{} {} {} {} {} {} {}",
                        f.project, f.collector, f.bgp_type, f.time_span, f.file_time,
                        f.file_path, f.ts
                    );
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }

    if let Some(mrt_file) = &opts.add_mrt_file {
        let (Some(proj), Some(coll), Some(bgp_type), Some(file_time)) =
            (&opts.proj, &opts.coll, &opts.bgp_type, opts.file_time)
        else {
            println!(
                "Could not add mrt file: please provide project, collector, bgp type, and file time"
            );
            return;
        };
        if bgp_type == "updates" && opts.updates_time_span.is_none() {
            println!(
                "Could not add mrt file: please provide time span for the current update file"
            );
            return;
        }
        match add_mrt_file(
            &conn,
            mrt_file,
            proj,
            coll,
            bgp_type,
            file_time,
            opts.updates_time_span,
        ) {
            Ok(true) => {}
            Ok(false) => println!("Could not add mrt file: bgp type {} not supported", bgp_type),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
}
