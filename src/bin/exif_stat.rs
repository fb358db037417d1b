use clap::Parser;
use exif_stat::pipeline::{self, RunOptions};
use exif_stat::ReadOptions;
use std::path::PathBuf;
use std::process::ExitCode;

/// Collect Exif statistics from a folder of images into a CSV file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to folder with image files
    folder: PathBuf,

    /// Name of the output CSV file
    #[arg(short, long, default_value = "exif-stats.csv")]
    output: PathBuf,

    /// Output more information, including per-file failures
    #[arg(short, long)]
    verbose: bool,

    /// Use memory-mapped io. May be unstable with network paths
    #[arg(long)]
    fast_io: bool,

    /// Include file name in the output
    #[arg(short, long)]
    file_name: bool,

    /// Detailed flash status instead of Off/On
    #[arg(long)]
    extend_flash: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let options = RunOptions {
        folder: args.folder,
        output: args.output,
        read: ReadOptions {
            fast_io: args.fast_io,
            extend_flash: args.extend_flash,
        },
        include_file_name: args.file_name,
    };
    match pipeline::run(&options) {
        Ok(summary) => {
            println!(
                "Done: {} image files scanned, {} rows written to {}",
                summary.scanned,
                summary.written,
                options.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("exif-stat failed: {err}");
            ExitCode::FAILURE
        }
    }
}
