//! The scanner -> parser pool -> CSV writer pipeline.
//!
//! Stages are joined by bounded channels. Sources are owned by exactly one
//! parser worker at a time; dropping the last sender of a channel cascades
//! shutdown downstream, so closing the path channel drains the whole run.

use crate::error::Result;
use crate::formats;
use crate::info::{ExifInfo, ReadOptions};
use crate::report;
use crate::scan;
use log::info;
use std::path::PathBuf;
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub folder: PathBuf,
    pub output: PathBuf,
    pub read: ReadOptions,
    /// Include the file-name column in the CSV.
    pub include_file_name: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Supported image files found under the folder.
    pub scanned: u64,
    /// Valid records written to the CSV.
    pub written: u64,
}

/// Runs the full pipeline to completion. Per-file parse failures are logged
/// and skipped; only scanner and writer failures end the run.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let (path_sender, path_receiver) = sync_channel::<PathBuf>(CHANNEL_CAPACITY);
    let (record_sender, record_receiver) = sync_channel::<ExifInfo>(CHANNEL_CAPACITY);

    let scanner = {
        let folder = options.folder.clone();
        thread::spawn(move || {
            let sent = scan::scan_images(&folder, &path_sender);
            // sender drops here, closing the channel for the parser pool
            sent
        })
    };

    let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
    let path_receiver = Arc::new(Mutex::new(path_receiver));
    let mut parsers = Vec::with_capacity(workers);
    for _ in 0..workers {
        let path_receiver = Arc::clone(&path_receiver);
        let record_sender = record_sender.clone();
        let read_options = options.read;
        parsers.push(thread::spawn(move || {
            parse_paths(&path_receiver, |record| record_sender.send(record).is_ok(), &read_options);
        }));
    }
    // the workers hold the only remaining record senders
    drop(record_sender);

    let writer = {
        let output = options.output.clone();
        let include_file_name = options.include_file_name;
        thread::spawn(move || report::write_csv(&output, record_receiver, include_file_name))
    };

    let scanned = scanner.join().expect("scanner thread panicked");
    for parser in parsers {
        parser.join().expect("parser thread panicked");
    }
    let written = writer.join().expect("writer thread panicked")?;

    Ok(RunSummary { scanned, written })
}

fn parse_paths(
    paths: &Mutex<Receiver<PathBuf>>,
    mut emit: impl FnMut(ExifInfo) -> bool,
    options: &ReadOptions,
) {
    loop {
        let path = match paths.lock().expect("path receiver poisoned").recv() {
            Ok(path) => path,
            Err(_) => return,
        };
        match formats::read_exif_info(&path, options) {
            Ok(record) => {
                if !emit(record) {
                    return;
                }
            }
            Err(err) => info!("failed to extract Exif from '{}': {err}", path.display()),
        }
    }
}
