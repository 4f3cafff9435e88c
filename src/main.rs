//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::process::exit;

use log::{error, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use tzip::compression::{compress::compress, decompress::decompress};
use tzip::tools::cli::{tzopts_init, Mode};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() {
    let opts = match tzopts_init() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("tzip: {}", e);
            exit(1);
        }
    };

    // Available log levels are Off, Error, Warn, Info, Debug, Trace
    if let Err(e) = TermLogger::init(
        opts.verbosity,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("tzip: could not start the logger: {}", e);
    }
    opts.report();

    //----- Figure how what we need to do and go do it
    let quiet = opts.verbosity == LevelFilter::Off;
    let result = match opts.op_mode {
        Mode::Zip => compress(&opts).map(|stats| {
            if !quiet {
                println!("{}", stats);
            }
        }),
        Mode::Unzip => decompress(&opts).map(|path| {
            if !quiet {
                println!("Restored {}", path.display());
            }
        }),
    };

    if let Err(e) = result {
        error!("{}", e);
        exit(1);
    }
}
