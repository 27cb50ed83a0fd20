use std::{env, path::PathBuf};

use getopts::Options;
use tracing::warn;

use crate::config::CONFIG_FILE;

#[derive(Clone, Debug, Default)]
pub struct Args {
    pub cfg_file: PathBuf,
    // test helper
    pub cfg_str: Option<String>,
    pub seed: Option<u64>,
    pub ticks: Option<u64>,
    pub help: bool,
}

pub fn build_options() -> Options {
    let mut opts = Options::new();
    opts.optopt("s", "seed", "seed the random source for reproducible readings", "N");
    opts.optopt("n", "ticks", "stop the live loop after N ticks", "N");
    opts.optflag("h", "help", "print this help");
    opts
}

pub fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options] [config_file]", program);
    print!("{}", opts.usage(&brief));
}

pub fn get_args() -> Args {
    let args: Vec<String> = env::args().collect();
    parse_args(&args)
}

pub fn parse_args(args: &[String]) -> Args {
    let program = args.first().cloned().unwrap_or_default();
    let opts = build_options();

    let default_args = Args { cfg_file: default_cfg_file(), ..Default::default() };
    let matches = match opts.parse(args.iter().skip(1)) {
        Ok(m) => m,
        Err(f) => {
            warn!("Error parsing arguments: {}", f);
            warn!("Proceeding with defaults.");
            print_usage(&program, &opts);
            return default_args;
        }
    };

    if matches.opt_present("h") {
        print_usage(&program, &opts);
        return Args { help: true, ..default_args };
    }

    let seed = parse_number(matches.opt_str("s"), "seed");
    let ticks = parse_number(matches.opt_str("n"), "ticks");
    let cfg_file = matches.free.first().map(PathBuf::from).unwrap_or(default_args.cfg_file);

    Args { cfg_file, cfg_str: None, seed, ticks, help: false }
}

fn parse_number(value: Option<String>, name: &str) -> Option<u64> {
    let value = value?;
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("Ignoring invalid {} '{}'.", name, value);
            None
        }
    }
}

pub fn default_cfg_file() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}
