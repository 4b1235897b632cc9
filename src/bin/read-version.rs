//! read-version entry point

use clap::Parser;
use clap::error::ErrorKind;
use std::process;
use versiontools::cli::ReadVersionCli;
use versiontools::cli::common::{report_parse_error, setup_logging};
use versiontools::cli::read::{USAGE, run_read_version};

fn main() {
    let cli = match ReadVersionCli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => process::exit(report_parse_error(&USAGE, &e)),
    };

    setup_logging(cli.common.verbose);

    process::exit(run_read_version(&cli.args, &cli.common));
}
