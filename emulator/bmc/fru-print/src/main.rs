/*++

Licensed under the Apache-2.0 license.

--*/

//! Prints FRU data from SOM and carrier card EEPROMs.
//!
//! With no arguments both EEPROMs are decoded and printed. `-b` selects one
//! board and `-f` narrows the output to a single field:
//!
//! ```bash
//! fru-print -b som -f product
//! fru-print -b cc -f multirecord DC_Load_Record max_V
//! fru-print -b som --format toml --profile standard
//! ```

use clap::Parser;
use fru_print::{run, Args};
use simple_logger::SimpleLogger;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    SimpleLogger::new().with_level(args.log_level()).init()?;

    let output = run(&args)?;
    print!("{output}");
    Ok(())
}
