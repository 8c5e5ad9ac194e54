// Licensed under the Apache-2.0 license

//! Prints the FRU data held in SOM and carrier card EEPROMs.

pub mod eeprom;
pub mod render;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use fru_common::{xilinx, FruDecoder, FruDocument, TemplateRegistry};
use log::LevelFilter;
use render::OutputFormat;
use serde::Serialize;
use std::path::PathBuf;

pub const DEFAULT_SOM_PATH: &str = "/sys/bus/i2c/devices/*50/eeprom";
pub const DEFAULT_CC_PATH: &str = "/sys/bus/i2c/devices/*51/eeprom";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Board {
    /// System-on-module EEPROM
    Som,
    /// Carrier card EEPROM
    Cc,
}

/// Which multirecord templates to decode with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    Standard,
    #[default]
    Xilinx,
}

impl Profile {
    pub fn registry(&self) -> TemplateRegistry {
        match self {
            Profile::Standard => TemplateRegistry::standard(),
            Profile::Xilinx => xilinx::registry(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "print fru data of SOM/CC eeprom", long_about = None)]
pub struct Args {
    /// Enter som or cc
    #[arg(short, long, value_enum)]
    pub board: Option<Board>,

    /// Fields to index with. A single key is looked up in the board area.
    #[arg(short, long, num_args = 1.., requires = "board")]
    pub field: Option<Vec<String>>,

    /// Path to the SOM EEPROM
    #[arg(short, long, default_value = DEFAULT_SOM_PATH)]
    pub sompath: PathBuf,

    /// Path to the carrier card EEPROM
    #[arg(short, long, default_value = DEFAULT_CC_PATH)]
    pub ccpath: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(long, value_enum, default_value_t = Profile::Xilinx)]
    pub profile: Profile,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Serialize)]
struct BothBoards {
    som: FruDocument,
    cc: FruDocument,
}

/// Runs the tool and returns what it prints.
pub fn run(args: &Args) -> Result<String> {
    let decoder = FruDecoder::new(args.profile.registry());

    let Some(board) = args.board else {
        let som = eeprom::locate("sompath", &args.sompath)?;
        let cc = eeprom::locate("ccpath", &args.ccpath)?;
        let both = BothBoards {
            som: eeprom::load(&som, &decoder)?,
            cc: eeprom::load(&cc, &decoder)?,
        };
        return render::render(&both, args.format);
    };

    let path = match board {
        Board::Som => eeprom::locate("sompath", &args.sompath)?,
        Board::Cc => eeprom::locate("ccpath", &args.ccpath)?,
    };
    let document = eeprom::load(&path, &decoder)?;

    match &args.field {
        Some(keys) => {
            let value = render::lookup(&document, keys)?;
            render::render_value(&value, args.format)
        }
        None => render::render(&document, args.format),
    }
}
