//! Tags command - the tag palette

use std::process::ExitCode;

use anyhow::Result;
use skillswap_core::adapters::seed::AVAILABLE_TAGS;

pub fn run(json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(AVAILABLE_TAGS)?);
    } else {
        for tag in AVAILABLE_TAGS {
            println!("{}", tag);
        }
    }
    Ok(ExitCode::SUCCESS)
}
