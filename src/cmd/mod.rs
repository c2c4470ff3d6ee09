pub mod calculate;
pub mod schema;
pub mod trust;

use crate::estate::EstateInput;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read an estate calculation input (JSON) from a file, or stdin with "-"
pub fn read_estate_input(path: &Path) -> anyhow::Result<EstateInput> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn read_from_stdin() -> anyhow::Result<EstateInput> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    Ok(serde_json::from_slice(&buffer)?)
}

pub(crate) fn format_gbp(amount: Decimal) -> String {
    format!("£{:.2}", amount)
}

pub(crate) fn format_rate(rate: Decimal) -> String {
    format!("{}%", rate.round_dp(3).normalize())
}
