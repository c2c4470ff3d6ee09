//! Schema command - print the expected estate input format

use crate::estate::EstateInput;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = schema_for!(EstateInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
