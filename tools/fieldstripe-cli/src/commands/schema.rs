use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Args;
use fieldstripe_core::format_schema;

use super::SchemaSource;

#[derive(Args)]
pub struct SchemaArgs {
    #[command(flatten)]
    schema: SchemaSource,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let root = self.schema.load()?;
        let text = format_schema(&root)?;

        match self.output {
            Some(path) => fs::write(path, text)?,
            None => print!("{text}"),
        }
        Ok(())
    }
}
