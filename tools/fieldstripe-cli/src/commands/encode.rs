use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Args;
use fieldstripe::build_encoder;
use fieldstripe_binary::DirectoryStripeStore;
use fieldstripe_json::json_record_source;

use super::{SchemaSource, record_spinner};

#[derive(Args)]
pub struct EncodeArgs {
    #[command(flatten)]
    schema: SchemaSource,

    /// JSON records, one positional array per record (`-` for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory to write stripes into
    #[arg(short, long)]
    output: PathBuf,
}

impl EncodeArgs {
    pub fn run(self) -> Result<()> {
        let root = self.schema.load()?;
        let input: Box<dyn Read> = if self.input.as_os_str() == "-" {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(&self.input)
                .with_context(|| format!("opening {}", self.input.display()))?;
            Box::new(BufReader::new(file))
        };

        let mut store = DirectoryStripeStore::create(&self.output)?;
        let mut encoder = build_encoder(&root, &mut store)?;
        let mut source = json_record_source(input, &root);

        let pb = record_spinner("encoded")?;
        while encoder.encode(&mut source)? {
            pb.inc(1);
        }
        encoder.finish()?;
        pb.finish();

        tracing::info!(
            records = pb.position(),
            stripes = root.leaves().len(),
            output = %self.output.display(),
            "encode finished"
        );
        Ok(())
    }
}
