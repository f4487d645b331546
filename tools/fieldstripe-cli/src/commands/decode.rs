use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Args;
use fieldstripe::build_decoder;
use fieldstripe_binary::DirectoryStripeStore;
use fieldstripe_json::JsonRecordSink;

use super::{SchemaSource, record_spinner};

#[derive(Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    schema: SchemaSource,

    /// Directory holding the stripes
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl DecodeArgs {
    pub fn run(self) -> Result<()> {
        let root = self.schema.load()?;
        let dest: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };

        let mut store = DirectoryStripeStore::open(&self.input)?;
        let mut decoder = build_decoder(&root, &mut store)?;
        let mut sink = JsonRecordSink::new(dest, &root);

        let pb = record_spinner("decoded")?;
        while decoder.decode(&mut sink)? {
            pb.inc(1);
        }
        pb.finish();

        let records = sink.records_written();
        sink.finish()?;
        tracing::info!(records, input = %self.input.display(), "decode finished");
        Ok(())
    }
}
