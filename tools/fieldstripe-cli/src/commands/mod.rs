mod decode;
mod encode;
mod schema;

pub use decode::DecodeArgs;
pub use encode::EncodeArgs;
pub use schema::SchemaArgs;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use fieldstripe_core::{CompositeType, SchemaProvider};
use fieldstripe_protobuf::{PresencePolicy, ProtobufSchemaProvider};
use indicatif::{ProgressBar, ProgressStyle};

/// Where the record schema comes from; shared by every subcommand.
#[derive(Args)]
pub struct SchemaSource {
    /// Path to a serialized protobuf FileDescriptorSet
    #[arg(short, long)]
    descriptor_set: PathBuf,

    /// Fully-qualified name of the top-level message
    #[arg(short, long)]
    message: String,

    /// How singular protobuf fields map to qualifiers
    #[arg(long, value_enum, default_value_t = Presence::Aware)]
    presence_policy: Presence,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Presence {
    /// Fields with explicit presence are optional, implicit proto3 scalars are required
    Aware,
    /// Every singular field is optional
    AllOptional,
}

impl From<Presence> for PresencePolicy {
    fn from(p: Presence) -> Self {
        match p {
            Presence::Aware => PresencePolicy::PresenceAware,
            Presence::AllOptional => PresencePolicy::AllOptional,
        }
    }
}

impl SchemaSource {
    pub fn load(&self) -> Result<CompositeType> {
        let bytes = fs::read(&self.descriptor_set)
            .with_context(|| format!("reading {}", self.descriptor_set.display()))?;
        let provider = ProtobufSchemaProvider::decode(&bytes)?
            .with_presence_policy(self.presence_policy.into());
        let root = provider.root_type(&self.message).with_context(|| {
            format!(
                "top-level messages: {}",
                provider.top_level_messages().join(", ")
            )
        })?;
        Ok(root)
    }
}

/// Spinner counting records on stderr; hidden when stderr is not a terminal.
fn record_spinner(verb: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(&format!(
        "{{spinner}} {verb} {{pos}} records [{{elapsed_precise}}] {{per_sec}}"
    ))?);
    Ok(pb)
}
