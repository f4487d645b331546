//! File-backed stripe store for fieldstripe.
//!
//! [`DirectoryStripeStore`] keeps every stripe in its own file inside a
//! directory, named after the dotted path of the leaf field. Writers buffer
//! tokens and flush on [`finish`](fieldstripe_core::StripeWriter::finish);
//! readers memory-map the file and decode one token ahead.

mod codec;
mod store;

pub use store::{DirectoryStripeStore, FileStripeReader, FileStripeWriter};
