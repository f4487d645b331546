use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use bytes::BytesMut;
use fieldstripe_core::{
    Depth, Field, Marker, PrimitiveType, StripeError, StripeReader, StripeReaderFactory,
    StripeWriter, StripeWriterFactory, Token, Value,
};
use memmap2::Mmap;

use crate::codec;

const EXTENSION: &str = "stripe";

/// A directory holding one `<dotted.path>.stripe` file per leaf field.
#[derive(Debug, Clone)]
pub struct DirectoryStripeStore {
    dir: PathBuf,
}

impl DirectoryStripeStore {
    /// Use `dir` as the output of an encode run, creating it if needed.
    ///
    /// Existing stripe files are never overwritten; creating a writer for one
    /// fails with [`StripeError::AlreadyExists`].
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, StripeError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "opened stripe directory for writing");
        Ok(Self { dir })
    }

    /// Use an existing directory as the input of a decode run.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StripeError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(StripeError::NotFound {
                stripe: dir.display().to_string(),
            });
        }
        tracing::debug!(dir = %dir.display(), "opened stripe directory for reading");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the stripe of `field`.
    pub fn stripe_path(&self, field: &Field) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", field.path()))
    }

    /// Dotted field paths of every stripe file present, sorted.
    pub fn stripe_names(&self) -> Result<Vec<String>, StripeError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn leaf_type(field: &Field) -> Result<PrimitiveType, StripeError> {
    field
        .field_type()
        .as_primitive()
        .ok_or_else(|| StripeError::Malformed {
            stripe: field.path().to_string(),
            detail: format!("'{}' is not a primitive field", field.field_type().type_name()),
        })
}

impl StripeWriterFactory for DirectoryStripeStore {
    fn create_writer(&mut self, field: &Field) -> Result<Box<dyn StripeWriter>, StripeError> {
        let primitive = leaf_type(field)?;
        let path = self.stripe_path(field);
        let stripe = field.path().to_string();
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StripeError::AlreadyExists { stripe });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Box::new(FileStripeWriter::new(stripe, primitive, file)?))
    }
}

impl StripeReaderFactory for DirectoryStripeStore {
    fn open_reader(&mut self, field: &Field) -> Result<Box<dyn StripeReader>, StripeError> {
        let primitive = leaf_type(field)?;
        let path = self.stripe_path(field);
        let stripe = field.path().to_string();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StripeError::NotFound { stripe });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Box::new(FileStripeReader::new(stripe, primitive, &file)?))
    }
}

/// Buffered writer for one stripe file.
pub struct FileStripeWriter {
    stripe: String,
    primitive: PrimitiveType,
    out: BufWriter<File>,
    scratch: BytesMut,
    tokens: u64,
}

impl FileStripeWriter {
    fn new(stripe: String, primitive: PrimitiveType, file: File) -> Result<Self, StripeError> {
        let mut out = BufWriter::new(file);
        let mut header = BytesMut::with_capacity(codec::HEADER_LEN);
        codec::put_header(&mut header, primitive);
        out.write_all(&header)?;
        Ok(Self {
            stripe,
            primitive,
            out,
            scratch: BytesMut::new(),
            tokens: 0,
        })
    }

    fn flush_scratch(&mut self) -> Result<(), StripeError> {
        self.out.write_all(&self.scratch)?;
        self.scratch.clear();
        self.tokens += 1;
        Ok(())
    }

    fn write_marker(&mut self, token: Token) -> Result<(), StripeError> {
        codec::put_marker(&mut self.scratch, &token);
        self.flush_scratch()
    }
}

impl StripeWriter for FileStripeWriter {
    fn write_value(&mut self, value: &Value) -> Result<(), StripeError> {
        if let Err(detail) = codec::put_value(&mut self.scratch, self.primitive, value) {
            self.scratch.clear();
            return Err(StripeError::Malformed {
                stripe: self.stripe.clone(),
                detail,
            });
        }
        self.flush_scratch()
    }

    fn write_unset(&mut self) -> Result<(), StripeError> {
        self.write_marker(Token::Unset)
    }

    fn write_repeated_value(&mut self) -> Result<(), StripeError> {
        self.write_marker(Token::RepeatedValue)
    }

    fn write_unset_parent(&mut self, depth: Depth) -> Result<(), StripeError> {
        self.write_marker(Token::UnsetParent(depth))
    }

    fn write_repeated_parent(&mut self, depth: Depth) -> Result<(), StripeError> {
        self.write_marker(Token::RepeatedParent(depth))
    }

    fn finish(&mut self) -> Result<(), StripeError> {
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        tracing::debug!(stripe = %self.stripe, tokens = self.tokens, "finished stripe");
        Ok(())
    }
}

/// Memory-mapped reader for one stripe file.
pub struct FileStripeReader {
    stripe: String,
    primitive: PrimitiveType,
    data: Mmap,
    pos: usize,
    peeked: Option<Token>,
}

impl FileStripeReader {
    fn new(stripe: String, primitive: PrimitiveType, file: &File) -> Result<Self, StripeError> {
        let len = file.metadata()?.len();
        if len < codec::HEADER_LEN as u64 {
            return Err(StripeError::Malformed {
                stripe,
                detail: format!("file is {len} bytes, shorter than the header"),
            });
        }
        let data = unsafe { Mmap::map(file) }?;

        let mut header = &data[..];
        let declared = codec::get_header(&mut header).map_err(|detail| StripeError::Malformed {
            stripe: stripe.clone(),
            detail,
        })?;
        if declared != primitive {
            return Err(StripeError::Malformed {
                stripe,
                detail: format!("stripe holds {declared} values, field is {primitive}"),
            });
        }
        tracing::debug!(stripe = %stripe, bytes = len, "mapped stripe");

        Ok(Self {
            stripe,
            primitive,
            data,
            pos: codec::HEADER_LEN,
            peeked: None,
        })
    }

    fn decode_next(&mut self) -> Result<Option<Token>, StripeError> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let mut buf = &self.data[self.pos..];
        let before = buf.len();
        let token =
            codec::get_token(&mut buf, self.primitive).map_err(|detail| StripeError::Malformed {
                stripe: self.stripe.clone(),
                detail: format!("at byte {}: {detail}", self.pos),
            })?;
        self.pos += before - buf.len();
        Ok(Some(token))
    }
}

impl StripeReader for FileStripeReader {
    fn peek(&mut self) -> Result<Option<Marker>, StripeError> {
        if self.peeked.is_none() {
            self.peeked = self.decode_next()?;
        }
        Ok(self.peeked.as_ref().map(Token::marker))
    }

    fn read_token(&mut self) -> Result<Option<Token>, StripeError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.decode_next(),
        }
    }
}
