use std::fmt::{Debug, Display};
use std::path::PathBuf;

use thiserror::Error;

use crate::buffer::BufferKind;
use crate::config::EditorConfigBuilderError;
use crate::deps::arcstr::ArcStr;
use crate::spec::ParseError;

pub type Result<T> = std::result::Result<T, CellgridError>;

pub struct CellgridError {
    pub(crate) source: ErrorSource,
    pub(crate) context: Vec<ErrorContext>,
}

impl CellgridError {
    pub fn source(&self) -> &ErrorSource {
        &self.source
    }

    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }
}

impl std::error::Error for CellgridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Display for CellgridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Error:\n{}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for item in self.context.iter() {
                writeln!(f, "\twhile {}", item)?;
            }
        }
        Ok(())
    }
}

impl Debug for CellgridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for (i, item) in self.context.iter().enumerate() {
                writeln!(f, "\t{}: {:?}", i, item)?;
            }
        }
        Ok(())
    }
}

impl<T> From<T> for CellgridError
where
    T: Into<ErrorSource>,
{
    fn from(value: T) -> Self {
        Self {
            source: value.into(),
            context: Vec::new(),
        }
    }
}

impl CellgridError {
    pub fn new(source: impl Into<ErrorSource>) -> Self {
        Self {
            source: source.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<ErrorContext>) -> Self {
        self.context.push(ctx.into());
        self
    }

    #[inline]
    pub fn into_inner(self) -> ErrorSource {
        self.source
    }
}

#[inline]
pub fn with_err_context<T, E, C>(result: std::result::Result<T, E>, ctx: C) -> Result<T>
where
    C: FnOnce() -> ErrorContext,
    E: Into<CellgridError>,
{
    result.map_err(|err| err.into().with_context(ctx()))
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorContext {
    ReadFile(PathBuf),
    RebuildCell,
    RenameCell(ArcStr),
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorContext::*;
        match self {
            ReadFile(path) => write!(f, "reading file {path:?}"),
            RebuildCell => write!(f, "rebuilding a cell from its specification"),
            RenameCell(name) => write!(f, "renaming cell to {name}"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorSource {
    #[error("error parsing cell specification: {0}")]
    Parse(#[from] ParseError),

    #[error("no such cell")]
    CellNotFound,

    #[error("no such element")]
    ElementNotFound,

    #[error("no such buffer: {kind} buffer {index}")]
    BufferNotFound { kind: BufferKind, index: usize },

    #[error("already exists: {0}")]
    AlreadyExists(ArcStr),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] EditorConfigBuilderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing TOML: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("internal error: {0}")]
    Internal(String),
}
