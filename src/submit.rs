//! Creation boundary: where a finished document leaves the tool.
use std::io::{self, Write};

use thiserror::Error;

use crate::identity::ResourceIdentity;
use crate::manifest::{OutputFormat, RenderError, render};
use crate::value::Document;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write manifest: {0}")]
    Io(#[from] io::Error),
}

/// Accepts `(identity, namespace, document)` and returns the created object.
pub trait CreationBoundary {
    fn create(
        &mut self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
        doc: Document,
    ) -> Result<Document, SubmitError>;
}

/// Writes the rendered manifest (for `kubectl apply -f -` and friends) and
/// hands the document back unchanged.
pub struct ManifestSink<W> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ManifestSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CreationBoundary for ManifestSink<W> {
    fn create(
        &mut self,
        identity: &ResourceIdentity,
        namespace: Option<&str>,
        doc: Document,
    ) -> Result<Document, SubmitError> {
        tracing::info!(resource = %identity, namespace = namespace.unwrap_or(""), "writing manifest");
        self.out.write_all(render(&doc, self.format)?.as_bytes())?;
        self.out.flush()?;
        Ok(doc)
    }
}
