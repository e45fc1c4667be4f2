use bytes::Bytes;

/// A unit of work flowing through the pipeline.
///
/// Documents are created unsigned by the source, signed once by a pool
/// worker and checked by the verifier. They move through queues by value, so
/// whichever stage holds one owns it exclusively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    text: String,
    signature: Option<Bytes>,
}

impl Document {
    /// Creates an unsigned document.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            signature: None,
        }
    }

    /// The document body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The signature attached by a worker, if any.
    pub fn signature(&self) -> Option<&Bytes> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Attaches `signature` and hands the document back.
    pub fn with_signature(mut self, signature: Bytes) -> Self {
        self.signature = Some(signature);
        self
    }
}
