use crate::foundation::core::ExtensionId;

/// Crate-wide result alias.
pub type TrellisResult<T> = Result<T, TrellisError>;

#[derive(thiserror::Error, Debug)]
/// Engine error kinds.
pub enum TrellisError {
    /// A layout contract or identity invariant was violated. Fails fast.
    #[error("structure error: {0}")]
    Structure(String),

    /// A content factory or binder capability failed. Propagated unchanged to
    /// the caller; the affected position is left unmounted.
    #[error("content lifecycle error: {0}")]
    Content(String),

    /// One or more extension hooks failed. The pass completed for every other
    /// node or position before this was reported.
    #[error("extension errors: {0}")]
    Extensions(ExtensionFailures),

    /// Escape hatch for capability implementations built on other error types.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrellisError {
    /// Build a [`TrellisError::Structure`].
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }

    /// Build a [`TrellisError::Content`].
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }
}

/// A single failed extension hook invocation.
#[derive(Debug)]
pub struct ExtensionFailure {
    /// Which extension failed.
    pub extension: ExtensionId,
    /// The error it raised.
    pub error: TrellisError,
}

/// Aggregate of extension hook failures collected over one reduce or mount
/// pass. Hook failures never abort the pass for other nodes or positions;
/// they are reported once, together, when the pass is done.
#[derive(Debug, Default)]
pub struct ExtensionFailures {
    /// Individual failures in pass order.
    pub failures: Vec<ExtensionFailure>,
}

impl ExtensionFailures {
    pub(crate) fn push(&mut self, extension: ExtensionId, error: TrellisError) {
        self.failures.push(ExtensionFailure { extension, error });
    }

    /// `true` when no hook failed.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failed hook invocations.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn into_result(self) -> TrellisResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TrellisError::Extensions(self))
        }
    }
}

impl std::fmt::Display for ExtensionFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} hook failure(s)", self.failures.len())?;
        if let Some(first) = self.failures.first() {
            write!(
                f,
                "; first: extension {} -> {}",
                first.extension.0, first.error
            )?;
        }
        Ok(())
    }
}
