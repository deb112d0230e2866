//! Opaque payload forwarded to every hook

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::HookError;

/// Raw bytes describing the container, read once from stdin and handed
/// unchanged to each hook of the phase. Clones share the same buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePayload(Arc<[u8]>);

impl LifecyclePayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self(Arc::from(bytes))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Read the reader to EOF
    pub async fn read_from<R>(reader: &mut R) -> Result<Self, HookError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| HookError::io("failed to read payload", e))?;
        Ok(Self::new(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for LifecyclePayload {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for LifecyclePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
