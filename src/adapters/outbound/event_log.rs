use crate::common::{DomainError, DomainResult, EventEnvelope};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Appends simulation events to a JSON Lines file, one envelope per line.
pub struct JsonLinesEventLog {
    path: PathBuf,
}

impl JsonLinesEventLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, envelopes: &[EventEnvelope]) -> DomainResult<()> {
        if envelopes.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::InfrastructureError(format!("failed to create {}: {}", parent.display(), e)))?;
        }

        let mut buffer = String::new();
        for envelope in envelopes {
            buffer.push_str(&serde_json::to_string(envelope)?);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| DomainError::InfrastructureError(format!("failed to open event log: {}", e)))?;
        file.write_all(buffer.as_bytes())
            .await
            .map_err(|e| DomainError::InfrastructureError(format!("failed to write event log: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| DomainError::InfrastructureError(format!("failed to flush event log: {}", e)))?;
        Ok(())
    }

    /// Read every envelope back, in append order.
    pub async fn read_all(&self) -> DomainResult<Vec<EventEnvelope>> {
        let file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DomainError::InfrastructureError(format!("failed to open event log: {}", e))),
        };
        let mut lines = BufReader::new(file).lines();
        let mut envelopes = Vec::new();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| DomainError::InfrastructureError(format!("failed to read event log: {}", e)))?
        {
            if line.trim().is_empty() {
                continue;
            }
            envelopes.push(serde_json::from_str(&line)?);
        }
        Ok(envelopes)
    }
}
