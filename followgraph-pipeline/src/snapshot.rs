//! Raw JSON snapshot of a collection run.
use followgraph_common::{RawResult, SnapshotPolicy};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Written,
    /// The target existed and the policy was `skip`; nothing was written.
    Skipped,
}

/// Serialize `raw` to `path`, creating parent directories.
///
/// What happens when `path` already exists is decided by `policy`. The JSON is written to
/// a temporary file next to `path` and only moved into place once complete, so a failed
/// write never leaves a partial snapshot for later runs to skip over.
pub fn write_snapshot(
    raw: &RawResult,
    path: impl AsRef<Path>,
    policy: SnapshotPolicy,
) -> Result<SnapshotOutcome, PipelineError> {
    let path = path.as_ref();
    let outcome = write_atomically(path, policy, |out| {
        serde_json::to_writer_pretty(out, raw).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })
    })?;
    if outcome == SnapshotOutcome::Written {
        tracing::info!(path = %path.display(), seeds = raw.len(), "snapshot.written");
    }
    Ok(outcome)
}

fn write_atomically<F>(
    path: &Path,
    policy: SnapshotPolicy,
    write: F,
) -> Result<SnapshotOutcome, PipelineError>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<(), PipelineError>,
{
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(PipelineError::io(parent))?;
            parent
        }
        None => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(PipelineError::io(dir))?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        write(&mut out)?;
        out.flush().map_err(PipelineError::io(tmp.path()))?;
    }
    tmp.as_file().sync_all().map_err(PipelineError::io(tmp.path()))?;

    let persisted = match policy {
        SnapshotPolicy::Overwrite => tmp.persist(path),
        SnapshotPolicy::Skip | SnapshotPolicy::Fail => tmp.persist_noclobber(path),
    };
    match persisted {
        Ok(_) => Ok(SnapshotOutcome::Written),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
            if policy == SnapshotPolicy::Fail {
                return Err(PipelineError::SnapshotExists(path.to_path_buf()));
            }
            tracing::warn!(path = %path.display(), "snapshot.skipped");
            Ok(SnapshotOutcome::Skipped)
        }
        Err(e) => Err(PipelineError::io(path)(e.error)),
    }
}

pub fn read_snapshot(path: impl AsRef<Path>) -> Result<RawResult, PipelineError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(PipelineError::io(path))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })
}
