use std::path::Path;

use crate::PipelineError;

pub const USERNAME_COLUMN: &str = "username";

/// Read seed usernames from a comma-separated file with a `username` header.
///
/// Values are trimmed and a leading `@` is dropped; blank cells are skipped. Duplicates
/// are kept in file order.
pub fn read_seed_usernames(path: impl AsRef<Path>) -> Result<Vec<String>, PipelineError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(PipelineError::io(path))?;
    let seeds = parse_seeds(file, path)?;
    tracing::info!(path = %path.display(), count = seeds.len(), "seeds.loaded");
    Ok(seeds)
}

fn parse_seeds<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<String>, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == USERNAME_COLUMN)
        .ok_or_else(|| PipelineError::MissingColumn {
            path: path.to_path_buf(),
            column: USERNAME_COLUMN,
        })?;

    let mut seeds = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let name = record
            .get(column)
            .map(|v| v.trim().trim_start_matches('@'))
            .unwrap_or_default();
        if !name.is_empty() {
            seeds.push(name.to_string());
        }
    }
    Ok(seeds)
}
