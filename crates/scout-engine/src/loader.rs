//! Candidate lists on disk.
//!
//! Input needs `source` and `profile_url` columns; any of the columns written
//! by [`save_candidates_csv`] may also be present.

use crate::error::Result;
use scout_core::{Candidate, Platform};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
struct CandidateRow {
    source: String,
    profile_url: String,
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    niche: Option<String>,
    #[serde(default)]
    follower_count: Option<u64>,
}

impl CandidateRow {
    fn into_candidate(self) -> std::result::Result<Candidate, String> {
        let platform: Platform = self.source.parse().map_err(|e| format!("{e}"))?;
        let handle = platform
            .parse_profile_url(&self.profile_url)
            .map_err(|e| e.to_string())?;

        let mut candidate = Candidate::new(platform, handle);
        candidate.profile_url = self.profile_url.trim().to_string();
        candidate.display_name = self.display_name.filter(|s| !s.is_empty());
        candidate.bio = self.bio.filter(|s| !s.is_empty());
        candidate.niche = self.niche.filter(|s| !s.is_empty());
        candidate.follower_count = self.follower_count;
        Ok(candidate)
    }

    fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            source: candidate.platform.to_string(),
            profile_url: candidate.profile_url.clone(),
            handle: Some(candidate.handle.to_string()),
            display_name: candidate.display_name.clone(),
            bio: candidate.bio.clone(),
            niche: candidate.niche.clone(),
            follower_count: candidate.follower_count,
        }
    }
}

/// Load candidates from a CSV file. Rows with an unknown source or a bad URL are skipped.
pub fn load_candidates_csv(path: &Path) -> Result<Vec<Candidate>> {
    let file = std::fs::File::open(path)?;
    let candidates = read_candidates(file)?;
    tracing::info!("Loaded {} creators from {}", candidates.len(), path.display());
    Ok(candidates)
}

/// Read candidates from CSV with a header row.
pub fn read_candidates<R: Read>(reader: R) -> Result<Vec<Candidate>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut candidates = Vec::new();
    for (index, row) in reader.deserialize::<CandidateRow>().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(line, "Skipping unreadable CSV row: {}", e);
                continue;
            }
        };
        match row.into_candidate() {
            Ok(candidate) => candidates.push(candidate),
            Err(reason) => tracing::warn!(line, "Skipping CSV row: {}", reason),
        }
    }
    Ok(candidates)
}

/// Write candidates with a header row.
pub fn write_candidates<W: Write>(writer: W, candidates: &[Candidate]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for candidate in candidates {
        writer.serialize(CandidateRow::from_candidate(candidate))?;
    }
    writer.flush()?;
    Ok(())
}

/// Save candidates to a CSV file, replacing it.
pub fn save_candidates_csv(path: &Path, candidates: &[Candidate]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_candidates(file, candidates)?;
    tracing::info!("Saved {} discovered creators to {}", candidates.len(), path.display());
    Ok(())
}
