//! Saving and loading agent profiles as JSON files
//!
//! Runs off the decision path; the file handles are closed when the
//! functions return.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::agent::profile::{AgentProfile, StateBlob};
use crate::core::config::CombatAiConfig;
use crate::core::error::Result;

pub fn save_profile<P: AsRef<Path>>(profile: &AgentProfile, path: P) -> Result<()> {
    let blob = profile.serialize()?;
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writer.write_all(blob.as_str().as_bytes())?;
    writer.flush()?;

    tracing::info!(
        "Saved agent {} (level {}) to {}",
        profile.id(),
        profile.level(),
        path.as_ref().display()
    );
    Ok(())
}

/// Load a profile, failing on unreadable or incompatible files
pub fn load_profile<P: AsRef<Path>>(path: P, config: &CombatAiConfig) -> Result<AgentProfile> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    let mut json = String::new();
    reader.read_to_string(&mut json)?;

    let profile = AgentProfile::from_blob(&StateBlob::from_json(json), config)?;
    tracing::info!(
        "Loaded agent {} (level {}) from {}",
        profile.id(),
        profile.level(),
        path.as_ref().display()
    );
    Ok(profile)
}
