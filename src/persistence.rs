// File: src/persistence.rs
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::core::table::HomophoneTable;
use crate::error::Result;

/// Writes a compiled table next to `path` and renames it into place,
/// so readers never see a half-written snapshot.
pub fn save_snapshot(table: &HomophoneTable, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, table)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| e.error)?;
    info!("saved snapshot of {} keys to {}", table.size(), path.display());
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<HomophoneTable> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let table: HomophoneTable = bincode::deserialize_from(reader)?;
    table
        .verify()
        .map_err(|msg| Box::new(bincode::ErrorKind::Custom(msg)))?;
    info!("loaded snapshot of {} keys from {}", table.size(), path.display());
    Ok(table)
}
