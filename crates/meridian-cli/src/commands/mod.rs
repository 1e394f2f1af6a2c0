pub mod check;
pub mod list;
pub mod simulate;

use std::path::Path;

use meridian_data::DataStore;

/// Load a content directory, turning load errors into a message.
fn load_dir(dir: &Path) -> Result<DataStore, String> {
    DataStore::load(dir).map_err(|e| format!("failed to load '{}': {e}", dir.display()))
}
