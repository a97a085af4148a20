/// `fetchland maps`.
pub mod maps;
/// `fetchland records`.
pub mod records;
/// `fetchland serve`.
pub mod serve;
/// `fetchland simulate`.
pub mod simulate;

use std::path::Path;
use std::time::Duration;

use fl_core::GameConfig;

/// Load and validate a game configuration file.
fn load_game(path: &Path) -> Result<GameConfig, String> {
    GameConfig::load(path).map_err(|e| format!("{}: {e}", path.display()))
}

/// Format a duration as seconds with one decimal.
fn format_secs(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}
