use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use fl_store::{LeaderboardSink, SqliteLeaderboard};

/// Print one page of the leaderboard in `db`.
pub fn run(db: &Path, offset: usize, limit: usize) -> Result<(), String> {
    let board =
        SqliteLeaderboard::open(db, 1).map_err(|e| format!("cannot open {}: {e}", db.display()))?;
    let records = board.top(offset, limit).map_err(|e| e.to_string())?;

    if records.is_empty() {
        println!("  No records yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Rank", "Player", "Score", "Play time"]);

    for (i, record) in records.iter().enumerate() {
        table.add_row(vec![
            (offset + i + 1).to_string(),
            record.name.clone(),
            record.score.to_string(),
            super::format_secs(record.play_time()),
        ]);
    }

    println!("{table}");
    Ok(())
}
