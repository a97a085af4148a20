use std::path::Path;

use comfy_table::{ContentArrangement, Table};

/// Print the maps of a game configuration as a table.
pub fn run(config_file: &Path) -> Result<(), String> {
    let game = super::load_game(config_file)?;

    if game.maps.is_empty() {
        println!("  No maps found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Id",
        "Name",
        "Roads",
        "Offices",
        "Loot types",
        "Dog speed",
        "Bag",
        "Retires after",
    ]);

    for map in &game.maps {
        table.add_row(vec![
            map.id().to_string(),
            map.name().to_string(),
            map.roads().len().to_string(),
            map.offices().len().to_string(),
            map.loot_types().len().to_string(),
            format!("{:.1}", map.dog_speed()),
            map.bag_capacity().to_string(),
            super::format_secs(map.retirement()),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} maps", game.maps.len());

    Ok(())
}
