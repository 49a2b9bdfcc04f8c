use comfy_table::{presets, Cell, Color, Table};

pub fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(headers);
    table
}

pub fn token_cell(has_token: bool) -> Cell {
    if has_token {
        Cell::new("saved").fg(Color::Green)
    } else {
        Cell::new("none").fg(Color::DarkGrey)
    }
}
