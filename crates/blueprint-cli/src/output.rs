use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Left-aligned columns two spaces apart, with a dashed rule under the
/// header. Cells beyond the header count are printed unpadded.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .fold(headers[col].chars().count(), usize::max)
        })
        .collect();

    let mut out = render_line(&widths, headers.iter().copied());
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&render_line(&widths, rule.iter().map(String::as_str)));
    for row in rows {
        out.push_str(&render_line(&widths, row.iter().map(String::as_str)));
    }
    out
}

fn render_line<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let padded: Vec<String> = cells
        .enumerate()
        .map(|(col, cell)| {
            let width = widths.get(col).copied().unwrap_or(0);
            format!("{cell:<width$}")
        })
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Ten-cell text bar for a percentage.
pub fn bar(percentage: u32) -> String {
    let filled = (percentage.min(100) as usize + 5) / 10;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
}
