/// Layout options for [`render_entity_table`].
#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;
const GAP: &str = "  ";

/// Render a left-aligned table. Columns shrink, widest first, to fit
/// `max_width`; with `color` set, status and severity words are highlighted.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let floors: Vec<usize> = headers.iter().map(|h| h.chars().count().max(MIN_COLUMN)).collect();
    let mut widths: Vec<usize> = floors
        .iter()
        .enumerate()
        .map(|(index, floor)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|value| value.chars().count())
                .fold(*floor, usize::max)
        })
        .collect();
    if let Some(max_width) = options.max_width {
        shrink(&mut widths, &floors, max_width);
    }

    let header = join_cells(headers.iter().copied(), &widths, false);
    let mut lines = vec![header.clone(), "-".repeat(header.chars().count())];
    for row in rows {
        let values = (0..widths.len()).map(|index| row.get(index).map_or("-", String::as_str));
        lines.push(join_cells(values, &widths, options.color));
    }
    lines.join("\n")
}

fn join_cells<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize], color: bool) -> String {
    values
        .zip(widths)
        .map(|(value, width)| cell(value, *width, color))
        .collect::<Vec<_>>()
        .join(GAP)
}

/// Trim one character at a time from the widest column still above its
/// floor until the row fits or nothing can shrink.
fn shrink(widths: &mut [usize], floors: &[usize], max_width: usize) {
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    let mut excess = (widths.iter().sum::<usize>() + gaps).saturating_sub(max_width);
    while excess > 0 {
        let widest = widths
            .iter()
            .zip(floors)
            .enumerate()
            .filter(|(_, (width, floor))| width > floor)
            .max_by_key(|(index, (width, _))| (**width, std::cmp::Reverse(*index)))
            .map(|(index, _)| index);
        let Some(index) = widest else {
            break;
        };
        widths[index] -= 1;
        excess -= 1;
    }
}

/// Pad `value` to `width` visible characters, clipping with an ellipsis.
/// Padding is measured before any color codes are added.
fn cell(value: &str, width: usize, color: bool) -> String {
    let text: String = if value.chars().count() > width {
        let mut clipped: String = value.chars().take(width.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    } else {
        value.to_string()
    };
    let pad = " ".repeat(width.saturating_sub(text.chars().count()));
    match color.then(|| color_code(&text)).flatten() {
        Some(code) => format!("\u{1b}[{code}m{text}\u{1b}[0m{pad}"),
        None => text + &pad,
    }
}

fn color_code(value: &str) -> Option<&'static str> {
    match value {
        "ok" | "completed" => Some("32"),
        "warning" | "minor" | "pending" | "in_progress" => Some("33"),
        "critical" | "cancelled" => Some("31"),
        _ => None,
    }
}
