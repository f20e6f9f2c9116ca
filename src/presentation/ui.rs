use crate::application::{App, AppMode, FormField, View};
use crate::domain::{Diagram, Rgb};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_tabs(f, app, chunks[1]);
    match app.view {
        View::Layers => render_layer_table(f, app, chunks[2]),
        View::Column => render_column_view(f, app, chunks[2]),
    }
    render_status_bar(f, app, chunks[3]);

    match app.mode {
        AppMode::Form => render_form_popup(f, app),
        AppMode::Help => render_help_popup(f, app.help_scroll),
        AppMode::ConfirmClear => render_confirm_popup(f, app),
        _ => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let selected = app
        .selected
        .map(|i| format!("{}", i + 1))
        .unwrap_or_else(|| "-".to_string());
    let header = Paragraph::new(format!(
        "StrataSim - Stratigraphic Column Tool | Layers: {} | Total: {:.2} m | Selected: {}",
        app.store.len(),
        app.store.total_thickness(),
        selected
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let index = match app.view {
        View::Layers => 0,
        View::Column => 1,
    };
    let tabs = Tabs::new(vec!["Layers", "Column"])
        .select(index)
        .style(Style::default().fg(Color::Yellow))
        .highlight_style(Style::default().bg(Color::LightBlue).fg(Color::Black));
    f.render_widget(tabs, area);
}

fn terminal_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn ink_for(fill: Rgb) -> Color {
    if fill.luma() > 128 { Color::Black } else { Color::White }
}

fn render_layer_table(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        "#", "Lithology", "Color", "Grain Size", "Thickness", "Fossils", "Environment", "Notes",
    ])
    .style(Style::default().fg(Color::Yellow))
    .height(1);

    let rows: Vec<Row> = app
        .store
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let swatch = Style::default().bg(terminal_color(layer.color())).fg(ink_for(layer.color()));
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(layer.lithology().name()),
                Cell::from(layer.color().to_string()).style(swatch),
                Cell::from(layer.grain_size().name()),
                Cell::from(format!("{:.2}", layer.thickness())),
                Cell::from(layer.fossils().to_string()),
                Cell::from(layer.environment().name()),
                Cell::from(layer.notes().replace('\n', " ")),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(13),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(10),
        Constraint::Length(16),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Layers (storage order)"))
        .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .column_spacing(1);

    let mut state = TableState::default().with_selected(app.selected);
    f.render_stateful_widget(table, area, &mut state);
}

fn render_column_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(area);

    let column_block = Block::default().borders(Borders::ALL).title("Stratigraphic Column");
    let inner = column_block.inner(chunks[0]);
    f.render_widget(column_block, chunks[0]);

    let diagram = app.diagram();
    if diagram.is_empty() {
        f.render_widget(Paragraph::new("No layers to display."), inner);
    } else {
        let lines = column_lines(&diagram, inner.width, inner.height);
        f.render_widget(Paragraph::new(lines), inner);
    }

    render_legend(f, &app.legend(), chunks[1]);
}

/// Terminal rows given to each block (in diagram order, bottom first).
///
/// Every block gets at least one row when there is room; the rest are shared
/// in proportion to thickness. With fewer rows than blocks the topmost blocks
/// get one row each and the rest get none.
pub fn allocate_rows(diagram: &Diagram, rows: u16) -> Vec<u16> {
    let n = diagram.blocks.len();
    let mut heights = vec![0u16; n];
    if n == 0 || rows == 0 {
        return heights;
    }
    if (rows as usize) <= n {
        for h in heights.iter_mut().rev().take(rows as usize) {
            *h = 1;
        }
        return heights;
    }

    let spare_rows = rows as usize - n;
    let spare = spare_rows as f64;
    let total = diagram.height.max(f64::MIN_POSITIVE);
    let shares: Vec<f64> = diagram
        .blocks
        .iter()
        .map(|b| spare * b.height.max(0.0) / total)
        .collect();

    // Shares can exceed the spare rows when some thicknesses are negative.
    let mut assigned = 0usize;
    for (h, share) in heights.iter_mut().zip(&shares) {
        let whole = (share.floor().max(0.0) as usize).min(spare_rows - assigned);
        *h = 1 + whole as u16;
        assigned += whole;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let fa = shares[a] - shares[a].floor();
        let fb = shares[b] - shares[b].floor();
        fb.total_cmp(&fa).then(b.cmp(&a))
    });
    let leftover = spare_rows - assigned;
    for &i in order.iter().take(leftover) {
        heights[i] += 1;
    }
    heights
}

/// Draws the column top-down as styled text lines `width` cells wide.
pub fn column_lines(diagram: &Diagram, width: u16, rows: u16) -> Vec<Line<'static>> {
    let heights = allocate_rows(diagram, rows);
    let width = width as usize;
    let mut lines = Vec::with_capacity(rows as usize);

    for (block, &height) in diagram.blocks.iter().zip(&heights).rev() {
        if height == 0 {
            continue;
        }
        let style = Style::default().bg(terminal_color(block.fill)).fg(ink_for(block.fill));
        let texture = block.pattern.map_or(' ', |p| p.glyph());
        let label_row = height / 2;
        for row in 0..height {
            let mut text: Vec<char> = std::iter::repeat_n(texture, width).collect();
            if row == label_row {
                let label: Vec<char> = format!(" {} ", block.label).chars().collect();
                if label.len() <= width {
                    let start = (width - label.len()) / 2;
                    text[start..start + label.len()].copy_from_slice(&label);
                }
            }
            let content: String = text.into_iter().collect();
            let span_style = if row == label_row {
                style.add_modifier(Modifier::BOLD)
            } else {
                style
            };
            lines.push(Line::from(Span::styled(content, span_style)));
        }
    }
    lines
}

fn render_legend(f: &mut Frame, legend: &Diagram, area: Rect) {
    let swatch = Style::default().bg(Color::White).fg(Color::Black);
    let mut lines: Vec<Line> = legend
        .blocks
        .iter()
        .map(|b| {
            let hatch: String = std::iter::repeat_n(b.pattern.map_or(' ', |p| p.glyph()), 6).collect();
            Line::from(vec![
                Span::styled(hatch, swatch),
                Span::raw(format!(" {}", b.label)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Marine: Shale, Limestone",
        Style::default().fg(Color::Cyan),
    )));
    lines.push(Line::from(Span::styled(
        "Fluvial/Deltaic: everything else",
        Style::default().fg(Color::Green),
    )));

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Legend"));
    f.render_widget(widget, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "a: add | e: edit | d: delete | K/J: move | Tab: view | Ctrl+E: CSV | Ctrl+P: PNG | Ctrl+L: import | F1/?: help | q: quit".to_string()
            }
        }
        AppMode::Form => match app.status_message {
            Some(ref status) => format!("{} (fix the field and press Enter)", status),
            None => "Tab/↑↓: field | ←→: choose | Enter: save | Esc: cancel".to_string(),
        },
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input),
        AppMode::ExportPng => format!("Export column image as: {} (Enter to export, Esc to cancel)", app.filename_input),
        AppMode::Import => format!("Import layers from: {} (Enter to import, Esc to cancel)", app.filename_input),
        AppMode::ConfirmClear => "Clear all layers? (y to confirm, any other key to cancel)".to_string(),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Form => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ExportCsv | AppMode::ExportPng => Style::default().fg(Color::Magenta),
            AppMode::Import => Style::default().fg(Color::Green),
            AppMode::ConfirmClear => Style::default().fg(Color::Red),
        });
    f.render_widget(input, area);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_form_popup(f: &mut Frame, app: &App) {
    let area = popup_area(f.area(), 60, FormField::ALL.len() as u16 + 4);
    f.render_widget(Clear, area);

    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| {
            let focused = field == app.form.focus;
            let marker = if focused { "> " } else { "  " };
            let value = if field.is_selector() {
                format!("< {} >", app.form.value(field))
            } else {
                app.form.value(field)
            };
            let style = if focused {
                Style::default().fg(Color::Black).bg(Color::LightBlue)
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::raw(format!("{}{:<14}", marker, field.label())),
                Span::styled(value, style),
            ];
            if field == FormField::Color {
                if let Ok(rgb) = app.form.color.parse::<Rgb>() {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled("    ", Style::default().bg(terminal_color(rgb))));
                }
            }
            Line::from(spans)
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Environment: {}", crate::domain::Environment::for_lithology(app.form.lithology)),
        Style::default().fg(Color::Cyan),
    )));

    let title = match app.editing {
        Some(index) => format!("Edit Layer {}", index + 1),
        None => "Add a Stratigraphic Layer".to_string(),
    };
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(form, area);
}

fn render_confirm_popup(f: &mut Frame, app: &App) {
    let area = popup_area(f.area(), 44, 5);
    f.render_widget(Clear, area);
    let text = format!("Remove all {} layers?\n\ny: clear | any other key: keep", app.store.len());
    let widget = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Clear")
            .style(Style::default().fg(Color::Red)),
    );
    f.render_widget(widget, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("StrataSim Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"STRATASIM KEY REFERENCE

=== LAYERS ===
a               Add a layer (opens the form)
Enter/e/F2      Edit the selected layer
d / Delete      Delete the selected layer
K / Shift+↑     Move the selected layer up
J / Shift+↓     Move the selected layer down
↑↓ or j/k       Select previous/next layer
Home/End        Select first/last layer
C               Clear all layers (asks for confirmation)

=== LAYER FORM ===
Tab / ↑↓        Move between fields
← →  / Space    Choose lithology or grain size
Enter           Save the layer
Esc             Discard the form
Color           Hex colour such as #d2b48c
Thickness       Meters, at least 0.1

=== VIEWS ===
Tab             Switch between the layer table and the column
                The column stacks the newest layer at the bottom
                unless stack_order is set to oldest_at_bottom

=== ENVIRONMENT ===
Shale, Limestone            Marine
Sandstone, Conglomerate,
Siltstone                   Fluvial/Deltaic
The environment follows the lithology and cannot be edited.

=== FILES ===
Ctrl+E          Export layers to CSV (strat_data.csv)
Ctrl+P          Export the column as PNG (strat_column.png)
Ctrl+L / Ctrl+O Import layers from CSV, TSV (.tsv) or a
                spreadsheet (.xlsx, .xls, .ods; first sheet)
y               Copy the CSV export to the clipboard
                Imports need Lithology, Color, Grain Size and
                Thickness columns; Fossils and Notes are optional
                Imported layers are appended after existing ones

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window

q               Quit (layers are not saved between sessions)"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnRenderer, GrainSize, LayerFields, LayerStore, Lithology};
    use ratatui::{backend::TestBackend, Terminal};

    fn diagram(thicknesses: &[f64]) -> Diagram {
        let mut store = LayerStore::new();
        for (i, &thickness) in thicknesses.iter().enumerate() {
            store.append(LayerFields {
                lithology: Lithology::ALL[i % Lithology::ALL.len()],
                color: Rgb::new(200, 200, 200),
                grain_size: GrainSize::Fine,
                thickness,
                fossils: String::new(),
                notes: String::new(),
            });
        }
        ColumnRenderer::default().render(store.layers())
    }

    #[test]
    fn test_allocate_rows_is_proportional() {
        // Bottom block is the 1 m shale, top block the 2 m sandstone.
        let heights = allocate_rows(&diagram(&[2.0, 1.0]), 30);
        assert_eq!(heights, vec![10, 20]);
    }

    #[test]
    fn test_allocate_rows_gives_every_block_a_row() {
        let heights = allocate_rows(&diagram(&[100.0, 0.1, 0.1]), 10);
        assert_eq!(heights.iter().sum::<u16>(), 10);
        assert!(heights.iter().all(|&h| h >= 1));
    }

    #[test]
    fn test_allocate_rows_never_exceeds_available_rows() {
        // A negative thickness shrinks the total below the positive layer.
        let heights = allocate_rows(&diagram(&[5.0, -4.0]), 10);
        assert_eq!(heights.iter().sum::<u16>(), 10);
        assert!(heights.iter().all(|&h| h >= 1));

        let heights = allocate_rows(&diagram(&[5.0, -4.999]), u16::MAX);
        assert_eq!(heights.iter().map(|&h| h as u32).sum::<u32>(), u16::MAX as u32);
    }

    #[test]
    fn test_allocate_rows_with_too_few_rows() {
        assert_eq!(allocate_rows(&diagram(&[1.0, 1.0, 1.0]), 2), vec![0, 1, 1]);
        assert!(allocate_rows(&diagram(&[]), 5).is_empty());
    }

    #[test]
    fn test_column_lines_put_top_block_first() {
        let lines = column_lines(&diagram(&[2.0, 1.0]), 20, 6);
        assert_eq!(lines.len(), 6);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert!(text[..4].iter().any(|l| l.contains("Sandstone")));
        assert!(text[4..].iter().any(|l| l.contains("Shale")));
        assert!(text[0].starts_with('/'));
    }

    #[test]
    fn test_render_ui_smoke() {
        let mut app = App::default();
        app.start_add_layer();
        app.submit_form();
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| render_ui(f, &app)).unwrap();
        app.toggle_view();
        terminal.draw(|f| render_ui(f, &app)).unwrap();
        app.start_add_layer();
        terminal.draw(|f| render_ui(f, &app)).unwrap();
        app.cancel_form();
        app.mode = AppMode::Help;
        terminal.draw(|f| render_ui(f, &app)).unwrap();
    }
}
