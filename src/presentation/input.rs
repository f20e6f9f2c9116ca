use crate::application::{App, AppMode};
use crate::domain::MoveDirection;
use crate::infrastructure::{FileRepository, clipboard};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Form => Self::handle_form_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ExportCsv | AppMode::ExportPng | AppMode::Import => {
                Self::handle_filename_input_mode(app, key)
            }
            AppMode::ConfirmClear => Self::handle_confirm_clear_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('e') => {
                    app.start_csv_export();
                    return;
                }
                KeyCode::Char('p') => {
                    app.start_png_export();
                    return;
                }
                KeyCode::Char('l') | KeyCode::Char('o') => {
                    app.start_import();
                    return;
                }
                _ => {}
            }
        }

        let is_shift = modifiers.contains(KeyModifiers::SHIFT);
        app.status_message = None;

        match key {
            KeyCode::Up if is_shift => app.move_selected(MoveDirection::Up),
            KeyCode::Down if is_shift => app.move_selected(MoveDirection::Down),
            KeyCode::Char('K') => app.move_selected(MoveDirection::Up),
            KeyCode::Char('J') => app.move_selected(MoveDirection::Down),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Home => {
                if !app.store.is_empty() {
                    app.selected = Some(0);
                }
            }
            KeyCode::End => {
                if !app.store.is_empty() {
                    app.selected = Some(app.store.len() - 1);
                }
            }
            KeyCode::Char('a') => app.start_add_layer(),
            KeyCode::Enter | KeyCode::F(2) | KeyCode::Char('e') => app.start_edit_selected(),
            KeyCode::Delete | KeyCode::Char('d') => app.delete_selected(),
            KeyCode::Char('C') => app.request_clear(),
            KeyCode::Char('y') => {
                let result = clipboard::copy_csv(&app.store);
                app.set_copy_result(result);
            }
            KeyCode::Tab => app.toggle_view(),
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_form_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.submit_form(),
            KeyCode::Esc => app.cancel_form(),
            KeyCode::Tab | KeyCode::Down => app.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.form.focus_previous(),
            KeyCode::Left => app.form.cycle(false),
            KeyCode::Right => app.form.cycle(true),
            KeyCode::Char(' ') if app.form.focus.is_selector() => app.form.cycle(true),
            KeyCode::Backspace => app.form.backspace(),
            KeyCode::Char(c) => app.form.insert_char(c),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_confirm_clear_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_clear(),
            _ => app.cancel_clear(),
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => match app.mode {
                AppMode::ExportCsv => {
                    let filename = app.get_csv_export_filename();
                    let result = FileRepository::export_csv(&app.store, &filename);
                    app.set_csv_export_result(result);
                }
                AppMode::ExportPng => {
                    let filename = app.get_png_export_filename();
                    let result =
                        FileRepository::export_png(&app.store, &app.renderer, &app.rasterizer, &filename);
                    app.set_png_export_result(result);
                }
                AppMode::Import => {
                    let filename = app.get_import_filename();
                    let result = FileRepository::import_layers(&mut app.store, &filename);
                    app.set_import_result(result);
                }
                _ => {}
            },
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            KeyCode::Backspace => {
                if app.cursor_position > 0 {
                    let start = previous_boundary(&app.filename_input, app.cursor_position);
                    app.filename_input.replace_range(start..app.cursor_position, "");
                    app.cursor_position = start;
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.filename_input.len() {
                    app.filename_input.remove(app.cursor_position);
                }
            }
            KeyCode::Left => {
                app.cursor_position = previous_boundary(&app.filename_input, app.cursor_position);
            }
            KeyCode::Right => {
                if let Some(c) = app.filename_input[app.cursor_position..].chars().next() {
                    app.cursor_position += c.len_utf8();
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.len();
            }
            KeyCode::Char(c) => {
                app.filename_input.insert(app.cursor_position, c);
                app.cursor_position += c.len_utf8();
            }
            _ => {}
        }
    }
}

/// Byte index of the character boundary before `index`.
fn previous_boundary(text: &str, index: usize) -> usize {
    text[..index].char_indices().next_back().map_or(0, |(i, _)| i)
}
