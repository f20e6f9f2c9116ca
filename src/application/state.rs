//! Session state for the stratigraphic column editor.
//!
//! `App` owns the layer store for one session together with the UI-only
//! state (selection, mode, prompts). File and clipboard work happens in the
//! presentation layer, which hands the outcome back through the
//! `set_*_result` methods.

use super::config::AppConfig;
use super::form::LayerForm;
use crate::domain::{ColumnRenderer, Diagram, DomainError, LayerStore, MoveDirection, PatternTable};
use crate::infrastructure::PngRasterizer;
use tracing::{info, warn};

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Table navigation and shortcuts.
    Normal,
    /// The layer form is open.
    Form,
    Help,
    ExportCsv,
    ExportPng,
    Import,
    /// Waiting for y/n before clearing every layer.
    ConfirmClear,
}

/// Which main pane is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Layers,
    Column,
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use stratasim::application::{App, AppMode};
///
/// let mut app = App::default();
/// app.start_add_layer();
/// assert_eq!(app.mode, AppMode::Form);
/// app.submit_form();
/// assert_eq!(app.store.len(), 1);
/// assert_eq!(app.selected, Some(0));
/// ```
#[derive(Debug)]
pub struct App {
    /// Layers of this session.
    pub store: LayerStore,
    pub config: AppConfig,
    pub renderer: ColumnRenderer,
    pub rasterizer: PngRasterizer,
    /// Selected layer index, used by edit/delete/move.
    pub selected: Option<usize>,
    pub view: View,
    pub mode: AppMode,
    pub form: LayerForm,
    /// Index being edited while the form is open; `None` when adding.
    pub editing: Option<usize>,
    /// Input buffer for filename prompts
    pub filename_input: String,
    pub cursor_position: usize,
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(LayerStore::new(), AppConfig::default())
    }
}

impl App {
    pub fn new(store: LayerStore, config: AppConfig) -> Self {
        let renderer = ColumnRenderer::new(PatternTable::default(), config.stack_order);
        let rasterizer = PngRasterizer::new(config.png.clone());
        let selected = if store.is_empty() { None } else { Some(0) };
        Self {
            store,
            config,
            renderer,
            rasterizer,
            selected,
            view: View::Layers,
            mode: AppMode::Normal,
            form: LayerForm::default(),
            editing: None,
            filename_input: String::new(),
            cursor_position: 0,
            help_scroll: 0,
            status_message: None,
        }
    }

    /// Column diagram of the current layers.
    pub fn diagram(&self) -> Diagram {
        self.renderer.render(self.store.layers())
    }

    pub fn legend(&self) -> Diagram {
        self.renderer.legend()
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Layers => View::Column,
            View::Column => View::Layers,
        };
    }

    pub fn select_next(&mut self) {
        if self.store.is_empty() {
            self.selected = None;
            return;
        }
        let last = self.store.len() - 1;
        self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
    }

    pub fn select_previous(&mut self) {
        if self.store.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Keeps the selection inside the store after it shrank.
    fn clamp_selection(&mut self) {
        self.selected = match (self.selected, self.store.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
    }

    pub fn start_add_layer(&mut self) {
        self.form = LayerForm::default();
        self.editing = None;
        self.mode = AppMode::Form;
        self.status_message = None;
    }

    /// Opens the form on the selected layer. Does nothing without a selection.
    pub fn start_edit_selected(&mut self) {
        let Some(index) = self.selected else {
            self.status_message = Some("Select a layer first.".to_string());
            return;
        };
        let Some(layer) = self.store.get(index) else {
            return;
        };
        self.form = LayerForm::from_layer(layer);
        self.editing = Some(index);
        self.mode = AppMode::Form;
        self.status_message = None;
    }

    /// Applies the form. On a validation error the form stays open with the
    /// error in the status line.
    pub fn submit_form(&mut self) {
        let fields = match self.form.submit() {
            Ok(fields) => fields,
            Err(e) => {
                warn!(error = %e, "form rejected");
                self.status_message = Some(e.to_string());
                return;
            }
        };

        match self.editing {
            Some(index) => match self.store.update(index, fields) {
                Ok(()) => {
                    info!(index, "layer updated");
                    self.status_message = Some("Layer updated successfully!".to_string());
                }
                Err(e) => self.report_error("Update failed", &e),
            },
            None => {
                let index = self.store.append(fields);
                info!(index, "layer added");
                self.selected = Some(index);
                self.status_message = Some("Layer added successfully!".to_string());
            }
        }
        self.close_form();
    }

    pub fn cancel_form(&mut self) {
        self.close_form();
        self.status_message = None;
    }

    fn close_form(&mut self) {
        self.mode = AppMode::Normal;
        self.editing = None;
        self.form = LayerForm::default();
    }

    pub fn delete_selected(&mut self) {
        let Some(index) = self.selected else {
            self.status_message = Some("Select a layer first.".to_string());
            return;
        };
        match self.store.delete(index) {
            Ok(layer) => {
                info!(index, lithology = %layer.lithology(), "layer deleted");
                self.status_message = Some(format!("Deleted {} layer.", layer.lithology()));
            }
            Err(e) => self.report_error("Delete failed", &e),
        }
        self.clamp_selection();
    }

    /// Moves the selected layer; the selection follows it.
    pub fn move_selected(&mut self, direction: MoveDirection) {
        let Some(index) = self.selected else {
            return;
        };
        match self.store.move_layer(index, direction) {
            Ok(true) => {
                self.selected = Some(match direction {
                    MoveDirection::Up => index - 1,
                    MoveDirection::Down => index + 1,
                });
            }
            Ok(false) => {}
            Err(e) => self.report_error("Move failed", &e),
        }
    }

    pub fn request_clear(&mut self) {
        if self.store.is_empty() {
            self.status_message = Some("No layers to clear.".to_string());
            return;
        }
        self.mode = AppMode::ConfirmClear;
    }

    pub fn confirm_clear(&mut self) {
        let removed = self.store.len();
        self.store.clear();
        self.selected = None;
        self.mode = AppMode::Normal;
        info!(removed, "layers cleared");
        self.status_message = Some(format!("Cleared {} layers.", removed));
    }

    pub fn cancel_clear(&mut self) {
        self.mode = AppMode::Normal;
    }

    fn start_filename_input(&mut self, mode: AppMode, default: String) {
        self.mode = mode;
        self.filename_input = default;
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    fn finish_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// The typed filename, or `default` when the prompt was emptied.
    fn prompt_filename(&self, default: &str) -> String {
        if self.filename_input.trim().is_empty() {
            default.to_string()
        } else {
            self.filename_input.trim().to_string()
        }
    }

    pub fn start_csv_export(&mut self) {
        if self.store.is_empty() {
            self.status_message = Some(DomainError::NothingToExport.to_string());
            return;
        }
        let default = self.config.csv_filename.clone();
        self.start_filename_input(AppMode::ExportCsv, default);
    }

    pub fn get_csv_export_filename(&self) -> String {
        self.prompt_filename(&self.config.csv_filename)
    }

    pub fn set_csv_export_result(&mut self, result: Result<String, DomainError>) {
        self.status_message = Some(match result {
            Ok(filename) => format!("Exported CSV to {}", filename),
            Err(e) => {
                warn!(error = %e, "csv export failed");
                format!("Export failed: {}", e)
            }
        });
        self.finish_filename_input();
    }

    pub fn start_png_export(&mut self) {
        if self.store.is_empty() {
            self.status_message = Some(DomainError::NothingToExport.to_string());
            return;
        }
        let default = self.config.png_filename.clone();
        self.start_filename_input(AppMode::ExportPng, default);
    }

    pub fn get_png_export_filename(&self) -> String {
        self.prompt_filename(&self.config.png_filename)
    }

    pub fn set_png_export_result(&mut self, result: Result<String, DomainError>) {
        self.status_message = Some(match result {
            Ok(filename) => format!("Exported column image to {}", filename),
            Err(e) => {
                warn!(error = %e, "png export failed");
                format!("Export failed: {}", e)
            }
        });
        self.finish_filename_input();
    }

    pub fn start_import(&mut self) {
        let default = self.config.import_filename.clone();
        self.start_filename_input(AppMode::Import, default);
    }

    pub fn get_import_filename(&self) -> String {
        self.prompt_filename(&self.config.import_filename)
    }

    /// Processes the result of an import. The store has already been updated
    /// (or left alone on error) by the caller.
    pub fn set_import_result(&mut self, result: Result<usize, DomainError>) {
        match result {
            Ok(added) => {
                self.status_message = Some(format!("Layers added from uploaded file ({} rows).", added));
                self.clamp_selection();
            }
            Err(e) => {
                warn!(error = %e, "import failed");
                self.status_message = Some(format!("Import failed: {}", e));
            }
        }
        self.finish_filename_input();
    }

    pub fn set_copy_result(&mut self, result: Result<usize, DomainError>) {
        self.status_message = Some(match result {
            Ok(count) => format!("Copied {} layers to the clipboard as CSV.", count),
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                format!("Copy failed: {}", e)
            }
        });
    }

    fn report_error(&mut self, action: &str, error: &DomainError) {
        warn!(action, error = %error, kind = ?error.kind(), "action failed");
        self.status_message = Some(format!("{}: {}", action, error));
    }
}
