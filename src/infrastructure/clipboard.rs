use super::tabular::CsvExporter;
use crate::domain::{DomainError, DomainResult, LayerStore};
use tracing::info;

/// Places the CSV export of `store` on the system clipboard.
pub fn copy_csv(store: &LayerStore) -> DomainResult<usize> {
    let bytes = CsvExporter::to_csv(store.layers())?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| DomainError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| DomainError::Clipboard(e.to_string()))?;
    info!(layers = store.len(), "copied csv to clipboard");
    Ok(store.len())
}
