use super::raster::PngRasterizer;
use super::tabular::CsvExporter;
use crate::domain::{ColumnRenderer, DomainResult, LayerStore};
use std::fs;
use std::path::Path;
use tracing::info;

/// File-system side of exports and imports. Returns the path written or read
/// so callers can report it.
pub struct FileRepository;

impl FileRepository {
    pub fn export_csv(store: &LayerStore, filename: &str) -> DomainResult<String> {
        let bytes = CsvExporter::to_csv(store.layers())?;
        fs::write(filename, bytes)?;
        info!(path = filename, layers = store.len(), "exported csv");
        Ok(filename.to_string())
    }

    pub fn export_png(
        store: &LayerStore,
        renderer: &ColumnRenderer,
        rasterizer: &PngRasterizer,
        filename: &str,
    ) -> DomainResult<String> {
        let bytes = rasterizer.to_png(&renderer.render(store.layers()))?;
        fs::write(filename, bytes)?;
        info!(path = filename, layers = store.len(), "exported png");
        Ok(filename.to_string())
    }

    /// Imports `filename` into `store`. The store is untouched on any error.
    pub fn import_layers(store: &mut LayerStore, filename: &str) -> DomainResult<usize> {
        let records = CsvExporter::import_from_file(Path::new(filename))?;
        let added = store.bulk_append(records)?;
        info!(path = filename, added, "imported layers");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, GrainSize, LayerFields, Lithology, Rgb};

    fn store() -> LayerStore {
        let mut store = LayerStore::new();
        store.append(LayerFields {
            lithology: Lithology::Conglomerate,
            color: Rgb::new(150, 120, 90),
            grain_size: GrainSize::Coarse,
            thickness: 1.25,
            fossils: String::new(),
            notes: "Clast supported".to_string(),
        });
        store
    }

    #[test]
    fn test_csv_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strat_data.csv");
        let path = path.to_str().unwrap();

        let original = store();
        assert_eq!(FileRepository::export_csv(&original, path).unwrap(), path);

        let mut restored = LayerStore::new();
        assert_eq!(FileRepository::import_layers(&mut restored, path).unwrap(), 1);
        assert_eq!(restored, original);
    }

    #[test]
    fn test_png_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strat_column.png");
        let path = path.to_str().unwrap();

        FileRepository::export_png(
            &store(),
            &ColumnRenderer::default(),
            &PngRasterizer::default(),
            path,
        )
        .unwrap();
        let written = fs::read(path).unwrap();
        assert_eq!(&written[1..4], b"PNG");
    }

    #[test]
    fn test_png_export_of_empty_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let err = FileRepository::export_png(
            &LayerStore::new(),
            &ColumnRenderer::default(),
            &PngRasterizer::default(),
            path.to_str().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NothingToExport));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_import_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Lithology,Color\nShale,#000000\n").unwrap();

        let mut target = store();
        let err = FileRepository::import_layers(&mut target, path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DomainError::MissingColumns { .. }));
        assert_eq!(target, store());
    }
}
