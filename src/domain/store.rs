//! The ordered layer collection behind a session.
//!
//! Storage order is the order layers were entered. How that order maps onto
//! heights in the drawn column is decided by [`StackOrder`](super::StackOrder),
//! not here.

use super::errors::{DomainError, DomainResult};
use super::models::{ImportRecord, Layer, LayerFields, MoveDirection};
use tracing::debug;

/// An ordered, mutable sequence of layers.
///
/// Every mutator either applies completely or leaves the store untouched.
///
/// # Examples
///
/// ```
/// use stratasim::domain::{GrainSize, LayerFields, LayerStore, Lithology, MoveDirection, Rgb};
///
/// let mut store = LayerStore::new();
/// let fields = |lithology| LayerFields {
///     lithology,
///     color: Rgb::new(120, 120, 120),
///     grain_size: GrainSize::Fine,
///     thickness: 1.0,
///     fossils: String::new(),
///     notes: String::new(),
/// };
/// store.append(fields(Lithology::Sandstone));
/// store.append(fields(Lithology::Shale));
///
/// assert!(store.move_layer(1, MoveDirection::Up).unwrap());
/// assert_eq!(store.get(0).unwrap().lithology(), Lithology::Shale);
/// assert!(!store.move_layer(0, MoveDirection::Up).unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    layers: Vec<Layer>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Snapshot of the layers in storage order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    pub fn total_thickness(&self) -> f64 {
        self.layers.iter().map(Layer::thickness).sum()
    }

    /// Appends a layer and returns its index.
    ///
    /// The minimum thickness is enforced by the form, not here.
    pub fn append(&mut self, fields: LayerFields) -> usize {
        let layer = Layer::new(fields);
        debug!(
            lithology = %layer.lithology(),
            thickness = layer.thickness(),
            environment = %layer.environment(),
            "append layer"
        );
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn update(&mut self, index: usize, fields: LayerFields) -> DomainResult<()> {
        let len = self.layers.len();
        let slot = self
            .layers
            .get_mut(index)
            .ok_or(DomainError::IndexOutOfBounds { index, len })?;
        *slot = Layer::new(fields);
        debug!(index, lithology = %slot.lithology(), "update layer");
        Ok(())
    }

    /// Removes and returns the layer at `index`; later layers shift down by one.
    pub fn delete(&mut self, index: usize) -> DomainResult<Layer> {
        self.check_index(index)?;
        let removed = self.layers.remove(index);
        debug!(index, lithology = %removed.lithology(), "delete layer");
        Ok(removed)
    }

    /// Swaps the layer at `index` with its neighbour.
    ///
    /// Returns `Ok(false)` without changing anything when the neighbour does
    /// not exist (first layer moving up, last layer moving down).
    pub fn move_layer(&mut self, index: usize, direction: MoveDirection) -> DomainResult<bool> {
        self.check_index(index)?;
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&t| t < self.layers.len()),
        };
        match target {
            Some(target) => {
                self.layers.swap(index, target);
                debug!(from = index, to = target, "move layer");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear(&mut self) {
        debug!(removed = self.layers.len(), "clear layers");
        self.layers.clear();
    }

    /// Appends a batch of imported records.
    ///
    /// If any record lacks a required field the whole batch is rejected with
    /// the union of missing columns and the store is left unchanged.
    pub fn bulk_append(&mut self, records: Vec<ImportRecord>) -> DomainResult<usize> {
        let mut missing: Vec<&'static str> = Vec::new();
        for record in &records {
            for column in record.missing_columns() {
                if !missing.contains(&column) {
                    missing.push(column);
                }
            }
        }
        if !missing.is_empty() {
            missing.sort_by_key(|c| column_rank(c));
            return Err(DomainError::MissingColumns {
                columns: missing.into_iter().map(str::to_string).collect(),
            });
        }

        let batch: Vec<Layer> = records
            .into_iter()
            .filter_map(ImportRecord::into_fields)
            .map(Layer::new)
            .collect();
        let added = batch.len();
        self.layers.extend(batch);
        debug!(added, total = self.layers.len(), "bulk append");
        Ok(added)
    }

    fn check_index(&self, index: usize) -> DomainResult<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(DomainError::IndexOutOfBounds { index, len: self.layers.len() })
        }
    }
}

fn column_rank(column: &str) -> usize {
    ["Lithology", "Color", "Grain Size", "Thickness"]
        .iter()
        .position(|c| *c == column)
        .unwrap_or(usize::MAX)
}

impl<'a> IntoIterator for &'a LayerStore {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
