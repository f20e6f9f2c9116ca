//! Column geometry.
//!
//! [`ColumnRenderer`] turns a snapshot of layers into a [`Diagram`]: a list of
//! rectangles in diagram space (unit width, heights in meters, y growing
//! upwards from 0). Rasterizing and terminal drawing both consume the same
//! diagram, so the stacking decision lives in exactly one place.

use super::models::{Layer, Lithology, Rgb};
use serde::{Deserialize, Serialize};

/// Fill texture drawn over a block's colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `////`
    Diagonal,
    /// `....`
    Dots,
    /// `----`
    Horizontal,
    /// `xxxx`
    Cross,
    /// `\\\\`
    BackDiagonal,
}

impl Pattern {
    /// Hatch string as written in the pattern table.
    pub fn hatch(self) -> &'static str {
        match self {
            Pattern::Diagonal => "////",
            Pattern::Dots => "....",
            Pattern::Horizontal => "----",
            Pattern::Cross => "xxxx",
            Pattern::BackDiagonal => "\\\\",
        }
    }

    /// Single character used when drawing the texture with terminal cells.
    pub fn glyph(self) -> char {
        match self {
            Pattern::Diagonal => '/',
            Pattern::Dots => '.',
            Pattern::Horizontal => '-',
            Pattern::Cross => 'x',
            Pattern::BackDiagonal => '\\',
        }
    }
}

/// Lithology → texture lookup. Lithologies without an entry are drawn untextured.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternTable {
    entries: Vec<(Lithology, Pattern)>,
}

impl PatternTable {
    pub fn new(entries: Vec<(Lithology, Pattern)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, lithology: Lithology) -> Option<Pattern> {
        self.entries.iter().find(|(l, _)| *l == lithology).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Lithology, Pattern)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new(vec![
            (Lithology::Sandstone, Pattern::Diagonal),
            (Lithology::Shale, Pattern::Dots),
            (Lithology::Limestone, Pattern::Horizontal),
            (Lithology::Conglomerate, Pattern::Cross),
            (Lithology::Siltstone, Pattern::BackDiagonal),
        ])
    }
}

/// Which end of the store sits at the bottom of the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackOrder {
    /// The last layer entered is drawn at height 0.
    #[default]
    NewestAtBottom,
    /// The first layer entered is drawn at height 0.
    OldestAtBottom,
}

impl StackOrder {
    /// Vertical slot of `storage_index` in a store of `len` layers, counted
    /// from the bottom (slot 0 rests at height 0).
    pub fn slot(self, storage_index: usize, len: usize) -> usize {
        match self {
            StackOrder::NewestAtBottom => len - 1 - storage_index,
            StackOrder::OldestAtBottom => storage_index,
        }
    }

    /// Storage indices in drawing order, bottom first.
    pub fn bottom_up(self, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.sort_by_key(|&i| self.slot(i, len));
        indices
    }
}

/// A filled rectangle in diagram space.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Rgb,
    pub border: Rgb,
    pub pattern: Option<Pattern>,
    pub label: String,
    /// Index of the layer this block was drawn from, if any.
    pub source: Option<usize>,
}

impl Block {
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Centre of the block, where its label is anchored.
    pub fn label_anchor(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Output-independent drawing: blocks plus the extent of diagram space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagram {
    pub width: f64,
    pub height: f64,
    pub blocks: Vec<Block>,
}

impl Diagram {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The block covering height `y`, if any. Edges belong to the block above.
    pub fn block_at(&self, y: f64) -> Option<&Block> {
        self.blocks.iter().find(|b| y >= b.y && y < b.top())
    }
}

/// Builds column and legend diagrams.
///
/// # Examples
///
/// ```
/// use stratasim::domain::{ColumnRenderer, GrainSize, LayerFields, LayerStore, Lithology, Rgb};
///
/// let mut store = LayerStore::new();
/// for (lithology, thickness) in [(Lithology::Sandstone, 2.0), (Lithology::Shale, 1.0)] {
///     store.append(LayerFields {
///         lithology,
///         color: Rgb::new(200, 180, 120),
///         grain_size: GrainSize::Medium,
///         thickness,
///         fossils: String::new(),
///         notes: String::new(),
///     });
/// }
///
/// let diagram = ColumnRenderer::default().render(store.layers());
/// assert_eq!(diagram.height, 3.0);
/// assert_eq!(diagram.block_at(0.5).unwrap().label, "Shale");
/// assert_eq!(diagram.block_at(2.0).unwrap().label, "Sandstone");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColumnRenderer {
    pub patterns: PatternTable,
    pub order: StackOrder,
}

impl ColumnRenderer {
    pub fn new(patterns: PatternTable, order: StackOrder) -> Self {
        Self { patterns, order }
    }

    /// Stacks one unit-wide block per layer. An empty slice gives an empty,
    /// zero-height diagram.
    pub fn render(&self, layers: &[Layer]) -> Diagram {
        let mut blocks = Vec::with_capacity(layers.len());
        let mut y = 0.0;
        for index in self.order.bottom_up(layers.len()) {
            let layer = &layers[index];
            blocks.push(Block {
                x: 0.0,
                y,
                width: 1.0,
                height: layer.thickness(),
                fill: layer.color(),
                border: Rgb::BLACK,
                pattern: self.patterns.get(layer.lithology()),
                label: layer.lithology().name().to_string(),
                source: Some(index),
            });
            y += layer.thickness();
        }
        Diagram { width: 1.0, height: y, blocks }
    }

    pub fn legend(&self) -> Diagram {
        legend(&self.patterns)
    }
}

/// One white, unit-sized swatch per table entry, laid out left to right.
pub fn legend(patterns: &PatternTable) -> Diagram {
    let blocks: Vec<Block> = patterns
        .iter()
        .enumerate()
        .map(|(i, (lithology, pattern))| Block {
            x: i as f64,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            fill: Rgb::WHITE,
            border: Rgb::BLACK,
            pattern: Some(pattern),
            label: lithology.name().to_string(),
            source: None,
        })
        .collect();
    Diagram {
        width: blocks.len() as f64,
        height: if blocks.is_empty() { 0.0 } else { 1.0 },
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Environment, GrainSize, LayerFields, LayerStore};
    use approx::assert_relative_eq;

    fn fields(lithology: Lithology, thickness: f64) -> LayerFields {
        LayerFields {
            lithology,
            color: Rgb::new(1, 2, 3),
            grain_size: GrainSize::Fine,
            thickness,
            fossils: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_render_empty_is_zero_height() {
        let diagram = ColumnRenderer::default().render(&[]);
        assert!(diagram.is_empty());
        assert_eq!(diagram.height, 0.0);
        assert_eq!(diagram.width, 1.0);
    }

    #[test]
    fn test_newest_layer_is_drawn_at_bottom() {
        let mut store = LayerStore::new();
        store.append(fields(Lithology::Sandstone, 2.0));
        store.append(fields(Lithology::Shale, 1.0));

        let diagram = ColumnRenderer::default().render(store.layers());
        assert_eq!(diagram.height, 3.0);

        let bottom = &diagram.blocks[0];
        assert_eq!(bottom.label, "Shale");
        assert_eq!((bottom.y, bottom.top()), (0.0, 1.0));
        assert_eq!(bottom.source, Some(1));
        assert_eq!(bottom.pattern, Some(Pattern::Dots));

        let top = &diagram.blocks[1];
        assert_eq!(top.label, "Sandstone");
        assert_eq!((top.y, top.top()), (1.0, 3.0));
        assert_eq!(top.pattern, Some(Pattern::Diagonal));

        assert_eq!(store.get(1).unwrap().environment(), Environment::Marine);
        assert_eq!(store.get(0).unwrap().environment(), Environment::FluvialDeltaic);
    }

    #[test]
    fn test_oldest_at_bottom_policy() {
        let mut store = LayerStore::new();
        store.append(fields(Lithology::Sandstone, 2.0));
        store.append(fields(Lithology::Shale, 1.0));

        let renderer = ColumnRenderer::new(PatternTable::default(), StackOrder::OldestAtBottom);
        let diagram = renderer.render(store.layers());
        assert_eq!(diagram.blocks[0].label, "Sandstone");
        assert_eq!(diagram.blocks[1].y, 2.0);
    }

    #[test]
    fn test_total_height_is_sum_of_thicknesses() {
        let mut store = LayerStore::new();
        let thicknesses = [0.1, 0.3, 2.25, 7.0, 0.15];
        for (i, t) in thicknesses.iter().enumerate() {
            store.append(fields(Lithology::ALL[i % Lithology::ALL.len()], *t));
        }
        let diagram = ColumnRenderer::default().render(store.layers());
        assert_relative_eq!(diagram.height, store.total_thickness());
        assert_relative_eq!(diagram.height, thicknesses.iter().sum::<f64>());
    }

    #[test]
    fn test_blocks_are_contiguous() {
        let mut store = LayerStore::new();
        for t in [1.5, 0.2, 3.0] {
            store.append(fields(Lithology::Limestone, t));
        }
        let diagram = ColumnRenderer::default().render(store.layers());
        for pair in diagram.blocks.windows(2) {
            assert_relative_eq!(pair[0].top(), pair[1].y);
        }
        assert!(diagram.blocks.iter().all(|b| b.width == 1.0 && b.x == 0.0));
    }

    #[test]
    fn test_label_anchor_is_centred() {
        let mut store = LayerStore::new();
        store.append(fields(Lithology::Siltstone, 4.0));
        let diagram = ColumnRenderer::default().render(store.layers());
        assert_eq!(diagram.blocks[0].label_anchor(), (0.5, 2.0));
    }

    #[test]
    fn test_missing_table_entry_means_no_texture() {
        let table = PatternTable::new(vec![(Lithology::Shale, Pattern::Dots)]);
        let renderer = ColumnRenderer::new(table, StackOrder::default());
        let mut store = LayerStore::new();
        store.append(fields(Lithology::Conglomerate, 1.0));

        let diagram = renderer.render(store.layers());
        assert_eq!(diagram.blocks[0].pattern, None);
    }

    #[test]
    fn test_legend_has_one_swatch_per_entry() {
        let diagram = legend(&PatternTable::default());
        assert_eq!(diagram.blocks.len(), 5);
        assert_eq!(diagram.width, 5.0);
        assert_eq!(diagram.height, 1.0);
        assert_eq!(diagram.blocks[4].label, "Siltstone");
        assert_eq!(diagram.blocks[4].pattern.map(Pattern::hatch), Some("\\\\"));
        assert!(diagram.blocks.iter().all(|b| b.fill == Rgb::WHITE && b.source.is_none()));
    }

    #[test]
    fn test_stack_order_slots() {
        assert_eq!(StackOrder::NewestAtBottom.bottom_up(3), vec![2, 1, 0]);
        assert_eq!(StackOrder::OldestAtBottom.bottom_up(3), vec![0, 1, 2]);
        assert_eq!(StackOrder::NewestAtBottom.slot(0, 3), 2);
        assert!(StackOrder::NewestAtBottom.bottom_up(0).is_empty());
    }
}
