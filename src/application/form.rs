//! The add/edit layer form.

use crate::domain::{
    DomainError, DomainResult, GrainSize, Layer, LayerFields, Lithology, MIN_THICKNESS, Rgb,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Lithology,
    Color,
    GrainSize,
    Thickness,
    Fossils,
    Notes,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Lithology,
        FormField::Color,
        FormField::GrainSize,
        FormField::Thickness,
        FormField::Fossils,
        FormField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Lithology => "Lithology",
            FormField::Color => "Color",
            FormField::GrainSize => "Grain Size",
            FormField::Thickness => "Thickness (m)",
            FormField::Fossils => "Fossils",
            FormField::Notes => "Notes",
        }
    }

    /// Selector fields are changed with left/right instead of typing.
    pub fn is_selector(self) -> bool {
        matches!(self, FormField::Lithology | FormField::GrainSize)
    }
}

/// Input state of the layer form. Text fields keep the raw input so that
/// invalid entries can be corrected in place.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerForm {
    pub lithology: Lithology,
    pub color: String,
    pub grain_size: GrainSize,
    pub thickness: String,
    pub fossils: String,
    pub notes: String,
    pub focus: FormField,
}

impl Default for LayerForm {
    fn default() -> Self {
        Self {
            lithology: Lithology::Sandstone,
            color: Rgb::BLACK.to_string(),
            grain_size: GrainSize::Fine,
            thickness: MIN_THICKNESS.to_string(),
            fossils: String::new(),
            notes: String::new(),
            focus: FormField::Lithology,
        }
    }
}

impl LayerForm {
    /// Form pre-filled from an existing layer, for editing.
    pub fn from_layer(layer: &Layer) -> Self {
        Self {
            lithology: layer.lithology(),
            color: layer.color().to_string(),
            grain_size: layer.grain_size(),
            thickness: layer.thickness().to_string(),
            fossils: layer.fossils().to_string(),
            notes: layer.notes().to_string(),
            focus: FormField::Lithology,
        }
    }

    pub fn focus_next(&mut self) {
        let i = FormField::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FormField::ALL[(i + 1) % FormField::ALL.len()];
    }

    pub fn focus_previous(&mut self) {
        let i = FormField::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FormField::ALL[(i + FormField::ALL.len() - 1) % FormField::ALL.len()];
    }

    /// Steps the focused selector forward or backward; no effect on text fields.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Lithology => {
                self.lithology = if forward { self.lithology.next() } else { self.lithology.previous() };
            }
            FormField::GrainSize => {
                self.grain_size = if forward { self.grain_size.next() } else { self.grain_size.previous() };
            }
            _ => {}
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Color => Some(&mut self.color),
            FormField::Thickness => Some(&mut self.thickness),
            FormField::Fossils => Some(&mut self.fossils),
            FormField::Notes => Some(&mut self.notes),
            FormField::Lithology | FormField::GrainSize => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(text) = self.focused_text() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Display value of `field`.
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Lithology => self.lithology.to_string(),
            FormField::Color => self.color.clone(),
            FormField::GrainSize => self.grain_size.to_string(),
            FormField::Thickness => self.thickness.clone(),
            FormField::Fossils => self.fossils.clone(),
            FormField::Notes => self.notes.clone(),
        }
    }

    /// Validates the input and produces layer fields.
    pub fn submit(&self) -> DomainResult<LayerFields> {
        let color: Rgb = self.color.parse().map_err(|reason| DomainError::InvalidField {
            field: "color",
            reason,
        })?;
        let thickness: f64 = self
            .thickness
            .trim()
            .parse()
            .ok()
            .filter(|t: &f64| t.is_finite())
            .ok_or_else(|| DomainError::InvalidField {
                field: "thickness",
                reason: format!("'{}' is not a number", self.thickness.trim()),
            })?;
        if thickness < MIN_THICKNESS {
            return Err(DomainError::ThicknessBelowMinimum { value: thickness, minimum: MIN_THICKNESS });
        }
        Ok(LayerFields {
            lithology: self.lithology,
            color,
            grain_size: self.grain_size,
            thickness,
            fossils: self.fossils.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}
