//! Responsive variant definitions
//!
//! A variant is a labelled target width; the generator renders one JPEG per
//! variant next to the source stem (`photo-small.jpg`, `photo-medium.jpg`, ...).

use serde::{Deserialize, Serialize};

use crate::error::{Result, WebimizeError};

/// Built-in variant set: (label, width)
const DEFAULT_VARIANT_WIDTHS: [(&str, u32); 3] =
    [("small", 400), ("medium", 800), ("large", 1200)];

/// Characters that would break the `{stem}-{label}.jpg` output name
const INVALID_LABEL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// A single responsive variant: a label and its target width
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Label used in the output file name
    pub label: String,

    /// Maximum output width in pixels
    pub width: u32,
}

impl Variant {
    pub fn new<S: Into<String>>(label: S, width: u32) -> Self {
        Self {
            label: label.into(),
            width,
        }
    }
}

/// A validated, non-empty set of variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec(Vec<Variant>);

impl Default for VariantSpec {
    fn default() -> Self {
        Self(
            DEFAULT_VARIANT_WIDTHS
                .iter()
                .map(|&(label, width)| Variant::new(label, width))
                .collect(),
        )
    }
}

impl VariantSpec {
    /// Build a spec from a list of variants, rejecting empty sets, zero
    /// widths, and duplicate or unusable labels
    pub fn new(variants: Vec<Variant>) -> Result<Self> {
        if variants.is_empty() {
            return Err(WebimizeError::invalid_parameters(
                "variant spec must contain at least one variant",
            ));
        }

        for variant in &variants {
            if variant.label.is_empty() {
                return Err(WebimizeError::invalid_parameters(
                    "variant label cannot be empty",
                ));
            }
            if variant.label.contains(&INVALID_LABEL_CHARS[..]) {
                return Err(WebimizeError::invalid_parameters(format!(
                    "variant label '{}' contains invalid characters",
                    variant.label
                )));
            }
            if variant.width == 0 {
                return Err(WebimizeError::invalid_parameters(format!(
                    "variant '{}' width must be greater than 0",
                    variant.label
                )));
            }
        }

        for (i, variant) in variants.iter().enumerate() {
            if variants[i + 1..].iter().any(|v| v.label == variant.label) {
                return Err(WebimizeError::invalid_parameters(format!(
                    "duplicate variant label '{}'",
                    variant.label
                )));
            }
        }

        Ok(Self(variants))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a VariantSpec {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
