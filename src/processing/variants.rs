//! Responsive variant generation

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{OptimizeOptions, Variant, VariantSpec, DEFAULT_QUALITY};
use crate::error::{Result, WebimizeError};
use crate::processing::formats::OUTPUT_EXTENSION;
use crate::processing::{OptimizeReport, Optimizer};

/// One attempted variant: the target and its per-variant result
#[derive(Debug)]
pub struct VariantOutcome {
    pub variant: Variant,
    pub dest: PathBuf,
    pub result: Result<OptimizeReport>,
}

impl VariantOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Renders one JPEG per variant in a [`VariantSpec`]
///
/// Variants are independent: a failure on one width is recorded in its
/// outcome and the remaining widths are still attempted. The source is
/// re-decoded per variant rather than decoded once and cloned, trading CPU
/// for a flat memory profile on large inputs.
#[derive(Debug, Clone)]
pub struct VariantGenerator {
    optimizer: Optimizer,
    spec: VariantSpec,
    quality: u8,
}

impl Default for VariantGenerator {
    fn default() -> Self {
        Self::new(VariantSpec::default())
    }
}

impl VariantGenerator {
    pub fn new(spec: VariantSpec) -> Self {
        Self {
            optimizer: Optimizer::new(),
            spec,
            quality: DEFAULT_QUALITY,
        }
    }

    /// Override the JPEG encode quality used for every variant
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Generate every variant of `source` into `out_dir`
    ///
    /// Output names follow `<file-stem>-<label>.jpg`. The returned outer
    /// `Result` covers pre-flight failures only (missing source, a name with
    /// no stem); each variant carries its own result.
    pub fn generate(&self, source: &Path, out_dir: &Path) -> Result<Vec<VariantOutcome>> {
        if !source.exists() {
            return Err(WebimizeError::not_found(source));
        }

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                WebimizeError::invalid_parameters(format!(
                    "cannot derive variant names from {}",
                    source.display()
                ))
            })?;

        let mut outcomes = Vec::with_capacity(self.spec.len());
        for variant in &self.spec {
            let dest = out_dir.join(format!("{stem}-{}.{OUTPUT_EXTENSION}", variant.label));
            let options = OptimizeOptions::new(variant.width, self.quality);

            let result = self.optimizer.optimize(source, &dest, &options);
            if let Err(e) = &result {
                warn!(
                    source = %source.display(),
                    variant = %variant.label,
                    error = %e,
                    "variant failed"
                );
            }

            outcomes.push(VariantOutcome {
                variant: variant.clone(),
                dest,
                result,
            });
        }

        Ok(outcomes)
    }
}
