//! Full-integer int8 calibration and firmware export.
//!
//! The on-device models take int8 inputs. Calibration derives one affine
//! mapping `q = round(x / scale) + zero_point` from a representative slice
//! of the training data.

use std::fmt::Write as _;

use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Representative samples used for calibration.
pub const MAX_REPRESENTATIVE_SAMPLES: usize = 100;

/// Hex bytes per line in an exported header.
const HEADER_BYTES_PER_LINE: usize = 12;

/// Affine int8 quantisation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantParams {
    pub scale: f32,
    pub zero_point: i32,
    pub min: f32,
    pub max: f32,
}

impl QuantParams {
    /// Derive parameters covering `[min, max]` with the 256 int8 levels.
    ///
    /// A degenerate range uses a unit scale. The zero point is not clamped to
    /// int8, so ranges that exclude zero still place `min` at -128.
    pub fn from_range(min: f32, max: f32) -> Result<Self, PipelineError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(PipelineError::InvalidInput(format!(
                "invalid calibration range [{min}, {max}]"
            )));
        }
        let span = max - min;
        let scale = if span > 0.0 { span / 255.0 } else { 1.0 };
        let zero_point = (-128.0 - min / scale).round() as i32;
        Ok(Self {
            scale,
            zero_point,
            min,
            max,
        })
    }

    pub fn quantize(&self, x: f32) -> i8 {
        ((x / self.scale).round() + self.zero_point as f32).clamp(-128.0, 127.0) as i8
    }

    pub fn dequantize(&self, q: i8) -> f32 {
        (i32::from(q) - self.zero_point) as f32 * self.scale
    }

    pub fn quantize_all(&self, values: &ArrayD<f32>) -> ArrayD<i8> {
        values.mapv(|x| self.quantize(x))
    }
}

/// Calibrate from the first [`MAX_REPRESENTATIVE_SAMPLES`] rows of `data`.
pub fn calibrate(data: &ArrayD<f32>) -> Result<QuantParams, PipelineError> {
    if data.ndim() == 0 || data.len_of(Axis(0)) == 0 {
        return Err(PipelineError::InvalidInput(
            "calibration needs at least one sample".to_string(),
        ));
    }
    let rows = data.len_of(Axis(0)).min(MAX_REPRESENTATIVE_SAMPLES);
    let representative = data.slice_axis(Axis(0), (0..rows).into());

    let (min, max) = representative
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    QuantParams::from_range(min, max)
}

/// Largest absolute error after a quantise / dequantise round trip.
pub fn max_round_trip_error(params: &QuantParams, data: &ArrayD<f32>) -> f32 {
    data.iter()
        .map(|&x| (params.dequantize(params.quantize(x)) - x).abs())
        .fold(0.0, f32::max)
}

/// Render a binary blob as a C array header for the firmware build.
///
/// `name` becomes the array identifier; non-identifier characters are
/// replaced with `_`.
pub fn c_header(bytes: &[u8], name: &str) -> String {
    let ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let ident = if ident.starts_with(|c: char| c.is_ascii_digit()) || ident.is_empty() {
        format!("_{ident}")
    } else {
        ident
    };
    let guard = format!("{}_H", ident.to_uppercase());

    let mut out = String::new();
    let _ = writeln!(out, "// Auto-generated model data");
    let _ = writeln!(out, "// Model size: {} bytes", bytes.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "#ifndef {guard}");
    let _ = writeln!(out, "#define {guard}");
    let _ = writeln!(out);
    let _ = writeln!(out, "const unsigned char {ident}[] = {{");
    for chunk in bytes.chunks(HEADER_BYTES_PER_LINE) {
        let line: Vec<String> = chunk.iter().map(|b| format!("0x{b:02x}")).collect();
        let _ = writeln!(out, "  {},", line.join(", "));
    }
    let _ = writeln!(out, "}};");
    let _ = writeln!(out, "const unsigned int {ident}_len = {};", bytes.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "#endif  // {guard}");
    out
}
