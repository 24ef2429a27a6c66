//! Packing of a fitted table into two RGBA textures.
use crate::{FitError, FitTable};
use base::math::Vec4;
use half::f16;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Floating point format of the exported textures.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatFormat {
    /// Half precision, 8 bytes per texel.
    #[default]
    #[cfg_attr(feature = "cli", clap(alias = "half"))]
    F16,
    /// Single precision, 16 bytes per texel.
    #[cfg_attr(feature = "cli", clap(alias = "float"))]
    F32,
}

impl FloatFormat {
    /// Returns the size in bytes of one texel.
    pub const fn texel_size(&self) -> usize {
        match self {
            FloatFormat::F16 => 8,
            FloatFormat::F32 => 16,
        }
    }
}

impl Display for FloatFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FloatFormat::F16 => f.write_str("f16"),
            FloatFormat::F32 => f.write_str("f32"),
        }
    }
}

/// Look-up table ready to be uploaded as two `size x size` RGBA textures,
/// roughness along x and view angle along y.
#[derive(Debug, Clone, PartialEq)]
pub struct LtcLut {
    /// Number of texels along each axis.
    pub size: usize,
    /// The four varying coefficients of the normalised inverse transform.
    pub ltc_1: Box<[Vec4]>,
    /// Magnitude, Fresnel weight, unused, horizon clipping factor.
    pub ltc_2: Box<[Vec4]>,
}

impl LtcLut {
    /// Packs a fitted table together with the horizon clipping table.
    ///
    /// The inverse transform is divided by its middle coefficient, after
    /// which only the four corner coefficients vary.
    ///
    /// # Arguments
    ///
    /// * `table` - The fitted LTC table.
    /// * `sphere` - The horizon clipping table of the same size, see
    ///   [`crate::gen_sphere_table`].
    pub fn pack(table: &FitTable, sphere: &[f32]) -> Result<Self, FitError> {
        let n = table.size();
        if sphere.len() != n * n {
            return Err(FitError::TableSizeMismatch {
                expected: n * n,
                found: sphere.len(),
            });
        }
        let mut ltc_1 = Vec::with_capacity(n * n);
        let mut ltc_2 = Vec::with_capacity(n * n);
        for (i, (m, mf)) in table
            .matrices()
            .iter()
            .zip(table.magnitudes_fresnels())
            .enumerate()
        {
            let inv = m.inverse();
            let inv = inv.mul_scalar(1.0 / inv.y_axis.y);
            if !inv.is_finite() {
                return Err(FitError::DegenerateCell {
                    roughness_index: i % n,
                    view_index: i / n,
                });
            }
            ltc_1.push(Vec4::new(inv.x_axis.x, inv.x_axis.z, inv.z_axis.x, inv.z_axis.z));
            ltc_2.push(Vec4::new(mf.x, mf.y, 0.0, sphere[i]));
        }
        Ok(Self {
            size: n,
            ltc_1: ltc_1.into_boxed_slice(),
            ltc_2: ltc_2.into_boxed_slice(),
        })
    }

    /// Returns the texels of both textures as little-endian bytes.
    pub fn to_bytes(&self, format: FloatFormat) -> (Vec<u8>, Vec<u8>) {
        match format {
            FloatFormat::F16 => (to_f16_bytes(&self.ltc_1), to_f16_bytes(&self.ltc_2)),
            FloatFormat::F32 => (to_f32_bytes(&self.ltc_1), to_f32_bytes(&self.ltc_2)),
        }
    }
}

fn to_f32_bytes(texels: &[Vec4]) -> Vec<u8> {
    let words = texels
        .iter()
        .flat_map(|v| v.to_array())
        .map(|x| x.to_bits().to_le())
        .collect::<Vec<u32>>();
    bytemuck::cast_slice(&words).to_vec()
}

fn to_f16_bytes(texels: &[Vec4]) -> Vec<u8> {
    let halves = texels
        .iter()
        .flat_map(|v| v.to_array())
        .map(|x| f16::from_f32(x).to_bits().to_le())
        .collect::<Vec<u16>>();
    bytemuck::cast_slice(&halves).to_vec()
}
