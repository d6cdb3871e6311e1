//! Field Enum: CULL_FACE

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFaceE {
    /// No culling (draw all triangles)
    None = 0,
    /// Cull front-facing triangles
    Front = 1,
    /// Cull back-facing triangles
    Back = 2,
    /// Cull every triangle
    FrontAndBack = 3,
}

impl CullFaceE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::None),
            1 => Ok(Self::Front),
            2 => Ok(Self::Back),
            3 => Ok(Self::FrontAndBack),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
