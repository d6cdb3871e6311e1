//! Field Enum: PRIMITIVE_TYPE

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTypeE {
    /// Assembled points
    Points = 0,
    /// Assembled lines
    Lines = 1,
    /// Assembled triangles
    Triangles = 2,
}

impl PrimitiveTypeE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Points),
            1 => Ok(Self::Lines),
            2 => Ok(Self::Triangles),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
