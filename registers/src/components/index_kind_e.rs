//! Field Enum: INDEX_KIND

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKindE {
    /// Vertices are generated sequentially, no index fetch
    NotIndexed = 0,
    /// 8-bit unsigned indices
    U8 = 1,
    /// 16-bit unsigned indices
    U16 = 2,
    /// 32-bit unsigned indices
    U32 = 3,
}

impl IndexKindE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::NotIndexed),
            1 => Ok(Self::U8),
            2 => Ok(Self::U16),
            3 => Ok(Self::U32),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
