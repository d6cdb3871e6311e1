//! Field Enum: BLEND_OP

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOpE {
    /// src + dst
    Add = 0,
    /// src - dst
    Subtract = 1,
    /// dst - src
    ReverseSubtract = 2,
    /// min(src, dst)
    Min = 3,
    /// max(src, dst)
    Max = 4,
}

impl BlendOpE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Add),
            1 => Ok(Self::Subtract),
            2 => Ok(Self::ReverseSubtract),
            3 => Ok(Self::Min),
            4 => Ok(Self::Max),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
