//! Field Enum: STENCIL_OP

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOpE {
    /// Keep the stored value
    Keep = 0,
    /// Write zero
    Zero = 1,
    /// Write the reference value
    Replace = 2,
    /// Increment, clamping at the maximum
    Incr = 3,
    /// Decrement, clamping at zero
    Decr = 4,
    /// Bitwise invert
    Invert = 5,
    /// Increment with wrap-around
    IncrWrap = 6,
    /// Decrement with wrap-around
    DecrWrap = 7,
}

impl StencilOpE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Keep),
            1 => Ok(Self::Zero),
            2 => Ok(Self::Replace),
            3 => Ok(Self::Incr),
            4 => Ok(Self::Decr),
            5 => Ok(Self::Invert),
            6 => Ok(Self::IncrWrap),
            7 => Ok(Self::DecrWrap),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
