//! Field Enum: BLEND_FACTOR

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactorE {
    /// 0
    Zero = 0,
    /// 1
    One = 1,
    /// Source color
    SrcColor = 2,
    /// 1 - source color
    OneMinusSrcColor = 3,
    /// Destination color
    DstColor = 4,
    /// 1 - destination color
    OneMinusDstColor = 5,
    /// Source alpha
    SrcAlpha = 6,
    /// 1 - source alpha
    OneMinusSrcAlpha = 7,
    /// Destination alpha
    DstAlpha = 8,
    /// 1 - destination alpha
    OneMinusDstAlpha = 9,
}

impl BlendFactorE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            2 => Ok(Self::SrcColor),
            3 => Ok(Self::OneMinusSrcColor),
            4 => Ok(Self::DstColor),
            5 => Ok(Self::OneMinusDstColor),
            6 => Ok(Self::SrcAlpha),
            7 => Ok(Self::OneMinusSrcAlpha),
            8 => Ok(Self::DstAlpha),
            9 => Ok(Self::OneMinusDstAlpha),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
