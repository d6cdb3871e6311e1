//! Field Enum: COMPARE_OP

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOpE {
    /// Never pass
    Never = 0,
    /// Less than (<)
    Less = 1,
    /// Equal (=)
    Equal = 2,
    /// Less than or equal (<=)
    LessOrEqual = 3,
    /// Greater than (>)
    Greater = 4,
    /// Not equal (!=)
    NotEqual = 5,
    /// Greater than or equal (>=)
    GreaterOrEqual = 6,
    /// Always pass
    Always = 7,
}

impl CompareOpE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Never),
            1 => Ok(Self::Less),
            2 => Ok(Self::Equal),
            3 => Ok(Self::LessOrEqual),
            4 => Ok(Self::Greater),
            5 => Ok(Self::NotEqual),
            6 => Ok(Self::GreaterOrEqual),
            7 => Ok(Self::Always),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
