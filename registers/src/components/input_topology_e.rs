//! Field Enum: INPUT_TOPOLOGY

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTopologyE {
    /// Independent points
    PointList = 0,
    /// Independent line segments
    LineList = 1,
    /// Connected line segments
    LineStrip = 2,
    /// Independent triangles
    TriangleList = 3,
    /// Triangle strip
    TriangleStrip = 4,
    /// Triangle fan around the first vertex
    TriangleFan = 5,
    /// Line list with adjacency
    LineListAdjacency = 6,
    /// Line strip with adjacency
    LineStripAdjacency = 7,
    /// Triangle list with adjacency
    TriangleListAdjacency = 8,
    /// Triangle strip with adjacency
    TriangleStripAdjacency = 9,
    /// Patch list
    PatchList = 10,
}

impl InputTopologyE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::PointList),
            1 => Ok(Self::LineList),
            2 => Ok(Self::LineStrip),
            3 => Ok(Self::TriangleList),
            4 => Ok(Self::TriangleStrip),
            5 => Ok(Self::TriangleFan),
            6 => Ok(Self::LineListAdjacency),
            7 => Ok(Self::LineStripAdjacency),
            8 => Ok(Self::TriangleListAdjacency),
            9 => Ok(Self::TriangleStripAdjacency),
            10 => Ok(Self::PatchList),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}
