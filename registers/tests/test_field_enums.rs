//! Bit-pattern coverage for the field enums.

use pixelforge_registers::{
    BlendFactorE, BlendOpE, CompareOpE, CullFaceE, IndexKindE, InputTopologyE, StencilOpE,
};

#[test]
fn test_compare_op_round_trip() {
    for bits in 0..8u8 {
        let op = CompareOpE::from_bits(bits).expect("all 3-bit patterns are valid");
        assert_eq!(op.bits(), bits);
    }
    assert!(CompareOpE::from_bits(8).is_err());
}

#[test]
fn test_stencil_op_round_trip() {
    for bits in 0..8u8 {
        let op = StencilOpE::from_bits(bits).expect("all 3-bit patterns are valid");
        assert_eq!(op.bits(), bits);
    }
    assert_eq!(StencilOpE::from_bits(9).unwrap_err().bits(), 9);
}

#[test]
fn test_encodings_match_hardware() {
    assert_eq!(CompareOpE::LessOrEqual.bits(), 3);
    assert_eq!(CompareOpE::Always.bits(), 7);
    assert_eq!(StencilOpE::IncrWrap.bits(), 6);
    assert_eq!(BlendFactorE::OneMinusSrcAlpha.bits(), 7);
    assert_eq!(BlendOpE::ReverseSubtract.bits(), 2);
    assert_eq!(CullFaceE::FrontAndBack.bits(), 3);
    assert_eq!(IndexKindE::U16.bits(), 2);
    assert_eq!(InputTopologyE::TriangleFan.bits(), 5);
    assert_eq!(InputTopologyE::PatchList.bits(), 10);
}

#[test]
fn test_unknown_topology_rejected() {
    assert!(InputTopologyE::from_bits(11).is_err());
    assert!(BlendFactorE::from_bits(10).is_err());
}
