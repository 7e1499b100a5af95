use crate::types::SclValue;
use serde::{Deserialize, Serialize};

/// Sentinel-2 Level-2A scene classification (SCL) codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SceneClass {
    NoData = 0,
    SaturatedOrDefective = 1,
    DarkAreaPixels = 2,
    CloudShadows = 3,
    Vegetation = 4,
    NotVegetated = 5,
    Water = 6,
    Unclassified = 7,
    CloudMediumProbability = 8,
    CloudHighProbability = 9,
    ThinCirrus = 10,
    Snow = 11,
}

impl SceneClass {
    pub fn from_code(code: SclValue) -> Option<Self> {
        use SceneClass::*;
        let class = match code {
            0 => NoData,
            1 => SaturatedOrDefective,
            2 => DarkAreaPixels,
            3 => CloudShadows,
            4 => Vegetation,
            5 => NotVegetated,
            6 => Water,
            7 => Unclassified,
            8 => CloudMediumProbability,
            9 => CloudHighProbability,
            10 => ThinCirrus,
            11 => Snow,
            _ => return None,
        };
        Some(class)
    }

    pub const fn code(self) -> SclValue {
        self as SclValue
    }
}

/// Class a pixel must carry before the event to be eligible for burning
pub const REFERENCE_CLASS: SclValue = SceneClass::Vegetation.code();

/// Codes that make a pixel unreliable when present in either acquisition
pub const UNRELIABLE_CLASSES: [SclValue; 7] = [
    SceneClass::NoData.code(),
    SceneClass::SaturatedOrDefective.code(),
    SceneClass::NotVegetated.code(),
    SceneClass::Water.code(),
    SceneClass::Unclassified.code(),
    SceneClass::CloudMediumProbability.code(),
    SceneClass::CloudHighProbability.code(),
];

#[inline]
pub fn is_reference(code: SclValue) -> bool {
    code == REFERENCE_CLASS
}

/// Codes 2, 3, 10, 11 and anything above 11 stay usable.
#[inline]
pub fn is_unreliable(code: SclValue) -> bool {
    matches!(code, 0 | 1 | 5..=9)
}
