use std::fmt;

/// The single correction that brings a page upright.
///
/// Positive degrees are counter-clockwise, matching the convention of most
/// imaging libraries' `rotate(angle)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationAngle {
    /// No rotation needed (0 degrees).
    Upright,
    /// Rotate 90 degrees counter-clockwise (+90).
    CounterClockwise90,
    /// Rotate 90 degrees clockwise (-90).
    Clockwise90,
    /// Rotate 180 degrees.
    UpsideDown,
}

impl RotationAngle {
    /// Signed rotation in degrees: one of `0`, `90`, `-90` or `180`.
    #[must_use]
    pub fn degrees(self) -> i32 {
        match self {
            RotationAngle::Upright => 0,
            RotationAngle::CounterClockwise90 => 90,
            RotationAngle::Clockwise90 => -90,
            RotationAngle::UpsideDown => 180,
        }
    }

    /// Converts any multiple of 90 degrees to a `RotationAngle`.
    ///
    /// The angle is normalised first, so `270` and `-90` are the same
    /// rotation, as are `-180` and `180`. Returns `None` for angles that are
    /// not a quarter turn.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(RotationAngle::Upright),
            90 => Some(RotationAngle::CounterClockwise90),
            180 => Some(RotationAngle::UpsideDown),
            270 => Some(RotationAngle::Clockwise90),
            _ => None,
        }
    }

    /// Maps the neural orientation classifier's class index to a correction.
    ///
    /// | class | page state            | correction |
    /// |-------|-----------------------|------------|
    /// | 0     | upright               | 0          |
    /// | 1     | turned 90° clockwise  | -90        |
    /// | 2     | upside down           | 180        |
    /// | 3     | turned 90° ccw        | 90         |
    #[must_use]
    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(RotationAngle::Upright),
            1 => Some(RotationAngle::Clockwise90),
            2 => Some(RotationAngle::UpsideDown),
            3 => Some(RotationAngle::CounterClockwise90),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_upright(self) -> bool {
        self == RotationAngle::Upright
    }
}

impl fmt::Display for RotationAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
