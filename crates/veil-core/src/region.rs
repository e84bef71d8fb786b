use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRegionError {
    #[error("unknown edge '{0}', expected top, bottom, left or right")]
    UnknownEdge(String),

    #[error("malformed region '{0}', expected <edge>:<thickness> or <x>,<y>,<width>,<height>")]
    Malformed(String),

    #[error("region thickness must not be negative (got {0})")]
    NegativeThickness(i32),

    #[error("region size must not be negative (got {width}x{height})")]
    NegativeSize { width: i32, height: i32 },
}

/// Screen edge a shell surface is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl FromStr for Edge {
    type Err = InvalidRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(InvalidRegionError::UnknownEdge(s.to_string())),
        }
    }
}

impl TryFrom<String> for Edge {
    type Error = InvalidRegionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A region to test for occlusion, either relative to a screen edge or
/// already in absolute coordinates
///
/// In JSON: `{"side": "top", "thickness": 34}` or
/// `{"x": 0, "y": 0, "width": 1920, "height": 34}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionSpec {
    Edge {
        #[serde(alias = "edge")]
        side: Edge,
        thickness: i32,
    },
    Absolute(Rect),
}

impl RegionSpec {
    pub fn edge(side: Edge, thickness: i32) -> Self {
        Self::Edge { side, thickness }
    }

    pub fn absolute(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::Absolute(Rect::new(x, y, width, height))
    }

    pub fn validate(&self) -> Result<(), InvalidRegionError> {
        match *self {
            Self::Edge { thickness, .. } if thickness < 0 => {
                Err(InvalidRegionError::NegativeThickness(thickness))
            }
            Self::Absolute(rect) if rect.width < 0 || rect.height < 0 => {
                Err(InvalidRegionError::NegativeSize {
                    width: rect.width,
                    height: rect.height,
                })
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for RegionSpec {
    type Err = InvalidRegionError;

    /// Parses `top:34` or `0,0,1920,34`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidRegionError::Malformed(s.to_string());

        let spec = if let Some((side, thickness)) = s.split_once(':') {
            let side: Edge = side.trim().parse()?;
            let thickness = thickness.trim().parse().map_err(|_| malformed())?;
            Self::Edge { side, thickness }
        } else {
            let parts = s
                .split(',')
                .map(|part| part.trim().parse::<i32>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| malformed())?;

            match parts.as_slice() {
                [x, y, width, height] => Self::absolute(*x, *y, *width, *height),
                _ => return Err(malformed()),
            }
        };

        spec.validate()?;
        Ok(spec)
    }
}

impl std::fmt::Display for RegionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edge { side, thickness } => write!(f, "{}:{}", side, thickness),
            Self::Absolute(rect) => {
                write!(f, "{},{},{},{}", rect.x, rect.y, rect.width, rect.height)
            }
        }
    }
}
