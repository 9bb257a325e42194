//! Option fragments passed to the raster converter.
//!
//! The converter applies its options left to right, so a transform is an
//! ordered list of fragments rather than a set of flags.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

use super::geometry::UnifiedCrop;

/// Background applied behind transparent pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Background {
    /// Keep transparency (spelled `none` on the command line).
    #[default]
    Transparent,
    /// Any color the external tools understand (`white`, `#ff0000`, ...).
    Color(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid background color `{0}`: expected `none` or a color such as `white` or `#ffffff`")]
pub struct InvalidBackground(String);

impl Background {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::Transparent)
    }

    /// Spelling understood by both `convert` and `rsvg-convert`.
    pub fn as_arg(&self) -> &str {
        match self {
            Self::Transparent => "none",
            Self::Color(color) => color,
        }
    }
}

impl FromStr for Background {
    type Err = InvalidBackground;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(InvalidBackground(s.to_string()));
        }
        if s.eq_ignore_ascii_case("none") {
            Ok(Self::Transparent)
        } else {
            Ok(Self::Color(s.to_string()))
        }
    }
}

impl TryFrom<String> for Background {
    type Error = InvalidBackground;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// One converter option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionFragment {
    /// `-crop WxH+X+Y`
    Crop(UnifiedCrop),
    /// `-background <color>`
    Background(Background),
    /// `-alpha remove`
    AlphaRemove,
    /// `-flatten`
    Flatten,
}

impl OptionFragment {
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Crop(crop) => vec!["-crop".into(), crop.to_string()],
            Self::Background(bg) => vec!["-background".into(), bg.as_arg().into()],
            Self::AlphaRemove => vec!["-alpha".into(), "remove".into()],
            Self::Flatten => vec!["-flatten".into()],
        }
    }
}

/// Ordered list of converter options, built fresh for every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions(Vec<OptionFragment>);

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options of the flatten operation.
    pub fn flatten() -> Self {
        Self(vec![OptionFragment::Flatten])
    }

    /// Options of the set-background operation.
    pub fn background(background: &Background, flatten: bool) -> Self {
        let mut opts = Self::new();
        opts.push_background(background, flatten);
        opts
    }

    /// Options of the final trim pass.
    pub fn trim(crop: UnifiedCrop, background: &Background, flatten: bool) -> Self {
        let mut opts = Self(vec![OptionFragment::Crop(crop)]);
        opts.push_background(background, flatten);
        opts
    }

    fn push_background(&mut self, background: &Background, flatten: bool) {
        self.push(OptionFragment::Background(background.clone()));
        if !background.is_transparent() {
            self.push(OptionFragment::AlphaRemove);
        }
        if flatten {
            self.push(OptionFragment::Flatten);
        }
    }

    pub fn push(&mut self, fragment: OptionFragment) {
        self.0.push(fragment);
    }

    pub fn fragments(&self) -> &[OptionFragment] {
        &self.0
    }

    /// Flattened argument vector, in application order.
    pub fn args(&self) -> Vec<String> {
        self.fragments().iter().flat_map(OptionFragment::args).collect()
    }
}

impl fmt::Display for TransformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}
