use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Viewport {
    pub const ALL: [Viewport; 3] = [Self::Desktop, Self::Tablet, Self::Mobile];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }

    /// Canvas width the editor previews this breakpoint at.
    pub const fn preview_width(self) -> u32 {
        match self {
            Self::Desktop => 1280,
            Self::Tablet => 768,
            Self::Mobile => 375,
        }
    }

    pub const fn is_base(self) -> bool {
        matches!(self, Self::Desktop)
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Viewport {
    type Err = UnknownViewport;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "tablet" => Ok(Self::Tablet),
            "mobile" => Ok(Self::Mobile),
            _ => Err(UnknownViewport(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown viewport: {0}")]
pub struct UnknownViewport(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportResolver {
    current: Viewport,
}

impl ViewportResolver {
    pub const fn new(initial: Viewport) -> Self {
        Self { current: initial }
    }

    pub const fn current(&self) -> Viewport {
        self.current
    }

    /// Returns `true` when the active breakpoint actually changed.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if self.current == viewport {
            return false;
        }
        tracing::debug!(from = ?self.current, to = ?viewport, "switch viewport");
        self.current = viewport;
        true
    }
}
