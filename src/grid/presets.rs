use super::GridSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPreset {
    TwoColumn,
    ThreeColumn,
    FourColumn,
    TwoByTwo,
    ThreeByTwo,
    SidebarLeft,
    SidebarRight,
}

impl GridPreset {
    pub const ALL: [GridPreset; 7] = [
        Self::TwoColumn,
        Self::ThreeColumn,
        Self::FourColumn,
        Self::TwoByTwo,
        Self::ThreeByTwo,
        Self::SidebarLeft,
        Self::SidebarRight,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::TwoColumn => "two-column",
            Self::ThreeColumn => "three-column",
            Self::FourColumn => "four-column",
            Self::TwoByTwo => "two-by-two",
            Self::ThreeByTwo => "three-by-two",
            Self::SidebarLeft => "sidebar-left",
            Self::SidebarRight => "sidebar-right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.name() == name)
    }

    pub const fn dimensions(self) -> (i64, i64) {
        match self {
            Self::TwoColumn | Self::SidebarLeft | Self::SidebarRight => (2, 1),
            Self::ThreeColumn => (3, 1),
            Self::FourColumn => (4, 1),
            Self::TwoByTwo => (2, 2),
            Self::ThreeByTwo => (3, 2),
        }
    }

    const fn custom_columns(self) -> Option<&'static str> {
        match self {
            Self::SidebarLeft => Some("1fr 3fr"),
            Self::SidebarRight => Some("3fr 1fr"),
            _ => None,
        }
    }

    /// Enabled container spec for this preset.
    pub fn spec(self) -> GridSpec {
        let (columns, rows) = self.dimensions();
        let custom = self.custom_columns();
        GridSpec {
            enabled: Some(true),
            advanced: custom.map(|_| true),
            columns: Some(columns),
            rows: Some(rows),
            custom_template_columns: custom.map(str::to_string),
            ..GridSpec::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::resolve_grid;

    #[test]
    fn preset_names_round_trip() {
        for preset in GridPreset::ALL {
            assert_eq!(GridPreset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(GridPreset::from_name("masonry"), None);
    }

    #[test]
    fn sidebar_preset_uses_custom_tracks() {
        let css = resolve_grid(&GridPreset::SidebarLeft.spec());
        assert_eq!(css.grid_template_columns, "1fr 3fr");
        assert_eq!(css.grid_template_rows, "repeat(1, auto)");
    }

    #[test]
    fn matrix_preset_sets_both_axes() {
        let css = resolve_grid(&GridPreset::ThreeByTwo.spec());
        assert_eq!(css.grid_template_columns, "repeat(3, 1fr)");
        assert_eq!(css.grid_template_rows, "repeat(2, auto)");
        assert!(css.enabled);
    }
}
