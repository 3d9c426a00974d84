mod presets;

use serde::Serialize;

use crate::element::{category, Dimension};

pub use presets::GridPreset;

pub const DEFAULT_GRID_COLUMNS: i64 = 2;
pub const DEFAULT_GRID_ROWS: i64 = 1;
/// Upper bound on tracks per axis; larger counts are clamped.
pub const MAX_GRID_TRACKS: i64 = 1000;

category! {
    /// Grid settings for one breakpoint. Container fields describe the grid the
    /// element lays out; placement fields describe where the element itself
    /// sits inside a grid of `columns` x `rows` tracks.
    pub struct GridSpec {
        enabled: bool,
        /// Custom track strings and template areas only apply in advanced mode.
        advanced: bool,
        columns: i64,
        rows: i64,
        gap: Dimension,
        auto_flow: String,
        justify_items: String,
        align_items: String,
        place_content: String,
        custom_template_columns: String,
        custom_template_rows: String,
        template_areas: String,
        column_start: i64,
        column_end: i64,
        row_start: i64,
        row_end: i64,
        column_span: i64,
        row_span: i64,
        area: String,
    }
}

impl GridSpec {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn is_advanced(&self) -> bool {
        self.advanced.unwrap_or(false)
    }

    pub fn column_count(&self) -> i64 {
        self.columns
            .unwrap_or(DEFAULT_GRID_COLUMNS)
            .clamp(1, MAX_GRID_TRACKS)
    }

    pub fn row_count(&self) -> i64 {
        self.rows.unwrap_or(DEFAULT_GRID_ROWS).clamp(1, MAX_GRID_TRACKS)
    }

    fn custom_columns(&self) -> Option<&str> {
        non_blank(self.custom_template_columns.as_deref()).filter(|_| self.is_advanced())
    }

    fn custom_rows(&self) -> Option<&str> {
        non_blank(self.custom_template_rows.as_deref()).filter(|_| self.is_advanced())
    }

    fn named_areas(&self) -> Option<&str> {
        non_blank(self.template_areas.as_deref()).filter(|_| self.is_advanced())
    }
}

/// One axis of an item's placement after clamping into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisPlacement {
    pub start: Option<i64>,
    /// Last occupied track, inclusive.
    pub end: Option<i64>,
    pub span: Option<i64>,
}

impl AxisPlacement {
    fn resolve(start: Option<i64>, end: Option<i64>, span: Option<i64>, tracks: i64) -> Self {
        let start = start.map(|start| start.clamp(1, tracks));
        match start {
            Some(first) => {
                let end = end.map(|end| end.clamp(first, tracks));
                let span = if end.is_some() {
                    None
                } else {
                    span.map(|span| span.clamp(1, tracks - first + 1))
                };
                Self { start, end, span }
            }
            None => Self {
                start: None,
                end: end.map(|end| end.clamp(1, tracks)),
                span: span.map(|span| span.clamp(1, tracks)),
            },
        }
    }

    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.span.is_some()
    }

    /// `grid-column` / `grid-row` shorthand value.
    pub fn to_css(&self) -> Option<String> {
        match (self.start, self.end, self.span) {
            (Some(start), Some(end), _) => Some(format!("{start} / {}", end.saturating_add(1))),
            (Some(start), None, Some(span)) => Some(format!("{start} / span {span}")),
            (Some(start), None, None) => Some(start.to_string()),
            (None, Some(end), _) => Some(format!("auto / {}", end.saturating_add(1))),
            (None, None, Some(span)) => Some(format!("span {span}")),
            (None, None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCss {
    pub enabled: bool,
    pub grid_template_columns: String,
    pub grid_template_rows: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_template_areas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_auto_flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_area: Option<String>,
    pub column: AxisPlacement,
    pub row: AxisPlacement,
}

impl GridCss {
    /// CSS declarations for the descriptor, container declarations first.
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        let mut declarations = Vec::new();
        if self.enabled {
            declarations.push(("display", "grid".to_string()));
            declarations.push(("gridTemplateColumns", self.grid_template_columns.clone()));
            declarations.push(("gridTemplateRows", self.grid_template_rows.clone()));
            push_some(
                &mut declarations,
                "gridTemplateAreas",
                &self.grid_template_areas,
            );
            push_some(&mut declarations, "gap", &self.gap);
            push_some(&mut declarations, "gridAutoFlow", &self.grid_auto_flow);
            push_some(&mut declarations, "justifyItems", &self.justify_items);
            push_some(&mut declarations, "alignItems", &self.align_items);
            push_some(&mut declarations, "placeContent", &self.place_content);
        }

        if let Some(area) = &self.grid_area {
            declarations.push(("gridArea", area.clone()));
        } else {
            if let Some(column) = self.column.to_css() {
                declarations.push(("gridColumn", column));
            }
            if let Some(row) = self.row.to_css() {
                declarations.push(("gridRow", row));
            }
        }
        declarations
    }
}

/// Compiles a grid spec. Out-of-range placement is clamped, never rejected.
pub fn resolve_grid(spec: &GridSpec) -> GridCss {
    let columns = spec.column_count();
    let rows = spec.row_count();

    let grid_template_columns = spec
        .custom_columns()
        .map(str::to_string)
        .unwrap_or_else(|| format!("repeat({columns}, 1fr)"));
    let grid_template_rows = spec
        .custom_rows()
        .map(str::to_string)
        .unwrap_or_else(|| format!("repeat({rows}, auto)"));

    let grid_template_areas = spec.named_areas().map(str::to_string);
    let grid_area = grid_template_areas
        .as_ref()
        .and_then(|_| non_blank(spec.area.as_deref()))
        .map(str::to_string);

    let (column, row) = if grid_area.is_some() {
        (AxisPlacement::default(), AxisPlacement::default())
    } else {
        (
            AxisPlacement::resolve(spec.column_start, spec.column_end, spec.column_span, columns),
            AxisPlacement::resolve(spec.row_start, spec.row_end, spec.row_span, rows),
        )
    };

    GridCss {
        enabled: spec.is_enabled(),
        grid_template_columns,
        grid_template_rows,
        grid_template_areas,
        gap: spec.gap.as_ref().map(Dimension::to_css),
        grid_auto_flow: spec.auto_flow.clone(),
        justify_items: spec.justify_items.clone(),
        align_items: spec.align_items.clone(),
        place_content: spec.place_content.clone(),
        grid_area,
        column,
        row,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn push_some(
    declarations: &mut Vec<(&'static str, String)>,
    name: &'static str,
    value: &Option<String>,
) {
    if let Some(value) = value {
        declarations.push((name, value.clone()));
    }
}
