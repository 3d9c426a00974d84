use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::{
    validate_properties, ElementKind, ElementPatch, ElementProperties, Overlay, PatchError,
};
use crate::grid::{GridSpec, MAX_GRID_TRACKS};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionTemplate {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub properties: ElementProperties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SectionTemplate>,
}

impl SectionTemplate {
    /// Parses a template tree, applying the same category validation as an
    /// element patch at every level.
    pub fn from_json(value: Value) -> Result<Self, PatchError> {
        validate_tree(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// The section itself followed by its children as sibling elements placed
    /// on the section's desktop grid, row-major.
    pub fn expand(&self) -> Vec<ElementPatch> {
        let mut patches = vec![ElementPatch {
            kind: Some(self.kind.clone()),
            content: self.content.clone(),
            properties: Some(self.properties.clone()),
            ..ElementPatch::default()
        }];
        if self.children.is_empty() {
            return patches;
        }

        let count = i64::try_from(self.children.len()).unwrap_or(i64::MAX);
        let parent_grid = self.properties.responsive.grid(Viewport::Desktop);
        let columns = parent_grid
            .as_ref()
            .filter(|grid| grid.is_enabled())
            .map(GridSpec::column_count)
            .unwrap_or_else(|| count.clamp(1, MAX_GRID_TRACKS));
        let needed_rows = count.saturating_add(columns - 1) / columns;
        let rows = parent_grid
            .as_ref()
            .map(GridSpec::row_count)
            .unwrap_or(1)
            .max(needed_rows);

        for (index, child) in self.children.iter().enumerate() {
            let index = i64::try_from(index).unwrap_or(i64::MAX);
            let mut properties = child.properties.clone();
            let mut grid = GridSpec {
                columns: Some(columns),
                rows: Some(rows),
                column_start: Some(index % columns + 1),
                row_start: Some(index / columns + 1),
                ..GridSpec::default()
            };
            let desktop = properties.responsive.get_or_insert(Viewport::Desktop);
            if let Some(own) = desktop.grid.take() {
                grid.overlay(&own);
            }
            desktop.grid = Some(grid);

            patches.push(ElementPatch {
                kind: Some(child.kind.clone()),
                content: child.content.clone(),
                properties: Some(properties),
                ..ElementPatch::default()
            });
        }
        patches
    }
}

fn validate_tree(node: &Value) -> Result<(), PatchError> {
    let object = node.as_object().ok_or(PatchError::NotAnObject)?;
    if let Some(properties) = object.get("properties") {
        validate_properties(properties)?;
    }
    if let Some(children) = object.get("children").and_then(Value::as_array) {
        for child in children {
            validate_tree(child)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn children_fill_the_section_grid_row_major() {
        let template = SectionTemplate::from_json(json!({
            "type": "section",
            "properties": {
                "responsive": { "desktop": { "grid": { "enabled": true, "columns": 2 } } }
            },
            "children": [
                { "type": "heading", "content": "Plans" },
                { "type": "text" },
                { "type": "button", "content": "Buy" }
            ]
        }))
        .expect("valid template");

        let patches = template.expand();
        assert_eq!(patches.len(), 4);
        assert_eq!(patches[0].kind, Some(ElementKind::Section));

        let placement: Vec<(Option<i64>, Option<i64>)> = patches[1..]
            .iter()
            .map(|patch| {
                let grid = patch
                    .properties
                    .as_ref()
                    .and_then(|properties| properties.responsive.grid(Viewport::Desktop))
                    .expect("child grid placement");
                (grid.column_start, grid.row_start)
            })
            .collect();
        assert_eq!(
            placement,
            vec![(Some(1), Some(1)), (Some(2), Some(1)), (Some(1), Some(2))]
        );
        assert_eq!(patches[3].content.as_deref(), Some("Buy"));
    }

    #[test]
    fn without_a_grid_children_share_one_row() {
        let template = SectionTemplate {
            kind: ElementKind::Section,
            children: vec![
                SectionTemplate::default(),
                SectionTemplate::default(),
            ],
            ..SectionTemplate::default()
        };

        let patches = template.expand();
        let grid = patches[2]
            .properties
            .as_ref()
            .and_then(|properties| properties.responsive.grid(Viewport::Desktop))
            .expect("placement");
        assert_eq!(grid.columns, Some(2));
        assert_eq!(grid.column_start, Some(2));
        assert_eq!(grid.row_start, Some(1));
    }

    #[test]
    fn huge_column_count_is_clamped() {
        let template = SectionTemplate::from_json(json!({
            "type": "section",
            "properties": {
                "responsive": {
                    "desktop": { "grid": { "enabled": true, "columns": i64::MAX, "rows": i64::MAX } }
                }
            },
            "children": [{ "type": "text" }]
        }))
        .expect("valid template");

        let patches = template.expand();
        let grid = patches[1]
            .properties
            .as_ref()
            .and_then(|properties| properties.responsive.grid(Viewport::Desktop))
            .expect("placement");
        assert_eq!(grid.columns, Some(MAX_GRID_TRACKS));
        assert_eq!(grid.rows, Some(MAX_GRID_TRACKS));
        assert_eq!(grid.column_start, Some(1));
    }

    #[test]
    fn child_with_unknown_category_is_rejected() {
        let err = SectionTemplate::from_json(json!({
            "type": "section",
            "children": [{ "type": "text", "properties": { "sparkle": {} } }]
        }))
        .expect_err("unknown category");
        assert!(matches!(err, PatchError::UnknownCategory { category } if category == "sparkle"));
    }
}
