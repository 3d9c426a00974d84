use crate::element::{
    format_number, Animation, Background, BackgroundKind, Effects, Filters, ShadowSpec,
    Transforms,
};

/// `translateX translateY rotate scale skewX skewY`, whatever order the
/// fields were set in. Neutral values are omitted; `None` when nothing remains.
pub fn transform_css(transforms: Option<&Transforms>, effects: Option<&Effects>) -> Option<String> {
    let transforms = transforms.cloned().unwrap_or_default();
    let rotate = transforms
        .rotate
        .or_else(|| effects.and_then(|effects| effects.rotate));
    let scale = transforms
        .scale
        .or_else(|| effects.and_then(|effects| effects.scale))
        .filter(|scale| scale.is_finite() && *scale > 0.0);

    let parts = [
        function("translateX", transforms.translate_x, 0.0, "px"),
        function("translateY", transforms.translate_y, 0.0, "px"),
        function("rotate", rotate, 0.0, "deg"),
        function("scale", scale, 1.0, ""),
        function("skewX", transforms.skew_x, 0.0, "deg"),
        function("skewY", transforms.skew_y, 0.0, "deg"),
    ];
    join(parts)
}

/// `blur brightness contrast grayscale hue-rotate saturate`, same omission
/// rule as [`transform_css`].
pub fn filter_css(filters: Option<&Filters>, effects: Option<&Effects>) -> Option<String> {
    let filters = filters.cloned().unwrap_or_default();
    let blur = filters
        .blur
        .or_else(|| effects.and_then(|effects| effects.blur));
    let grayscale = filters
        .grayscale
        .or_else(|| effects.and_then(|effects| effects.grayscale));

    let parts = [
        function("blur", non_negative(blur), 0.0, "px"),
        function("brightness", non_negative(filters.brightness), 1.0, ""),
        function("contrast", non_negative(filters.contrast), 1.0, ""),
        function("grayscale", non_negative(grayscale), 0.0, ""),
        function("hue-rotate", filters.hue_rotate, 0.0, "deg"),
        function("saturate", non_negative(filters.saturate), 1.0, ""),
    ];
    join(parts)
}

/// Shorthand emitted only when both a name and a duration are present.
pub fn animation_css(animation: Option<&Animation>) -> Option<String> {
    let animation = animation?;
    let name = animation
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())?;
    let duration = animation
        .duration
        .filter(|duration| duration.is_finite() && *duration >= 0.0)?;

    let mut tokens = vec![name.to_string(), format!("{}ms", format_number(duration))];
    if let Some(timing) = &animation.timing_function {
        tokens.push(timing.clone());
    }
    if let Some(delay) = animation.delay.filter(|delay| delay.is_finite()) {
        tokens.push(format!("{}ms", format_number(delay)));
    }
    if let Some(count) = &animation.iteration_count {
        tokens.push(count.to_css());
    }
    if let Some(direction) = &animation.direction {
        tokens.push(direction.clone());
    }
    if let Some(fill_mode) = &animation.fill_mode {
        tokens.push(fill_mode.clone());
    }
    Some(tokens.join(" "))
}

/// `offsetX offsetY blur spread color inset`.
pub fn box_shadow_css(shadow: &ShadowSpec) -> String {
    match shadow {
        ShadowSpec::Css(raw) => raw.clone(),
        ShadowSpec::Parts(shadow) => {
            let mut tokens = vec![
                px(shadow.offset_x),
                px(shadow.offset_y),
                px(shadow.blur.max(0.0)),
            ];
            if let Some(spread) = shadow.spread {
                tokens.push(px(spread));
            }
            tokens.push(shadow.color.clone());
            if shadow.inset {
                tokens.push("inset".to_string());
            }
            tokens.join(" ")
        }
    }
}

/// `offsetX offsetY blur color`; text shadows have no spread or inset.
pub fn text_shadow_css(shadow: &ShadowSpec) -> String {
    match shadow {
        ShadowSpec::Css(raw) => raw.clone(),
        ShadowSpec::Parts(shadow) => format!(
            "{} {} {} {}",
            px(shadow.offset_x),
            px(shadow.offset_y),
            px(shadow.blur.max(0.0)),
            shadow.color
        ),
    }
}

/// Background declarations. Gradient strings pass through untouched.
pub fn background_declarations(background: &Background) -> Vec<(&'static str, String)> {
    let Some(value) = background
        .value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    else {
        return Vec::new();
    };

    let mut declarations = Vec::new();
    match background.kind.unwrap_or_default() {
        BackgroundKind::Color => declarations.push(("backgroundColor", value.to_string())),
        BackgroundKind::Gradient => declarations.push(("backgroundImage", value.to_string())),
        BackgroundKind::Image => {
            let image = format!("url(\"{value}\")");
            let layered = match background.overlay.as_deref().filter(|o| !o.is_empty()) {
                Some(overlay) => format!("linear-gradient({overlay}, {overlay}), {image}"),
                None => image,
            };
            declarations.push(("backgroundImage", layered));
            declarations.push((
                "backgroundSize",
                background.size.clone().unwrap_or_else(|| "cover".to_string()),
            ));
            declarations.push((
                "backgroundPosition",
                background
                    .position
                    .clone()
                    .unwrap_or_else(|| "center".to_string()),
            ));
            declarations.push((
                "backgroundRepeat",
                background
                    .repeat
                    .clone()
                    .unwrap_or_else(|| "no-repeat".to_string()),
            ));
            let attachment = if background.parallax.unwrap_or(false) {
                Some("fixed".to_string())
            } else {
                background.attachment.clone()
            };
            if let Some(attachment) = attachment {
                declarations.push(("backgroundAttachment", attachment));
            }
        }
        // Video backgrounds are rendered as a media layer; only the overlay
        // tint reaches CSS.
        BackgroundKind::Video => {
            if let Some(overlay) = background.overlay.as_deref().filter(|o| !o.is_empty()) {
                declarations.push(("backgroundColor", overlay.to_string()));
            }
        }
    }
    declarations
}

/// Opacity in `[0, 1]`; values above 1 are UI percentages.
pub fn normalize_opacity(opacity: f64) -> Option<f64> {
    if !opacity.is_finite() {
        return None;
    }
    let fraction = if opacity > 1.0 {
        opacity / 100.0
    } else {
        opacity
    };
    Some(fraction.clamp(0.0, 1.0))
}

pub(crate) fn px(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}px", format_number(value))
    }
}

fn function(name: &str, value: Option<f64>, neutral: f64, unit: &str) -> Option<String> {
    let value = value.filter(|value| value.is_finite() && *value != neutral)?;
    Some(format!("{name}({}{unit})", format_number(value)))
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.map(|value| value.max(0.0))
}

fn join<const N: usize>(parts: [Option<String>; N]) -> Option<String> {
    let parts: Vec<String> = parts.into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{IterationCount, Shadow};

    #[test]
    fn transform_order_is_fixed() {
        let transforms = Transforms {
            scale: Some(1.5),
            skew_y: Some(10.0),
            translate_x: Some(20.0),
            rotate: Some(-45.0),
            ..Transforms::default()
        };
        assert_eq!(
            transform_css(Some(&transforms), None).as_deref(),
            Some("translateX(20px) rotate(-45deg) scale(1.5) skewY(10deg)")
        );
    }

    #[test]
    fn neutral_transform_values_are_omitted() {
        let transforms = Transforms {
            translate_x: Some(0.0),
            scale: Some(1.0),
            ..Transforms::default()
        };
        assert_eq!(transform_css(Some(&transforms), None), None);
        assert_eq!(transform_css(None, None), None);
    }

    #[test]
    fn non_positive_scale_is_ignored() {
        let transforms = Transforms {
            scale: Some(0.0),
            rotate: Some(90.0),
            ..Transforms::default()
        };
        assert_eq!(
            transform_css(Some(&transforms), None).as_deref(),
            Some("rotate(90deg)")
        );
    }

    #[test]
    fn effects_fill_in_missing_transform_and_filter_leaves() {
        let effects = Effects {
            scale: Some(1.1),
            rotate: Some(3.0),
            blur: Some(2.0),
            grayscale: Some(0.5),
            ..Effects::default()
        };
        let transforms = Transforms {
            rotate: Some(8.0),
            ..Transforms::default()
        };
        assert_eq!(
            transform_css(Some(&transforms), Some(&effects)).as_deref(),
            Some("rotate(8deg) scale(1.1)")
        );
        assert_eq!(
            filter_css(None, Some(&effects)).as_deref(),
            Some("blur(2px) grayscale(0.5)")
        );
    }

    #[test]
    fn filter_order_is_fixed() {
        let filters = Filters {
            saturate: Some(2.0),
            blur: Some(4.0),
            hue_rotate: Some(90.0),
            brightness: Some(1.2),
            ..Filters::default()
        };
        assert_eq!(
            filter_css(Some(&filters), None).as_deref(),
            Some("blur(4px) brightness(1.2) hue-rotate(90deg) saturate(2)")
        );
    }

    #[test]
    fn animation_requires_name_and_duration() {
        let mut animation = Animation {
            name: Some("fadeIn".to_string()),
            ..Animation::default()
        };
        assert_eq!(animation_css(Some(&animation)), None);

        animation.duration = Some(500.0);
        assert_eq!(animation_css(Some(&animation)).as_deref(), Some("fadeIn 500ms"));

        animation.fill_mode = Some("forwards".to_string());
        animation.iteration_count = Some(IterationCount::Keyword("infinite".to_string()));
        animation.timing_function = Some("ease-in".to_string());
        animation.delay = Some(100.0);
        assert_eq!(
            animation_css(Some(&animation)).as_deref(),
            Some("fadeIn 500ms ease-in 100ms infinite forwards")
        );
    }

    #[test]
    fn shadows_serialize_with_and_without_spread() {
        let shadow = ShadowSpec::Parts(Shadow {
            offset_x: 2.0,
            offset_y: 4.0,
            blur: 8.0,
            spread: Some(1.0),
            color: "#000".to_string(),
            inset: true,
        });
        assert_eq!(box_shadow_css(&shadow), "2px 4px 8px 1px #000 inset");
        assert_eq!(text_shadow_css(&shadow), "2px 4px 8px #000");
        assert_eq!(
            box_shadow_css(&ShadowSpec::Css("0 0 0 2px red".to_string())),
            "0 0 0 2px red"
        );
    }

    #[test]
    fn image_background_layers_overlay_and_parallax() {
        let background = Background {
            kind: Some(BackgroundKind::Image),
            value: Some("/hero.jpg".to_string()),
            overlay: Some("rgba(0, 0, 0, 0.4)".to_string()),
            parallax: Some(true),
            ..Background::default()
        };
        let declarations = background_declarations(&background);
        assert_eq!(
            declarations[0],
            (
                "backgroundImage",
                "linear-gradient(rgba(0, 0, 0, 0.4), rgba(0, 0, 0, 0.4)), url(\"/hero.jpg\")"
                    .to_string()
            )
        );
        assert!(declarations.contains(&("backgroundAttachment", "fixed".to_string())));
    }

    #[test]
    fn gradient_background_is_opaque() {
        let raw = "linear-gradient(135deg, #667eea 0%, #764ba2 100%)";
        let background = Background {
            kind: Some(BackgroundKind::Gradient),
            value: Some(raw.to_string()),
            ..Background::default()
        };
        assert_eq!(
            background_declarations(&background),
            vec![("backgroundImage", raw.to_string())]
        );
    }

    #[test]
    fn opacity_accepts_fraction_or_percent() {
        assert_eq!(normalize_opacity(0.5), Some(0.5));
        assert_eq!(normalize_opacity(50.0), Some(0.5));
        assert_eq!(normalize_opacity(-1.0), Some(0.0));
        assert_eq!(normalize_opacity(f64::NAN), None);
    }
}
