//! Query string serialization for transform sets.
//!
//! Keys are emitted in a fixed order so that the same [`TransformSet`] always
//! produces byte-identical URLs, which keeps CDN cache keys stable:
//!
//! ```text
//! w, h, fit, flip, flop, blur, grayscale, brightness, hue, lightness,
//! saturation, negate, normalize, extract, background, quality, format,
//! timeout, dpr
//! ```
//!
//! Values are form-urlencoded, so the commas inside `extract` and
//! `background` come out as `%2C`.

use url::form_urlencoded;

use super::{Background, Blur, Extract, FitMode, ImageFormat, TransformSet};

/// Serialize a transform set into a canonical query string (without `?`).
pub fn serialize(transforms: &TransformSet) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    if let Some(width) = transforms.width.filter(|w| *w > 0) {
        query.append_pair("w", &width.to_string());
    }
    if let Some(height) = transforms.height.filter(|h| *h > 0) {
        query.append_pair("h", &height.to_string());
    }
    if let Some(fit) = transforms.fit {
        query.append_pair("fit", fit.as_str());
    }
    append_flag(&mut query, "flip", transforms.flip);
    append_flag(&mut query, "flop", transforms.flop);
    match transforms.blur {
        Some(Blur::Enabled(enabled)) => {
            query.append_pair("blur", bool_str(enabled));
        }
        Some(Blur::Sigma(sigma)) if sigma > 0.0 && sigma.is_finite() => {
            query.append_pair("blur", &sigma.to_string());
        }
        _ => {}
    }
    append_flag(&mut query, "grayscale", transforms.grayscale);
    append_number(&mut query, "brightness", transforms.brightness);
    append_number(&mut query, "hue", transforms.hue);
    append_number(&mut query, "lightness", transforms.lightness);
    append_number(&mut query, "saturation", transforms.saturation);
    append_flag(&mut query, "negate", transforms.negate);
    append_flag(&mut query, "normalize", transforms.normalize);
    if let Some(extract) = transforms.extract {
        let value = format!(
            "{},{},{},{}",
            extract.x, extract.y, extract.width, extract.height
        );
        query.append_pair("extract", &value);
    }
    if let Some(bg) = transforms.background {
        let value = format!("{},{},{},{}", bg.r, bg.g, bg.b, bg.a);
        query.append_pair("background", &value);
    }
    if let Some(quality) = transforms.quality.filter(|q| *q > 0) {
        query.append_pair("quality", &quality.to_string());
    }
    if let Some(format) = transforms.format {
        query.append_pair("format", format.as_str());
    }
    if let Some(timeout) = transforms.timeout.filter(|t| *t > 0) {
        query.append_pair("timeout", &timeout.to_string());
    }
    append_number(&mut query, "dpr", transforms.dpr);

    query.finish()
}

/// Parse a query string produced by [`serialize`] back into a transform set.
///
/// Unknown keys and malformed values are skipped rather than rejected.
pub fn parse(query: &str) -> TransformSet {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut transforms = TransformSet::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.as_ref();
        match key.as_ref() {
            "w" => transforms.width = value.parse().ok(),
            "h" => transforms.height = value.parse().ok(),
            "fit" => transforms.fit = value.parse::<FitMode>().ok(),
            "flip" => transforms.flip = parse_flag(value),
            "flop" => transforms.flop = parse_flag(value),
            "blur" => {
                transforms.blur = parse_flag(value)
                    .map(Blur::Enabled)
                    .or_else(|| value.parse().ok().map(Blur::Sigma));
            }
            "grayscale" => transforms.grayscale = parse_flag(value),
            "brightness" => transforms.brightness = value.parse().ok(),
            "hue" => transforms.hue = value.parse().ok(),
            "lightness" => transforms.lightness = value.parse().ok(),
            "saturation" => transforms.saturation = value.parse().ok(),
            "negate" => transforms.negate = parse_flag(value),
            "normalize" => transforms.normalize = parse_flag(value),
            "extract" => transforms.extract = parse_extract(value),
            "background" => transforms.background = parse_background(value),
            "quality" => transforms.quality = value.parse().ok(),
            "format" => transforms.format = value.parse::<ImageFormat>().ok(),
            "timeout" => transforms.timeout = value.parse().ok(),
            "dpr" => transforms.dpr = value.parse().ok(),
            _ => {}
        }
    }

    transforms
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn append_flag(query: &mut form_urlencoded::Serializer<'_, String>, key: &str, flag: Option<bool>) {
    if let Some(flag) = flag {
        query.append_pair(key, bool_str(flag));
    }
}

fn append_number(query: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: Option<f64>) {
    if let Some(value) = value.filter(|v| *v != 0.0 && v.is_finite()) {
        query.append_pair(key, &value.to_string());
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_extract(value: &str) -> Option<Extract> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|p| p.trim().parse())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [x, y, width, height] => Some(Extract {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

fn parse_background(value: &str) -> Option<Background> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [r, g, b, a] => Some(Background {
            r: r.parse().ok()?,
            g: g.parse().ok()?,
            b: b.parse().ok()?,
            a: a.parse().ok()?,
        }),
        _ => None,
    }
}
