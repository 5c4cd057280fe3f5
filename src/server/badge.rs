//! Membership badge rendering
//!
//! Flat SVG badge in the shields.io style, showing the live membership
//! counts next to a fixed "slack" label.

use thiserror::Error;

/// Badge accent color for the value side
pub const BADGE_COLOR: &str = "#E01563";

/// Label shown on the left side of the badge
pub const BADGE_LABEL: &str = "slack";

#[derive(Debug, Error)]
pub enum BadgeError {
    #[error("badge label is empty")]
    EmptyLabel,
    #[error("badge value is empty")]
    EmptyValue,
}

/// Badge value for the given counts: `active/total` while anyone is active,
/// otherwise just the total.
pub fn membership_value(active: u64, total: u64) -> String {
    if active > 0 {
        format!("{}/{}", active, total)
    } else {
        total.to_string()
    }
}

/// Approximate rendered width of `text` at 11px Verdana.
fn text_width(text: &str) -> u32 {
    6 * text.chars().count() as u32 + 10
}

/// Render a flat badge as an SVG document.
pub fn render(label: &str, value: &str, color: &str) -> Result<String, BadgeError> {
    if label.is_empty() {
        return Err(BadgeError::EmptyLabel);
    }
    if value.is_empty() {
        return Err(BadgeError::EmptyValue);
    }

    let label_width = text_width(label);
    let value_width = text_width(value);
    let width = label_width + value_width;
    let label_center = label_width / 2;
    let value_center = label_width + value_width / 2;

    Ok(format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="20">
<linearGradient id="smooth" x2="0" y2="100%">
<stop offset="0" stop-color="#bbb" stop-opacity=".1"/>
<stop offset="1" stop-opacity=".1"/>
</linearGradient>
<mask id="round">
<rect width="{width}" height="20" rx="3" fill="#fff"/>
</mask>
<g mask="url(#round)">
<rect width="{label_width}" height="20" fill="#555"/>
<rect x="{label_width}" width="{value_width}" height="20" fill="{color}"/>
<rect width="{width}" height="20" fill="url(#smooth)"/>
</g>
<g fill="#fff" text-anchor="middle" font-family="DejaVu Sans,Verdana,Geneva,sans-serif" font-size="11">
<text x="{label_center}" y="15" fill="#010101" fill-opacity=".3">{label}</text>
<text x="{label_center}" y="14">{label}</text>
<text x="{value_center}" y="15" fill="#010101" fill-opacity=".3">{value}</text>
<text x="{value_center}" y="14">{value}</text>
</g>
</svg>"##
    ))
}
