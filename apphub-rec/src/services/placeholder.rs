//! Deterministic gradient placeholder images
//!
//! Domains without a structured catalog (travel, gifts, shopping,
//! music, books) still need every option to carry an image. A hash of
//! the query string picks one of ten fixed color pairs and the result
//! is rendered as a two-stop gradient SVG embedded in a data URL, so no
//! network request is ever made. The same query always yields the same
//! image; distinct queries usually (hash collisions aside) differ.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Gradient color pairs (start, end)
const COLOR_PAIRS: [(&str, &str); 10] = [
    ("#667eea", "#764ba2"),
    ("#f093fb", "#f5576c"),
    ("#4facfe", "#00f2fe"),
    ("#43e97b", "#38f9d7"),
    ("#fa709a", "#fee140"),
    ("#30cfd0", "#330867"),
    ("#a8edea", "#fed6e3"),
    ("#ff9a9e", "#fecfef"),
    ("#ffecd2", "#fcb69f"),
    ("#ff6e7f", "#bfe9ff"),
];

/// 31-multiplier string hash over UTF-16 code units, in wrapping i32
/// arithmetic so existing gradient assignments stay stable across the
/// web and service implementations.
fn gradient_index(text: &str) -> usize {
    let hash = text.encode_utf16().fold(0i32, |acc, unit| {
        (unit as i32).wrapping_add(acc.wrapping_shl(5).wrapping_sub(acc))
    });
    hash.unsigned_abs() as usize % COLOR_PAIRS.len()
}

/// Generate a placeholder image for a query as a base64 SVG data URL
pub fn gradient_image(query: &str) -> String {
    let query = if query.is_empty() { "abstract" } else { query };
    let (color1, color2) = COLOR_PAIRS[gradient_index(query)];

    let svg = format!(
        r##"<svg width="800" height="600" xmlns="http://www.w3.org/2000/svg">
    <defs>
      <linearGradient id="grad" x1="0%" y1="0%" x2="100%" y2="100%">
        <stop offset="0%" style="stop-color:{color1};stop-opacity:1" />
        <stop offset="100%" style="stop-color:{color2};stop-opacity:1" />
      </linearGradient>
    </defs>
    <rect width="800" height="600" fill="url(#grad)" />
  </svg>"##
    );

    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}
