//! Accessibility audit.
//!
//! A lightweight WCAG 2.1 AA scan captured alongside the other transition
//! diagnostics: images without alternative text, form controls without an
//! accessible label, and text whose color contrast falls below the AA
//! thresholds. The DOM scan runs as a script in the live page; contrast
//! ratios are computed here from the sampled colors.

use serde::{Deserialize, Serialize};

use crate::driver::{lock, DriverHandle};
use crate::result::NavegarResult;

/// Minimum contrast ratio for normal text (WCAG 2.1 AA)
pub const MIN_CONTRAST_NORMAL: f32 = 4.5;

/// Minimum contrast ratio for large text (WCAG 2.1 AA)
pub const MIN_CONTRAST_LARGE: f32 = 3.0;

/// Color represented as RGB values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl Color {
    /// Create a new color
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex string
    #[must_use]
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        })
    }

    /// Relative luminance (per WCAG 2.1)
    #[must_use]
    pub fn relative_luminance(&self) -> f32 {
        let r = srgb_to_linear(f32::from(self.r) / 255.0);
        let g = srgb_to_linear(f32::from(self.g) / 255.0);
        let b = srgb_to_linear(f32::from(self.b) / 255.0);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// Contrast ratio with another color (1.0 to 21.0)
    #[must_use]
    pub fn contrast_ratio(&self, other: &Self) -> f32 {
        let l1 = self.relative_luminance();
        let l2 = other.relative_luminance();
        let lighter = l1.max(l2);
        let darker = l1.min(l2);
        (lighter + 0.05) / (darker + 0.05)
    }
}

/// Convert sRGB to linear RGB (per WCAG 2.1)
fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.03928 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks assistive technology outright
    Serious,
    /// Degrades the experience
    Moderate,
}

/// One audit finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityIssue {
    /// Rule identifier (`missing-alt`, `unlabeled-control`, `low-contrast`)
    pub rule: String,
    /// Severity
    pub severity: Severity,
    /// CSS selector of the offending element
    pub selector: String,
    /// Human-readable description
    pub message: String,
}

/// Audit result for one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityReport {
    /// Number of elements the scan visited
    pub elements_scanned: usize,
    /// Findings, worst first
    pub issues: Vec<AccessibilityIssue>,
}

impl AccessibilityReport {
    /// Whether the page produced no findings
    #[must_use]
    pub fn passes(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of findings at a given severity
    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Raw DOM scan result produced by [`AUDIT_SCRIPT`]
#[derive(Debug, Deserialize)]
struct ScanResult {
    elements_scanned: usize,
    #[serde(default)]
    missing_alt: Vec<String>,
    #[serde(default)]
    unlabeled_controls: Vec<String>,
    #[serde(default)]
    text_samples: Vec<TextSample>,
}

/// One sampled text element with its computed colors
#[derive(Debug, Deserialize)]
struct TextSample {
    selector: String,
    fg: String,
    bg: String,
    #[serde(default)]
    large: bool,
}

/// DOM scan executed in the live page.
///
/// Emits snake_case keys so the result deserializes directly into
/// [`ScanResult`]. Color values are `#rrggbb`; elements with transparent
/// or unresolvable backgrounds are skipped by the script.
pub const AUDIT_SCRIPT: &str = r"
(function () {
  const hex = (rgb) => {
    const m = rgb.match(/rgba?\((\d+),\s*(\d+),\s*(\d+)/);
    if (!m) return null;
    return '#' + [m[1], m[2], m[3]]
      .map((c) => parseInt(c, 10).toString(16).padStart(2, '0'))
      .join('');
  };
  const path = (el) => {
    if (el.id) return '#' + el.id;
    let sel = el.tagName.toLowerCase();
    if (el.className && typeof el.className === 'string') {
      sel += '.' + el.className.trim().split(/\s+/).join('.');
    }
    return sel;
  };
  const all = Array.from(document.querySelectorAll('*'));
  const missing_alt = Array.from(document.querySelectorAll('img:not([alt])')).map(path);
  const unlabeled_controls = Array.from(
    document.querySelectorAll('input:not([type=hidden]), select, textarea')
  )
    .filter((el) => !el.labels || el.labels.length === 0)
    .filter((el) => !el.getAttribute('aria-label') && !el.getAttribute('aria-labelledby'))
    .map(path);
  const text_samples = all
    .filter((el) => el.children.length === 0 && el.textContent.trim().length > 0)
    .slice(0, 200)
    .map((el) => {
      const style = getComputedStyle(el);
      const fg = hex(style.color);
      const bg = hex(style.backgroundColor);
      if (!fg || !bg) return null;
      const size = parseFloat(style.fontSize);
      return { selector: path(el), fg: fg, bg: bg, large: size >= 24 };
    })
    .filter(Boolean);
  return {
    elements_scanned: all.length,
    missing_alt: missing_alt,
    unlabeled_controls: unlabeled_controls,
    text_samples: text_samples
  };
})()
";

/// Run the accessibility scan against the live session.
pub fn audit(driver: &DriverHandle) -> NavegarResult<AccessibilityReport> {
    let value = lock(driver).execute_script(AUDIT_SCRIPT)?;
    let scan: ScanResult = serde_json::from_value(value)?;
    Ok(build_report(scan))
}

fn build_report(scan: ScanResult) -> AccessibilityReport {
    let mut issues = Vec::new();

    for selector in scan.missing_alt {
        issues.push(AccessibilityIssue {
            rule: "missing-alt".to_string(),
            severity: Severity::Serious,
            selector,
            message: "image has no alternative text".to_string(),
        });
    }
    for selector in scan.unlabeled_controls {
        issues.push(AccessibilityIssue {
            rule: "unlabeled-control".to_string(),
            severity: Severity::Serious,
            selector,
            message: "form control has no accessible label".to_string(),
        });
    }
    for sample in scan.text_samples {
        let (Some(fg), Some(bg)) = (Color::parse_hex(&sample.fg), Color::parse_hex(&sample.bg))
        else {
            continue;
        };
        let ratio = fg.contrast_ratio(&bg);
        let minimum = if sample.large {
            MIN_CONTRAST_LARGE
        } else {
            MIN_CONTRAST_NORMAL
        };
        if ratio < minimum {
            issues.push(AccessibilityIssue {
                rule: "low-contrast".to_string(),
                severity: Severity::Moderate,
                selector: sample.selector,
                message: format!("contrast ratio {ratio:.2} is below the AA minimum {minimum}"),
            });
        }
    }

    AccessibilityReport {
        elements_scanned: scan.elements_scanned,
        issues,
    }
}
