//! Annotation variant model and validation.
//!
//! An annotation is anchored either to a page position inside a paginated
//! document (percentage coordinates) or to a pixel position inside an image.
//! The two shapes are mutually exclusive; [`Placement`] makes the illegal
//! mixed states unrepresentable above the storage layer.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of annotation content, in characters, after trimming.
pub const MAX_CONTENT_LENGTH: usize = 5000;

/// Upper bound for percentage coordinates.
pub const MAX_PERCENT: f64 = 100.0;

// ---------------------------------------------------------------------------
// Annotation type discriminator
// ---------------------------------------------------------------------------

/// The two annotation variants. The enumeration is closed; anything else is
/// rejected at the schema boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationType {
    Document,
    Image,
}

impl AnnotationType {
    /// Return the discriminator as its lowercase storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Image => "image",
        }
    }

    /// Parse a discriminator from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "document" => Ok(Self::Document),
            "image" => Ok(Self::Image),
            _ => Err(CoreError::Validation(format!(
                "Invalid annotation_type '{s}'. Must be 'document' or 'image'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Placement (the tagged variant payload)
// ---------------------------------------------------------------------------

/// Where an annotation is anchored. Exactly one variant's field set exists;
/// the flat nullable-column row shape appears only at the persistence
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "annotation_type", rename_all = "snake_case")]
pub enum Placement {
    /// Page-based position inside a paginated document.
    Document {
        page: i32,
        x_percent: f64,
        y_percent: f64,
    },
    /// Pixel position inside an image, with an optional marker color.
    Image {
        x_pixel: i32,
        y_pixel: i32,
        color: Option<String>,
    },
}

impl Placement {
    /// The discriminator for this placement.
    pub fn kind(&self) -> AnnotationType {
        match self {
            Self::Document { .. } => AnnotationType::Document,
            Self::Image { .. } => AnnotationType::Image,
        }
    }

    /// Validate all coordinate fields and return the normalized placement
    /// (percentages rounded to two decimals).
    pub fn validated(self) -> Result<Self, CoreError> {
        match self {
            Self::Document {
                page,
                x_percent,
                y_percent,
            } => {
                validate_page(page)?;
                let x_percent = validate_percent("x_percent", x_percent)?;
                let y_percent = validate_percent("y_percent", y_percent)?;
                Ok(Self::Document {
                    page,
                    x_percent,
                    y_percent,
                })
            }
            Self::Image {
                x_pixel,
                y_pixel,
                color,
            } => {
                validate_pixel("x_pixel", x_pixel)?;
                validate_pixel("y_pixel", y_pixel)?;
                if let Some(ref color) = color {
                    validate_color_hex(color)?;
                }
                Ok(Self::Image {
                    x_pixel,
                    y_pixel,
                    color,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Payload for creating a new annotation. The placement fields sit flat next
/// to `document_id` and `content` on the wire, discriminated by
/// `annotation_type`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnotation {
    pub document_id: DbId,
    pub content: String,
    #[serde(flatten)]
    pub placement: Placement,
}

/// Sparse update for an existing annotation.
///
/// Every field is doubly optional so an absent field is distinct from an
/// explicit null: `None` means "leave unchanged", `Some(None)` means "set to
/// null", `Some(Some(v))` means "set to v". Only `color` may legally be set
/// to null (clearing it); required fields reject explicit nulls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationPatch {
    #[serde(default, deserialize_with = "present")]
    pub page: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub x_percent: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub y_percent: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub x_pixel: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub y_pixel: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Option<String>>,
}

/// Deserialize a field that was present in the payload, keeping explicit
/// nulls: the outer `Option` records presence, the inner one the value.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl AnnotationPatch {
    /// Reject the whole patch if it touches fields belonging to the other
    /// variant. Presence counts even when the value is null.
    pub fn check_against(&self, kind: AnnotationType) -> Result<(), CoreError> {
        match kind {
            AnnotationType::Document => {
                if self.x_pixel.is_some() || self.y_pixel.is_some() || self.color.is_some() {
                    return Err(CoreError::InvalidOperation(
                        "Cannot update pixel coordinates or color on a document annotation"
                            .to_string(),
                    ));
                }
            }
            AnnotationType::Image => {
                if self.page.is_some() || self.x_percent.is_some() || self.y_percent.is_some() {
                    return Err(CoreError::InvalidOperation(
                        "Cannot update page or percentage coordinates on an image annotation"
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate every present field and return the normalized patch (content
    /// trimmed, percentages rounded). Explicit nulls are rejected for all
    /// fields except `color`, which they clear.
    pub fn validated(self) -> Result<Self, CoreError> {
        let page = match self.page {
            Some(Some(page)) => {
                validate_page(page)?;
                Some(Some(page))
            }
            Some(None) => return Err(null_field_error("page")),
            None => None,
        };
        let x_percent = match self.x_percent {
            Some(Some(v)) => Some(Some(validate_percent("x_percent", v)?)),
            Some(None) => return Err(null_field_error("x_percent")),
            None => None,
        };
        let y_percent = match self.y_percent {
            Some(Some(v)) => Some(Some(validate_percent("y_percent", v)?)),
            Some(None) => return Err(null_field_error("y_percent")),
            None => None,
        };
        let x_pixel = match self.x_pixel {
            Some(Some(v)) => {
                validate_pixel("x_pixel", v)?;
                Some(Some(v))
            }
            Some(None) => return Err(null_field_error("x_pixel")),
            None => None,
        };
        let y_pixel = match self.y_pixel {
            Some(Some(v)) => {
                validate_pixel("y_pixel", v)?;
                Some(Some(v))
            }
            Some(None) => return Err(null_field_error("y_pixel")),
            None => None,
        };
        let color = match self.color {
            Some(Some(color)) => {
                validate_color_hex(&color)?;
                Some(Some(color))
            }
            // Explicit null clears the color.
            Some(None) => Some(None),
            None => None,
        };
        let content = match self.content {
            Some(Some(content)) => Some(Some(validate_content(&content)?)),
            Some(None) => return Err(null_field_error("content")),
            None => None,
        };

        Ok(Self {
            page,
            x_percent,
            y_percent,
            x_pixel,
            y_pixel,
            color,
            content,
        })
    }
}

fn null_field_error(field: &str) -> CoreError {
    CoreError::Validation(format!("{field} cannot be set to null"))
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate annotation content and return the trimmed value.
///
/// The trimmed content must be 1 to [`MAX_CONTENT_LENGTH`] characters.
pub fn validate_content(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Annotation content cannot be empty or whitespace only".to_string(),
        ));
    }
    let length = trimmed.chars().count();
    if length > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Annotation content has {length} characters, maximum is {MAX_CONTENT_LENGTH}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate that a page number is 1-indexed.
pub fn validate_page(page: i32) -> Result<(), CoreError> {
    if page < 1 {
        return Err(CoreError::Validation(format!(
            "page must be >= 1, got {page}"
        )));
    }
    Ok(())
}

/// Validate a percentage coordinate and round it to two decimals.
pub fn validate_percent(field: &str, value: f64) -> Result<f64, CoreError> {
    if value.is_nan() || value.is_infinite() {
        return Err(CoreError::Validation(format!(
            "{field} must be a finite number"
        )));
    }
    if !(0.0..=MAX_PERCENT).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between 0 and {MAX_PERCENT}, got {value}"
        )));
    }
    Ok((value * 100.0).round() / 100.0)
}

/// Validate a pixel coordinate (non-negative).
pub fn validate_pixel(field: &str, value: i32) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{field} must be >= 0, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a color string matches the `#RRGGBB` hex format.
pub fn validate_color_hex(color: &str) -> Result<(), CoreError> {
    if color.len() != 7 || !color.starts_with('#') {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RRGGBB hex format"
        )));
    }
    if !color[1..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must contain only hex digits after '#'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
