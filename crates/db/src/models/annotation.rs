//! Annotation model: the flat storage row and its conversion back into the
//! variant type.
//!
//! The nullable-column shape exists only here, at the persistence boundary;
//! everything above works with [`Placement`].

use pagemark_core::annotation::{AnnotationType, Placement};
use pagemark_core::error::CoreError;
use pagemark_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `annotations` table.
///
/// Exactly one variant's column set is populated, guaranteed by the
/// `ck_annotations_variant_shape` check constraint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Annotation {
    pub id: DbId,
    pub document_id: DbId,
    pub annotation_type: String,
    pub page: Option<i32>,
    pub x_percent: Option<f64>,
    pub y_percent: Option<f64>,
    pub x_pixel: Option<i32>,
    pub y_pixel: Option<i32>,
    pub color: Option<String>,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Annotation {
    /// Reassemble the variant type from the flat columns.
    ///
    /// A row that violates the storage shape constraint surfaces as an
    /// internal error; the constraint makes that unreachable in practice.
    pub fn placement(&self) -> Result<Placement, CoreError> {
        match AnnotationType::from_str(&self.annotation_type)? {
            AnnotationType::Document => match (self.page, self.x_percent, self.y_percent) {
                (Some(page), Some(x_percent), Some(y_percent)) => Ok(Placement::Document {
                    page,
                    x_percent,
                    y_percent,
                }),
                _ => Err(CoreError::Internal(format!(
                    "annotation {} is missing document placement fields",
                    self.id
                ))),
            },
            AnnotationType::Image => match (self.x_pixel, self.y_pixel) {
                (Some(x_pixel), Some(y_pixel)) => Ok(Placement::Image {
                    x_pixel,
                    y_pixel,
                    color: self.color.clone(),
                }),
                _ => Err(CoreError::Internal(format!(
                    "annotation {} is missing image placement fields",
                    self.id
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(annotation_type: &str) -> Annotation {
        Annotation {
            id: 1,
            document_id: 1,
            annotation_type: annotation_type.to_string(),
            page: None,
            x_percent: None,
            y_percent: None,
            x_pixel: None,
            y_pixel: None,
            color: None,
            content: "note".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn document_row_converts_to_placement() {
        let annotation = Annotation {
            page: Some(3),
            x_percent: Some(50.5),
            y_percent: Some(75.25),
            ..row("document")
        };
        assert_eq!(
            annotation.placement().unwrap(),
            Placement::Document {
                page: 3,
                x_percent: 50.5,
                y_percent: 75.25
            }
        );
    }

    #[test]
    fn image_row_converts_to_placement() {
        let annotation = Annotation {
            x_pixel: Some(320),
            y_pixel: Some(480),
            color: Some("#FF5733".to_string()),
            ..row("image")
        };
        assert_eq!(
            annotation.placement().unwrap(),
            Placement::Image {
                x_pixel: 320,
                y_pixel: 480,
                color: Some("#FF5733".to_string())
            }
        );
    }

    #[test]
    fn malformed_document_row_is_internal_error() {
        let annotation = Annotation {
            page: Some(1),
            ..row("document")
        };
        assert!(matches!(
            annotation.placement(),
            Err(CoreError::Internal(_))
        ));
    }

    #[test]
    fn malformed_image_row_is_internal_error() {
        assert!(matches!(row("image").placement(), Err(CoreError::Internal(_))));
    }
}
