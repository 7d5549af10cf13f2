use validator::ValidationErrors;

use crate::error::{SubmissionError, SubmissionResult};

/// Trimmed value of a required text field.
pub fn require_text(field: &str, value: Option<&str>) -> SubmissionResult<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(SubmissionError::validation(
            field,
            format!("{} is required", field),
        ));
    }
    Ok(trimmed.to_string())
}

/// Collapses validator output into the first failing field, following
/// `field_order`; fields outside that list come after it, alphabetically.
pub fn first_field_error(errors: &ValidationErrors, field_order: &[&str]) -> SubmissionError {
    let field_errors = errors.field_errors();

    let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
    fields.sort_by_key(|field| {
        (
            field_order.iter().position(|f| f == field).unwrap_or(usize::MAX),
            field.to_string(),
        )
    });

    fields
        .first()
        .and_then(|field| {
            field_errors.get(*field).and_then(|errs| errs.first()).map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                SubmissionError::validation(*field, message)
            })
        })
        .unwrap_or_else(|| SubmissionError::validation("body", "Invalid submission"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(length(min = 1))]
        categories: String,
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", Some("  Chess Club ")).unwrap(), "Chess Club");
        let err = require_text("location", Some("   ")).unwrap_err();
        assert_eq!(err.field(), Some("location"));
        assert!(require_text("location", None).is_err());
    }

    #[test]
    fn test_first_field_error_follows_order() {
        let form = Form {
            name: String::new(),
            categories: String::new(),
        };
        let errors = form.validate().unwrap_err();

        let err = first_field_error(&errors, &["name", "categories"]);
        assert!(matches!(
            err,
            SubmissionError::Validation { ref field, ref message } if field == "name" && message == "Name is required"
        ));

        let err = first_field_error(&errors, &["categories", "name"]);
        assert_eq!(err.field(), Some("categories"));
    }
}
