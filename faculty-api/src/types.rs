//! Request and response types for the HTTP surface.

use faculty_core::{NewLesson, ValidationError};
use serde::{Deserialize, Serialize};

/// Body of `PUT /add-lesson`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLessonRequest {
    pub name: String,
    pub teacher_id: i64,
}

impl CreateLessonRequest {
    /// Validate into an insertable lesson.
    pub fn validate(self) -> Result<NewLesson, ValidationError> {
        NewLesson::new(self.name, self.teacher_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_request() -> Result<(), serde_json::Error> {
        let req: CreateLessonRequest =
            serde_json::from_str(r#"{"name":"Calculus","teacher_id":1}"#)?;
        assert_eq!(req.name, "Calculus");
        assert_eq!(req.teacher_id, 1);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let blank = CreateLessonRequest {
            name: "  ".to_string(),
            teacher_id: 1,
        };
        assert!(matches!(
            blank.validate(),
            Err(ValidationError::RequiredFieldMissing { .. })
        ));

        let orphan = CreateLessonRequest {
            name: "Calculus".to_string(),
            teacher_id: 0,
        };
        assert!(matches!(
            orphan.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
