//! Core entity structures

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{LessonId, TeacherId};

/// Teacher record as returned by a lesson lookup.
///
/// This is also the exact JSON shape stored in the cache and returned over
/// HTTP: `{"name": .., "surname": .., "degree": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    pub surname: String,
    pub degree: String,
}

impl Teacher {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        degree: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            degree: degree.into(),
        }
    }
}

/// A stored lesson row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_id: LessonId,
    pub name: String,
    pub teacher_id: TeacherId,
}

/// Validated payload for inserting a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLesson {
    pub name: String,
    pub teacher_id: TeacherId,
}

impl NewLesson {
    /// Validate raw request fields into an insertable lesson.
    pub fn new(name: impl Into<String>, teacher_id: i64) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            });
        }
        let teacher_id = TeacherId::new(teacher_id).map_err(|e| ValidationError::InvalidValue {
            field: "teacher_id".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { name, teacher_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_json_shape() -> Result<(), serde_json::Error> {
        let teacher = Teacher::new("Jane", "Doe", "PhD");
        let json = serde_json::to_string(&teacher)?;
        assert_eq!(json, r#"{"name":"Jane","surname":"Doe","degree":"PhD"}"#);

        let back: Teacher = serde_json::from_str(&json)?;
        assert_eq!(back, teacher);
        Ok(())
    }

    #[test]
    fn test_teacher_rejects_incomplete_payload() {
        assert!(serde_json::from_str::<Teacher>(r#"{"name":"Jane"}"#).is_err());
        assert!(serde_json::from_str::<Teacher>("not json").is_err());
    }

    #[test]
    fn test_new_lesson_validation() {
        let lesson = NewLesson::new("Calculus", 3).expect("valid lesson");
        assert_eq!(lesson.teacher_id.get(), 3);

        assert!(matches!(
            NewLesson::new("   ", 3),
            Err(ValidationError::RequiredFieldMissing { .. })
        ));
        assert!(matches!(
            NewLesson::new("Calculus", 0),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
