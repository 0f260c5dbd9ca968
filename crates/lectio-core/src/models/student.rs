//! Student model
//!
//! A student is the requester of bookings. The `current_branch_id` pointer is
//! a denormalized projection of the branch of their latest open reservation,
//! written only inside the booking transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Student entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique student ID
    pub id: i32,

    /// Full display name
    pub full_name: String,

    /// Phone number, unique, used for identity resolution on the public flow
    pub phone: String,

    /// Optional email address
    pub email: Option<String>,

    /// Branch of the latest open reservation (last write wins)
    pub current_branch_id: Option<i32>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Validate the contact fields
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("Student name cannot be empty".to_string());
        }

        if self.phone.trim().is_empty() {
            return Err("Student phone cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_student() -> Student {
        Student {
            id: 1,
            full_name: "Maria Quispe".to_string(),
            phone: "51999888777".to_string(),
            email: None,
            current_branch_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_student() {
        assert!(sample_student().validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut student = sample_student();
        student.full_name = "   ".to_string();
        assert!(student.validate().is_err());
    }

    #[test]
    fn test_blank_phone_rejected() {
        let mut student = sample_student();
        student.phone = String::new();
        assert!(student.validate().is_err());
    }
}
