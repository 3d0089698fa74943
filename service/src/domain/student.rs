use crate::domain::error::{ErrorResponse, FieldErrors};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stored student. `photo` holds raw image bytes, never text.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub mobile_no: String,
    pub photo: Option<Vec<u8>>,
}

/// A student that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub birth_date: NaiveDate,
    pub mobile_no: String,
    pub photo: Option<Vec<u8>>,
}

impl NewStudent {
    pub fn with_id(self, id: u64) -> Student {
        Student {
            id,
            name: self.name,
            birth_date: self.birth_date,
            mobile_no: self.mobile_no,
            photo: self.photo,
        }
    }
}

/// Outbound representation. `photo_base64` is derived per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: u64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub mobile_no: String,
    pub photo_base64: Option<String>,
}

/// Inbound body for create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub mobile_no: Option<String>,
    pub photo_base64: Option<String>,
}

/// A payload whose required fields are all present.
#[derive(Debug, Clone)]
pub struct ValidStudent {
    pub name: String,
    pub birth_date: NaiveDate,
    pub mobile_no: String,
    pub photo_base64: Option<String>,
}

impl StudentPayload {
    pub fn validate(self) -> Result<ValidStudent, ErrorResponse> {
        let mut errors = FieldErrors::new();
        let name = self.name.filter(|name| !name.trim().is_empty());
        let mobile_no = self.mobile_no.filter(|mobile_no| !mobile_no.trim().is_empty());

        if name.is_none() {
            errors.insert("name", "Name cannot be empty");
        }
        if self.birth_date.is_none() {
            errors.insert("birthDate", "Birth date cannot be empty");
        }
        if mobile_no.is_none() {
            errors.insert("mobileNo", "Mobile number cannot be empty");
        }

        match (name, self.birth_date, mobile_no) {
            (Some(name), Some(birth_date), Some(mobile_no)) => Ok(ValidStudent {
                name,
                birth_date,
                mobile_no,
                photo_base64: self.photo_base64,
            }),
            _ => Err(ErrorResponse::ValidationError { errors }),
        }
    }
}
