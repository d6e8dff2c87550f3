use super::ApiError;

pub fn validate_id(resource: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::not_found(resource, id));
    }
    Ok(id)
}

pub fn missing_field(field: &str) -> ApiError {
    ApiError::validation(format!("{field}: This field is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("recipe", 1).unwrap(), 1);
        assert!(matches!(
            validate_id("recipe", 0),
            Err(ApiError::NotFound(_))
        ));
        assert!(validate_id("tag", -5).is_err());
    }

    #[test]
    fn test_missing_field_message() {
        let err = missing_field("name");
        assert!(matches!(err, ApiError::ValidationError(ref m) if m == "name: This field is required"));
    }
}
