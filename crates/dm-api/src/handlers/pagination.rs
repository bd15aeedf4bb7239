use crate::error::ApiError;

const MAX_LIMIT: usize = 200;
const MAX_OFFSET: usize = 10_000;
pub const MAX_TOP_N: usize = 100;

pub fn validate_pagination(limit: usize, offset: usize) -> Result<(usize, usize), ApiError> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    if offset > MAX_OFFSET {
        return Err(ApiError::BadRequest(format!(
            "offset must be between 0 and {MAX_OFFSET}"
        )));
    }

    Ok((limit, offset))
}

pub fn validate_top_n(top_n: usize) -> Result<usize, ApiError> {
    if (1..=MAX_TOP_N).contains(&top_n) {
        Ok(top_n)
    } else {
        Err(ApiError::BadRequest(format!(
            "top_n must be between 1 and {MAX_TOP_N}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(validate_pagination(1, 0).unwrap(), (1, 0));
        assert_eq!(validate_pagination(200, 10_000).unwrap(), (200, 10_000));
        assert_eq!(validate_top_n(100).unwrap(), 100);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(validate_pagination(0, 0).is_err());
        assert!(validate_pagination(201, 0).is_err());
        assert!(validate_pagination(10, 10_001).is_err());
        assert!(validate_top_n(0).is_err());
        assert!(validate_top_n(101).is_err());
    }
}
