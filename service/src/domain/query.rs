use crate::domain::error::ErrorResponse;
use crate::domain::page::{PageRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use std::collections::HashMap;

/// Percent-decoded query string. When a key repeats, the first value wins.
#[derive(Debug, Default)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

pub fn decode(query: Option<&str>) -> QueryParams {
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    QueryParams { params }
}

impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn required(&self, key: &str) -> Result<&str, ErrorResponse> {
        self.get(key).ok_or_else(|| {
            ErrorResponse::bad_request(format!("Required parameter '{key}' is not present"))
        })
    }

    pub fn page_request(&self) -> Result<PageRequest, ErrorResponse> {
        let page = self.number("page", DEFAULT_PAGE as i64)?;
        let size = self.number("size", DEFAULT_PAGE_SIZE as i64)?;
        if page < 0 {
            return Err(ErrorResponse::bad_request(
                "Page index must not be less than zero",
            ));
        }
        if size < 1 {
            return Err(ErrorResponse::bad_request(
                "Page size must not be less than one",
            ));
        }
        Ok(PageRequest {
            page: page as usize,
            size: size as usize,
        })
    }

    fn number(&self, key: &str, default: i64) -> Result<i64, ErrorResponse> {
        match self.get(key) {
            Some(raw) => str::parse::<i64>(raw.trim()).map_err(|_| {
                ErrorResponse::bad_request(format!("Parameter '{key}' must be a number: '{raw}'"))
            }),
            None => Ok(default),
        }
    }
}
