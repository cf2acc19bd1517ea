pub mod product;

use serde::Serialize;

use crate::dtos::product::Pagination;

// Uniform success envelope; errors use the envelope in error.rs
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub success: bool,
    pub message: &'static str,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PagedResponse<T> {
    pub fn new(message: &'static str, data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            message,
            data,
            pagination,
        }
    }
}
