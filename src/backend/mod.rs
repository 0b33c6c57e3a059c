pub mod client;
pub mod dto;
pub mod endpoints;

pub use client::{ApiError, ApiRequest, BackendClient, FilePart, MultipartBody};
