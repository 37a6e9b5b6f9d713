use std::error::Error;

pub mod accounts;
pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;
pub mod openapi;
pub mod photos;
pub mod routes;
pub mod s3;

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}

pub fn get_s3_url(service: &str, bucket: &str, key: &str) -> String {
    match service {
        "t3" => format!("https://{}.t3.storage.dev/{}", bucket, key),
        "s3" => format!("https://{}.s3.amazonaws.com/{}", bucket, key),
        _ => format!("https://{}.storage.dev/{}", service, key),
    }
}
