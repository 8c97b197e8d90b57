pub mod collection;

/// Postman collection format the emitted file conforms to.
pub const COLLECTION_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Host placeholder every request URL starts with.
pub const BASE_URL_PLACEHOLDER: &str = "{{baseUrl}}";
