pub mod json_sanitizer;
