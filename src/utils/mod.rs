pub mod code_generator;
pub mod email;

pub use code_generator::{canonicalize_code, generate_unique_personal_code, personal_code_candidate};
pub use email::{canonicalize_email, is_valid_email};
