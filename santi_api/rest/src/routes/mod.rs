pub mod contact;
pub mod fallback;
pub mod health;
