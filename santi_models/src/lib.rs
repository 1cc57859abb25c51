pub mod contact;
pub mod environment;
