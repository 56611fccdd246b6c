pub mod draft;
pub mod quiz;
pub mod response;
pub mod user;
