pub mod donation;
pub mod location;
pub mod receiver_request;
