pub mod attendance;
pub mod cookies;
pub mod filename;
pub mod hash;
pub mod jwt;
pub mod lookup;
pub mod notify;
pub mod upload;
