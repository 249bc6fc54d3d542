pub mod address;
pub mod artist;
pub mod attendance;
pub mod attraction;
pub mod auth;
pub mod course;
pub mod dashboard;
pub mod document;
pub mod fair;
pub mod notification;
pub mod sale_point;
pub mod shared;
pub mod statement;
pub mod user;
