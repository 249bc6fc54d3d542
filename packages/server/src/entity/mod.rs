pub mod absence;
pub mod address;
pub mod artist;
pub mod attraction;
pub mod course;
pub mod course_presence;
pub mod document;
pub mod fair;
pub mod justification;
pub mod notification;
pub mod sale_point;
pub mod statement;
pub mod user;
