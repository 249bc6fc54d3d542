pub mod account;
pub mod attendance;
pub mod document_type;
pub mod error;
pub mod fair_status;
pub mod notification_type;
pub mod storage;

pub use account::{AccountStatus, UserType};
pub use attendance::{AbsenceType, JustificationStanding};
pub use document_type::DocumentType;
pub use error::ParseEnumError;
pub use fair_status::FairStatus;
pub use notification_type::NotificationType;
