pub mod appointment;
pub mod enums;
pub mod feedback;
pub mod nlp_result;
pub mod profile;
pub mod remark;
pub mod scope;
pub mod user;
pub mod visit;

pub use appointment::*;
pub use enums::*;
pub use feedback::*;
pub use nlp_result::*;
pub use profile::*;
pub use remark::*;
pub use scope::*;
pub use user::*;
pub use visit::*;
