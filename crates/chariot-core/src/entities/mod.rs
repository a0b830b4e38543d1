//! Entity structs for all Chariot domain records.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! persistence and schema validation.

mod equipment;
mod inspection;
mod question;
mod response;
mod ticket;

pub use equipment::Equipment;
pub use inspection::Inspection;
pub use question::{AnswerChoice, InspectionQuestion, QuestionScope};
pub use response::{QuestionResponse, ResponseOutcome};
pub use ticket::MaintenanceAction;
