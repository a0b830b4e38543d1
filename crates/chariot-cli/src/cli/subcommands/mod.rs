mod equipment;
mod inspection;
mod ticket;

pub use equipment::EquipmentCommands;
pub use inspection::InspectionCommands;
pub use ticket::TicketCommands;
