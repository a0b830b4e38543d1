pub mod dispatch;
pub mod equipment;
pub mod fleet;
pub mod inspect;
pub mod inspection;
pub mod shared;
pub mod ticket;
