pub mod ai;
pub mod calendar;
pub mod dates;
pub mod http;
pub mod identity;
pub mod locks;
pub mod phone;
pub mod pipeline;
pub mod records;
pub mod reminders;
