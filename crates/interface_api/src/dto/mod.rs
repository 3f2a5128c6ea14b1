//! Request and response bodies

pub mod invoice;
pub mod time_record;
