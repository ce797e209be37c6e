mod message;

pub use self::message::{Direction, Message, millis_to_datetime};
