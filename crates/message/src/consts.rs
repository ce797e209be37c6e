/// Send/receive timestamps and the direction flag.
pub(crate) const FIELD_TIMING: u8 = 1;
/// Correspondent phone number.
pub(crate) const FIELD_NUMBER: u8 = 2;
/// Message body, in the encoding named by [`FIELD_ENCODING`].
pub(crate) const FIELD_BODY: u8 = 4;
pub(crate) const FIELD_ENCODING: u8 = 7;

/// Smallest timing field that holds both timestamps.
pub(crate) const TIMING_MIN_LEN: usize = 29;
pub(crate) const TIMING_FIRST_OFFSET: usize = 13;
pub(crate) const TIMING_SECOND_OFFSET: usize = 21;
/// Direction flag value for a message sent from the device.
pub(crate) const TIMING_OUTGOING: u8 = 0;

/// The number field carries four bytes of address metadata before the
/// digits, and a terminator after them.
pub(crate) const NUMBER_OFFSET: usize = 4;
pub(crate) const NUMBER_MIN_LEN: usize = NUMBER_OFFSET + 1;
