//! Protocol definitions for meter communication.
//!
//! This module contains the low-level protocol types including:
//! - Frame encoding/decoding
//! - Byte stream scanning and resynchronisation
//! - Command opcodes
//! - Payload and timestamp decoding

pub mod command;
pub mod frame;
pub mod parser;
pub mod scanner;
pub mod timestamp;

pub use command::{CommandOpcode, WAKEUP_CODE};
pub use frame::{
    FRAME_ACK, FRAME_SIZE, FRAME_START, FRAME_STOP, Payload, decode_short_frame,
    encode as encode_frame, encode_ack,
};
pub use parser::{
    encode_index_payload, parse_project_code, parse_record_value, parse_serial_number,
    parse_stored_count,
};
pub use scanner::{FrameScanner, Scan};
pub use timestamp::{
    decode_record_timestamp, decode_system_clock, encode_system_clock, is_empty_record,
};
