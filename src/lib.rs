//! VietQR payment payloads: the EMVCo/NAPAS tag-length-value string with its
//! CRC-16/CCITT-FALSE trailer, as encoded into bank transfer QR codes.

pub mod banks;
pub mod crc16;
pub mod dispatcher;
pub mod error;
pub mod payload;
pub mod reference;
pub mod tlv;
pub mod validate;

pub use crc16::calculate_crc16;
pub use error::{StructuralMismatch, TlvError, ValidationError};
pub use payload::{generate_vietqr_string, PayloadBuilder, PaymentRequest, Template};
pub use tlv::build_tlv;
pub use validate::{decode_payload, validate_vietqr, Validation};
