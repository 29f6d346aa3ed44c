use serde::Serialize;

use crate::{
    crc16::{calculate_crc16, crc16, parse_crc},
    error::StructuralMismatch,
    payload::{
        Payload, PayloadField, COUNTRY_VN, CRC_HEADER, CURRENCY_VND, DYNAMIC_QR,
        FORMAT_INDICATOR, STATIC_QR,
    },
    tlv::parse_tlv,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parses `payload`, re-checks its CRC, field order and the fixed VND/VN fields.
/// Checks run in a fixed order and the first failure is returned.
pub fn decode_payload(payload: &str) -> Result<Payload, StructuralMismatch> {
    let indicator = format!(
        "{}02{}",
        PayloadField::FormatIndicator.tag(),
        FORMAT_INDICATOR
    );

    if !payload.starts_with(&indicator) {
        return Err(StructuralMismatch::FormatIndicator);
    }

    let fields = parse_tlv(payload)?;

    let crc_field = match fields.last() {
        Some(f) if f.t == PayloadField::Crc.tag() && f.v.len() == 4 => f,
        _ => return Err(StructuralMismatch::MissingCrc),
    };

    let found = parse_crc(&crc_field.v).ok_or(StructuralMismatch::MissingCrc)?;
    let covered = &payload[..payload.len() - crc_field.v.len()];

    // Coverage ends with the CRC field's own tag and length
    debug_assert!(covered.ends_with(CRC_HEADER));

    if crc16(covered.as_bytes()) != found {
        return Err(StructuralMismatch::CrcMismatch {
            expected: calculate_crc16(covered),
            found: crc_field.v.clone(),
        });
    }

    // Known tags must follow emission order; unknown tags may sit anywhere before the CRC
    let mut last = None;
    for f in &fields {
        if let Some(pos) = PayloadField::from_tag(&f.t).map(|p| p.position()) {
            if last.is_some_and(|l| pos <= l) {
                return Err(StructuralMismatch::FieldOrder(f.t.clone()));
            }
            last = Some(pos);
        }
    }

    let payload = Payload { fields };

    match payload.get(PayloadField::InitiationMethod) {
        Some(STATIC_QR) | Some(DYNAMIC_QR) => {}
        _ => return Err(StructuralMismatch::InitiationMethod),
    }

    if payload.get(PayloadField::Currency) != Some(CURRENCY_VND) {
        return Err(StructuralMismatch::NotVnd);
    }

    if payload.get(PayloadField::Country) != Some(COUNTRY_VN) {
        return Err(StructuralMismatch::NotVietnam);
    }

    if let Some(additional) = payload.get(PayloadField::AdditionalData) {
        parse_tlv(additional)?;
    }

    Ok(payload)
}

pub fn validate_vietqr(payload: &str) -> Validation {
    match decode_payload(payload) {
        Ok(_) => Validation {
            valid: true,
            error: None,
        },
        Err(e) => Validation {
            valid: false,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::TlvError,
        payload::{generate_vietqr_string, PaymentRequest},
        tlv::build_tlvs,
        tlv::Tlv,
    };
    use pretty_assertions::assert_eq;

    fn tuition() -> PaymentRequest {
        PaymentRequest {
            amount: Some(1_500_000.0),
            transaction_id: Some(String::from("PT202501001")),
            purpose: Some(String::from("Hoc phi HK1")),
            ..PaymentRequest::new("970415", "001100223344")
        }
    }

    /// Assembles fields and appends a correct CRC.
    fn sign(fields: &[Tlv]) -> String {
        let body = format!("{}{}", build_tlvs(fields).unwrap(), CRC_HEADER);
        let crc = calculate_crc16(&body);
        body + &crc
    }

    fn error_of(payload: &str) -> Option<String> {
        validate_vietqr(payload).error
    }

    #[test]
    fn accepts_generated_payloads() {
        let requests = [
            tuition(),
            PaymentRequest::new("970436", "0011002233"),
            PaymentRequest {
                amount: Some(250_000.0),
                ..PaymentRequest::new("970422", "888866669999")
            },
        ];

        for request in requests {
            let s = generate_vietqr_string(&request).unwrap();

            assert_eq!(
                validate_vietqr(&s),
                Validation {
                    valid: true,
                    error: None
                }
            );
        }
    }

    #[test]
    fn decodes_generated_payload() {
        let payload = decode_payload(&generate_vietqr_string(&tuition()).unwrap()).unwrap();

        assert!(payload.is_dynamic());
        assert_eq!(payload.amount_units(), Some(150_000_000));
        assert_eq!(payload.bill_number(), Some("PT202501001"));
        assert_eq!(payload.reference().as_deref(), Some("PT202501001"));
        assert_eq!(payload.purpose().as_deref(), Some("Hoc phi HK1"));
        assert_eq!(payload.crc().map(str::len), Some(4));
    }

    #[test]
    fn rejects_wrong_format_indicator() {
        assert_eq!(
            error_of("010211"),
            Some(String::from("invalid payload format indicator"))
        );
        assert_eq!(
            error_of(""),
            Some(String::from("invalid payload format indicator"))
        );
    }

    #[test]
    fn rejects_missing_crc() {
        let unsigned = build_tlvs(&[
            Tlv::new("00", "01"),
            Tlv::new("53", "704"),
            Tlv::new("58", "VN"),
        ])
        .unwrap();

        assert_eq!(error_of(&unsigned), Some(String::from("missing CRC")));
    }

    #[test]
    fn substring_63_is_not_a_crc() {
        // "63" appears inside a value but no CRC field terminates the payload
        let s = build_tlvs(&[
            Tlv::new("00", "01"),
            Tlv::new("53", "704"),
            Tlv::new("57", "6304ABCD"),
            Tlv::new("58", "VN"),
        ])
        .unwrap();

        assert_eq!(error_of(&s), Some(String::from("missing CRC")));
    }

    #[test]
    fn detects_tampering() {
        let s = generate_vietqr_string(&tuition()).unwrap();
        let tampered = s.replacen("150000000", "950000000", 1);

        let error = error_of(&tampered).unwrap();
        assert!(error.starts_with("CRC mismatch"), "{}", error);
    }

    #[test]
    fn accepts_lowercase_crc() {
        let s = generate_vietqr_string(&tuition()).unwrap();
        let (body, crc) = s.split_at(s.len() - 4);

        assert!(validate_vietqr(&format!("{}{}", body, crc.to_lowercase())).valid);
    }

    #[test]
    fn rejects_other_currency() {
        let s = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "11"),
            Tlv::new("53", "840"),
            Tlv::new("58", "VN"),
        ]);

        assert_eq!(error_of(&s), Some(String::from("not a VND transaction")));
    }

    #[test]
    fn rejects_other_country() {
        let s = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "11"),
            Tlv::new("53", "704"),
            Tlv::new("58", "TH"),
        ]);

        assert_eq!(error_of(&s), Some(String::from("not a Vietnam transaction")));
    }

    #[test]
    fn currency_check_runs_before_country_check() {
        let s = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "11"),
            Tlv::new("58", "TH"),
        ]);

        assert_eq!(decode_payload(&s), Err(StructuralMismatch::NotVnd));
    }

    #[test]
    fn reports_malformed_structure() {
        assert_eq!(
            decode_payload("000201530"),
            Err(StructuralMismatch::Malformed(TlvError::Truncated { offset: 6 }))
        );
    }

    #[test]
    fn rejects_malformed_additional_data() {
        let s = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "11"),
            Tlv::new("53", "704"),
            Tlv::new("58", "VN"),
            Tlv::new("62", "0199"),
        ]);

        assert!(matches!(
            decode_payload(&s),
            Err(StructuralMismatch::Malformed(TlvError::Truncated { .. }))
        ));
    }

    #[test]
    fn rejects_repeated_currency() {
        let s = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "11"),
            Tlv::new("53", "704"),
            Tlv::new("53", "840"),
            Tlv::new("58", "VN"),
        ]);

        assert_eq!(
            decode_payload(&s),
            Err(StructuralMismatch::FieldOrder(String::from("53")))
        );
    }

    #[test]
    fn rejects_out_of_order_fields() {
        let s = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "11"),
            Tlv::new("58", "VN"),
            Tlv::new("53", "704"),
        ]);

        assert_eq!(
            error_of(&s),
            Some(String::from("field 53 is repeated or out of order"))
        );
    }

    #[test]
    fn allows_unknown_tags_between_known_fields() {
        let s = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "12"),
            Tlv::new("38", "0006970415"),
            Tlv::new("53", "704"),
            Tlv::new("58", "VN"),
        ]);

        assert!(validate_vietqr(&s).valid);
    }

    #[test]
    fn requires_initiation_method() {
        let missing = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("53", "704"),
            Tlv::new("58", "VN"),
        ]);
        let bogus = sign(&[
            Tlv::new("00", "01"),
            Tlv::new("01", "99"),
            Tlv::new("53", "704"),
            Tlv::new("58", "VN"),
        ]);

        assert_eq!(decode_payload(&missing), Err(StructuralMismatch::InitiationMethod));
        assert_eq!(decode_payload(&bogus), Err(StructuralMismatch::InitiationMethod));
    }

    #[test]
    fn validation_serializes_without_null_error() {
        let json = serde_json::to_string(&validate_vietqr(
            &generate_vietqr_string(&tuition()).unwrap(),
        ))
        .unwrap();

        assert_eq!(json, r#"{"valid":true}"#);
    }
}
