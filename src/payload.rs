use serde::{Deserialize, Serialize};

use crate::{
    crc16::calculate_crc16,
    error::ValidationError,
    reference::{ReferenceSource, SystemClock},
    tlv::{build_tlv, build_tlvs, parse_tlv, Tlv},
};

pub const FORMAT_INDICATOR: &str = "01";
pub const STATIC_QR: &str = "11";
pub const DYNAMIC_QR: &str = "12";
pub const CURRENCY_VND: &str = "704";
pub const COUNTRY_VN: &str = "VN";

/// Tag 54 holds at most 13 characters.
pub const MAX_AMOUNT_UNITS: u64 = 9_999_999_999_999;

/// Tag and length of the CRC field, which the checksum itself covers.
pub const CRC_HEADER: &str = "6304";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    FormatIndicator,
    InitiationMethod,
    Currency,
    Amount,
    BillNumber,
    Country,
    AdditionalData,
    Crc,
}

impl PayloadField {
    /// Emission order; each field appears at most once.
    pub const ORDER: [Self; 8] = [
        Self::FormatIndicator,
        Self::InitiationMethod,
        Self::Currency,
        Self::Amount,
        Self::BillNumber,
        Self::Country,
        Self::AdditionalData,
        Self::Crc,
    ];

    pub fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(Self::ORDER.len())
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "00" => Some(Self::FormatIndicator),
            "01" => Some(Self::InitiationMethod),
            "53" => Some(Self::Currency),
            "54" => Some(Self::Amount),
            "57" => Some(Self::BillNumber),
            "58" => Some(Self::Country),
            "62" => Some(Self::AdditionalData),
            "63" => Some(Self::Crc),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::FormatIndicator => "00",
            Self::InitiationMethod => "01",
            Self::Currency => "53",
            Self::Amount => "54",
            Self::BillNumber => "57",
            Self::Country => "58",
            Self::AdditionalData => "62",
            Self::Crc => "63",
        }
    }

    pub fn name(&self) -> String {
        String::from(match self {
            Self::FormatIndicator => "payload_format_indicator",
            Self::InitiationMethod => "point_of_initiation_method",
            Self::Currency => "transaction_currency",
            Self::Amount => "transaction_amount",
            Self::BillNumber => "bill_number",
            Self::Country => "country_code",
            Self::AdditionalData => "additional_data",
            Self::Crc => "crc",
        })
    }
}

/// Sub-tags of the additional-data template (tag 62).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalField {
    Reference,
    Purpose,
}

impl AdditionalField {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Reference => "01",
            Self::Purpose => "08",
        }
    }
}

/// Display layout chosen by the caller. Has no effect on the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Compact,
    Compact2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub bank_bin: String,
    pub account_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    /// Whole VND. Zero or absent leaves the amount to the payer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub template: Template,
}

impl PaymentRequest {
    pub fn new(bank_bin: &str, account_number: &str) -> Self {
        Self {
            bank_bin: bank_bin.to_string(),
            account_number: account_number.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bank_bin.len() != 6 || !self.bank_bin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidBankBin(self.bank_bin.clone()));
        }

        if self.account_number.chars().count() < 6 {
            return Err(ValidationError::InvalidAccountNumber(
                self.account_number.clone(),
            ));
        }

        if let Some(amount) = self.amount {
            if !amount.is_finite()
                || amount < 0.0
                || (amount * 100.0).round() > MAX_AMOUNT_UNITS as f64
            {
                return Err(ValidationError::InvalidAmount(amount));
            }
        }

        Ok(())
    }

    fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Amount in hundredths, the unit carried by tag 54.
    pub fn amount_units(&self) -> Option<u64> {
        self.amount
            .filter(|amount| *amount > 0.0)
            .map(|amount| (amount * 100.0).round() as u64)
    }
}

pub struct PayloadBuilder {
    references: Box<dyn ReferenceSource>,
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl PayloadBuilder {
    pub fn new(references: Box<dyn ReferenceSource>) -> Self {
        Self { references }
    }

    pub fn build(&self, request: &PaymentRequest) -> Result<String, ValidationError> {
        request.validate()?;

        log::debug!(
            "building payload for BIN {} ({:?} template)",
            request.bank_bin,
            request.template
        );

        let amount_units = request.amount_units();

        let mut fields = vec![
            Tlv::new(PayloadField::FormatIndicator.tag(), FORMAT_INDICATOR),
            Tlv::new(
                PayloadField::InitiationMethod.tag(),
                if amount_units.is_some() {
                    DYNAMIC_QR
                } else {
                    STATIC_QR
                },
            ),
            Tlv::new(PayloadField::Currency.tag(), CURRENCY_VND),
        ];

        if let Some(units) = amount_units {
            fields.push(Tlv::new(PayloadField::Amount.tag(), units.to_string()));
        }

        if let Some(id) = request.transaction_id() {
            fields.push(Tlv::new(PayloadField::BillNumber.tag(), id));
        }

        fields.push(Tlv::new(PayloadField::Country.tag(), COUNTRY_VN));

        let reference = match request.transaction_id() {
            Some(id) => id.to_string(),
            None => {
                let r = self.references.next_reference();
                log::debug!("no transaction id, using generated reference {}", r);
                r
            }
        };

        let mut additional = vec![Tlv::new(AdditionalField::Reference.tag(), reference)];
        if let Some(purpose) = request.purpose.as_deref().filter(|p| !p.is_empty()) {
            additional.push(Tlv::new(AdditionalField::Purpose.tag(), purpose));
        }

        fields.push(Tlv::new(
            PayloadField::AdditionalData.tag(),
            build_tlvs(&additional)?,
        ));

        let prefix = build_tlvs(&fields)?;
        let crc = calculate_crc16(&format!("{}{}", prefix, CRC_HEADER));

        Ok(prefix + &build_tlv(PayloadField::Crc.tag(), &crc)?)
    }
}

pub fn generate_vietqr_string(request: &PaymentRequest) -> Result<String, ValidationError> {
    PayloadBuilder::default().build(request)
}

/// A payload split into its top-level fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub fields: Vec<Tlv>,
}

impl Payload {
    pub fn get(&self, field: PayloadField) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.t == field.tag())
            .map(|f| f.v.as_str())
    }

    pub fn is_dynamic(&self) -> bool {
        self.get(PayloadField::InitiationMethod) == Some(DYNAMIC_QR)
    }

    pub fn amount_units(&self) -> Option<u64> {
        self.get(PayloadField::Amount)?.parse().ok()
    }

    pub fn bill_number(&self) -> Option<&str> {
        self.get(PayloadField::BillNumber)
    }

    pub fn additional_data(&self) -> Vec<Tlv> {
        self.get(PayloadField::AdditionalData)
            .and_then(|v| parse_tlv(v).ok())
            .unwrap_or_default()
    }

    fn additional(&self, field: AdditionalField) -> Option<String> {
        self.additional_data()
            .into_iter()
            .find(|f| f.t == field.tag())
            .map(|f| f.v)
    }

    pub fn reference(&self) -> Option<String> {
        self.additional(AdditionalField::Reference)
    }

    pub fn purpose(&self) -> Option<String> {
        self.additional(AdditionalField::Purpose)
    }

    pub fn crc(&self) -> Option<&str> {
        self.get(PayloadField::Crc)
    }
}
