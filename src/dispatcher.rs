use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    banks,
    error::CommandError,
    payload::{PayloadBuilder, PayloadField, PaymentRequest, Template},
    reference::ReferenceSource,
    validate::{decode_payload, validate_vietqr},
};

/// One request line read from the service's input.
#[derive(Debug, Deserialize)]
pub struct Message {
    pub cmd: String,
    #[serde(default)]
    pub mid: Value,
    #[serde(default)]
    pub data: Value,
}

/// Receiving account used when a generate request names none.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Merchant {
    /// Bank short code or 6-digit BIN.
    pub bank: String,
    pub account_number: String,
    #[serde(default)]
    pub account_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateData {
    bank: Option<String>,
    bank_bin: Option<String>,
    account_number: Option<String>,
    account_name: Option<String>,
    amount: Option<f64>,
    transaction_id: Option<String>,
    purpose: Option<String>,
    #[serde(default)]
    template: Template,
}

#[derive(Debug, Deserialize)]
struct PayloadData {
    payload: String,
}

#[derive(Serialize)]
struct FieldView<'a> {
    tag: &'a str,
    name: Option<String>,
    value: &'a str,
}

fn is_bin(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

fn resolve_bank(bank: &str) -> Result<String, CommandError> {
    if is_bin(bank) {
        return Ok(bank.to_string());
    }

    banks::bin_for_code(bank)
        .map(str::to_string)
        .ok_or_else(|| CommandError::UnknownBank(bank.to_string()))
}

pub struct Dispatcher {
    merchant: Option<Merchant>,
    builder: PayloadBuilder,
}

impl Dispatcher {
    pub fn new(merchant: Option<Merchant>, references: Box<dyn ReferenceSource>) -> Self {
        Self {
            merchant,
            builder: PayloadBuilder::new(references),
        }
    }

    /// Handles one input line and returns the JSON response line.
    pub fn on_message(&self, line: &str) -> String {
        let msg: Message = match serde_json::from_str(line.trim_end_matches('\0')) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("dropping unparsable message: {}", e);
                return response("error", Value::Null, Err(CommandError::from(e)));
            }
        };

        log::debug!("cmd {} mid {}", msg.cmd, msg.mid);

        let result = match msg.cmd.as_str() {
            "generate" => self.generate(msg.data),
            "validate" => Self::validate(msg.data),
            "decode" => Self::decode(msg.data),
            "banks" => Ok(json!(banks::all())),
            _ => Err(CommandError::UnknownCommand(msg.cmd.clone())),
        };

        if let Err(e) = &result {
            log::warn!("{} failed: {}", msg.cmd, e);
        }

        response(&msg.cmd, msg.mid, result)
    }

    fn payment_request(&self, data: GenerateData) -> Result<PaymentRequest, CommandError> {
        let merchant = self.merchant.as_ref();

        let bank_bin = match (data.bank_bin, data.bank) {
            (Some(bin), _) => bin,
            (None, Some(code)) => resolve_bank(&code)?,
            (None, None) => resolve_bank(
                &merchant
                    .ok_or(CommandError::MissingField("bank"))?
                    .bank,
            )?,
        };

        let account_number = match data.account_number {
            Some(number) => number,
            None => merchant
                .ok_or(CommandError::MissingField("account number"))?
                .account_number
                .clone(),
        };

        Ok(PaymentRequest {
            bank_bin,
            account_number,
            account_name: data
                .account_name
                .or_else(|| merchant.and_then(|m| m.account_name.clone())),
            amount: data.amount,
            transaction_id: data.transaction_id,
            purpose: data.purpose,
            template: data.template,
        })
    }

    fn generate(&self, data: Value) -> Result<Value, CommandError> {
        let data: GenerateData = if data.is_null() {
            GenerateData::default()
        } else {
            serde_json::from_value(data)?
        };

        let request = self.payment_request(data)?;
        let payload = self.builder.build(&request)?;

        Ok(json!({
            "payload": payload,
            "bankBin": request.bank_bin,
            "bankName": banks::bank_for_bin(&request.bank_bin).map(|b| b.name),
            "accountName": request.account_name,
            "amount": request.amount,
            "template": request.template,
        }))
    }

    fn validate(data: Value) -> Result<Value, CommandError> {
        let data: PayloadData = serde_json::from_value(data)?;

        Ok(json!(validate_vietqr(&data.payload)))
    }

    fn decode(data: Value) -> Result<Value, CommandError> {
        let data: PayloadData = serde_json::from_value(data)?;
        let payload = decode_payload(&data.payload)?;

        let fields: Vec<FieldView> = payload
            .fields
            .iter()
            .map(|f| FieldView {
                tag: &f.t,
                name: PayloadField::from_tag(&f.t).map(|p| p.name()),
                value: &f.v,
            })
            .collect();

        Ok(json!({
            "fields": fields,
            "dynamic": payload.is_dynamic(),
            "amountUnits": payload.amount_units(),
            "billNumber": payload.bill_number(),
            "reference": payload.reference(),
            "purpose": payload.purpose(),
            "crc": payload.crc(),
        }))
    }
}

fn response(cmd: &str, mid: Value, result: Result<Value, CommandError>) -> String {
    let json = match result {
        Ok(data) => json!({
            "cmd": format!("{}_ack", cmd),
            "mid": mid,
            "result": 0,
            "data": data,
        }),
        Err(e) => json!({
            "cmd": format!("{}_ack", cmd),
            "mid": mid,
            "result": 1,
            "error": e.to_string(),
        }),
    };

    json.to_string()
}
