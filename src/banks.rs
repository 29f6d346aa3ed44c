use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankInfo {
    pub code: &'static str,
    pub bin: &'static str,
    pub name: &'static str,
}

const fn bank(code: &'static str, bin: &'static str, name: &'static str) -> BankInfo {
    BankInfo { code, bin, name }
}

/// NAPAS acquirer BINs by bank short code.
pub static BANKS: &[BankInfo] = &[
    bank("VCB", "970436", "Vietcombank"),
    bank("ICB", "970415", "VietinBank"),
    // Alias kept for callers using the older code
    bank("ICBV", "970415", "VietinBank"),
    bank("BIDV", "970418", "BIDV"),
    bank("VBA", "970405", "Agribank"),
    bank("TCB", "970407", "Techcombank"),
    bank("MB", "970422", "MB Bank"),
    bank("ACB", "970416", "ACB"),
    bank("VPB", "970432", "VPBank"),
    bank("TPB", "970423", "TPBank"),
    bank("STB", "970403", "Sacombank"),
    bank("HDB", "970437", "HDBank"),
    bank("VIB", "970441", "VIB"),
    bank("SHB", "970443", "SHB"),
    bank("EIB", "970431", "Eximbank"),
    bank("MSB", "970426", "MSB"),
    bank("OCB", "970448", "OCB"),
    bank("SCB", "970429", "SCB"),
    bank("SEAB", "970440", "SeABank"),
    bank("LPB", "970449", "LPBank"),
    bank("NAB", "970428", "Nam A Bank"),
    bank("ABB", "970425", "ABBANK"),
    bank("BAB", "970409", "Bac A Bank"),
    bank("VAB", "970427", "VietABank"),
    bank("KLB", "970452", "Kienlongbank"),
    bank("PGB", "970430", "PGBank"),
    bank("PVCB", "970412", "PVcomBank"),
    bank("NCB", "970419", "NCB"),
    bank("VCCB", "970454", "BVBank"),
    bank("SGICB", "970400", "Saigonbank"),
    bank("BVB", "970438", "BaoViet Bank"),
    bank("VRB", "970421", "VRB"),
    bank("SHBVN", "970424", "Shinhan Bank"),
    bank("WVN", "970457", "Woori Bank"),
];

pub fn all() -> &'static [BankInfo] {
    BANKS
}

pub fn bank_for_code(code: &str) -> Option<&'static BankInfo> {
    BANKS.iter().find(|b| b.code.eq_ignore_ascii_case(code))
}

pub fn bin_for_code(code: &str) -> Option<&'static str> {
    bank_for_code(code).map(|b| b.bin)
}

/// First entry for `bin`; aliases sharing a BIN resolve to the primary code.
pub fn bank_for_bin(bin: &str) -> Option<&'static BankInfo> {
    BANKS.iter().find(|b| b.bin == bin)
}
