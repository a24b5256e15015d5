/// Largest sentence the assembler will hold; longer frames are truncated here.
pub const FRAME_CAPACITY: usize = 200;

/// Characters of the latitude field consumed as `DDMM.mmmm`.
pub const LAT_DIGITS: usize = 9;
/// Characters of the longitude field consumed as `DDDMM.mmmm`.
pub const LON_DIGITS: usize = 10;

/// Receiver UART speed (ATGM336H factory default).
pub const GPS_BAUD: u32 = 9600;

pub const POLL_INTERVAL_MS: u32 = 100;
pub const REPORT_INTERVAL_MS: u32 = 1000;
pub const FAULT_RELOG_INTERVAL_MS: u32 = 1000;

/// How hemisphere letters become signs on the decimal coordinates.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignRule {
    /// Both `'W'` and `'S'` negate the latitude; the longitude is never
    /// negated. This is what deployed receivers of this design report.
    #[default]
    Literal,
    /// `'S'` negates the latitude and `'W'` negates the longitude.
    Corrected,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerConfig {
    pub sign_rule: SignRule,
}

impl TrackerConfig {
    pub const fn new() -> Self {
        Self {
            sign_rule: SignRule::Literal,
        }
    }

    pub const fn with_sign_rule(mut self, sign_rule: SignRule) -> Self {
        self.sign_rule = sign_rule;
        self
    }
}
