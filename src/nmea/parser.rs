use chrono::NaiveTime;

/// Field 0 (the identifier) plus the six fields an RMC fix is built from.
pub const FIELD_COUNT: usize = 7;

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    #[error("sentence has no field separator")]
    MalformedSentence,
}

/// Receiver status from field 2.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixStatus {
    /// `A`
    Valid,
    /// `V`
    Invalid,
}

impl FixStatus {
    /// Only the first character counts; anything but `A`/`V` is no status.
    pub fn from_field(field: &[u8]) -> Option<Self> {
        match field.first() {
            Some(b'A') => Some(FixStatus::Valid),
            Some(b'V') => Some(FixStatus::Invalid),
            _ => None,
        }
    }
}

/// Fields 1-6 of one sentence, borrowed from it. `None` means the field
/// was skipped because its closing comma never came.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ParsedFields<'a> {
    pub utc_time: Option<&'a [u8]>,
    pub status: Option<&'a [u8]>,
    pub latitude: Option<&'a [u8]>,
    pub ns: Option<&'a [u8]>,
    pub longitude: Option<&'a [u8]>,
    pub ew: Option<&'a [u8]>,
    pub skipped: u8,
}

impl<'a> ParsedFields<'a> {
    fn assign(&mut self, index: usize, value: &'a [u8]) {
        let slot = match index {
            1 => &mut self.utc_time,
            2 => &mut self.status,
            3 => &mut self.latitude,
            4 => &mut self.ns,
            5 => &mut self.longitude,
            6 => &mut self.ew,
            _ => return,
        };
        *slot = Some(value);
    }

    /// At least one of fields 1-6 was found.
    pub fn extracted(&self) -> bool {
        usize::from(self.skipped) < FIELD_COUNT - 1
    }

    pub fn fix_status(&self) -> Option<FixStatus> {
        self.status.and_then(FixStatus::from_field)
    }
}

/// Splits one sentence into its leading fields.
///
/// Field `n` is the text between comma `n` and comma `n + 1`. Only the first
/// comma is mandatory: once the commas run out the remaining fields are
/// skipped and counted, not reported as errors.
pub fn parse(sentence: &[u8]) -> Result<ParsedFields<'_>, ParseError> {
    let mut commas = sentence
        .iter()
        .enumerate()
        .filter_map(|(i, &b)| (b == b',').then_some(i));

    let mut cursor = commas.next().ok_or(ParseError::MalformedSentence)?;
    let mut fields = ParsedFields::default();

    for index in 1..FIELD_COUNT {
        match commas.next() {
            Some(next) => {
                fields.assign(index, &sentence[cursor + 1..next]);
                cursor = next;
            }
            None => {
                fields.skipped += 1;
                debug!("field {} has no closing comma, skipped", index);
            }
        }
    }

    Ok(fields)
}

/// Decodes `hhmmss` with an optional `.f`, `.ff` or `.fff` fraction.
pub fn decode_utc(field: &[u8]) -> Option<NaiveTime> {
    fn two_digits(s: &[u8]) -> Option<u32> {
        match s {
            [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
                Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
            }
            _ => None,
        }
    }

    let hour = two_digits(field.get(0..2)?)?;
    let min = two_digits(field.get(2..4)?)?;
    let sec = two_digits(field.get(4..6)?)?;

    let milli = match field.get(6..) {
        None | Some([]) => 0,
        Some([b'.', frac @ ..]) if frac.iter().all(u8::is_ascii_digit) => frac
            .iter()
            .chain(core::iter::repeat(&b'0'))
            .take(3)
            .fold(0, |acc, &d| acc * 10 + u32::from(d - b'0')),
        Some(_) => return None,
    };

    NaiveTime::from_hms_milli_opt(hour, min, sec, milli)
}
