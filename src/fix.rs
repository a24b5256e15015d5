use chrono::NaiveTime;

use crate::{
    config::TrackerConfig,
    nmea::{
        coord::{self, CoordError},
        parser::{self, FixStatus, ParseError},
        FieldText,
    },
    Position,
};

/// Latest decimal fix, as seen by whoever reports it.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct PositionFix {
    pub latitude: f32,
    pub longitude: f32,
    pub ns: Option<char>,
    pub ew: Option<char>,
    pub valid: bool,
    pub utc: Option<NaiveTime>,
}

impl PositionFix {
    pub const fn new() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            ns: None,
            ew: None,
            valid: false,
            utc: None,
        }
    }

    pub fn position(&self) -> Position {
        Position {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PositionFix {
    fn format(&self, fmt: defmt::Formatter) {
        use chrono::Timelike;

        defmt::write!(
            fmt,
            "PositionFix {{ lat: {} {}, lon: {} {}, valid: {}",
            self.latitude,
            self.ns,
            self.longitude,
            self.ew,
            self.valid,
        );
        match self.utc {
            Some(t) => defmt::write!(
                fmt,
                ", utc: {=u32}:{=u32}:{=u32} }}",
                t.hour(),
                t.minute(),
                t.second()
            ),
            None => defmt::write!(fmt, ", utc: - }}"),
        }
    }
}

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackError {
    /// The sentence had no field separator; the tracker is now faulted.
    #[error("malformed sentence")]
    Malformed(#[from] ParseError),
    /// An earlier malformed sentence halted the tracker.
    #[error("tracker is faulted")]
    Faulted,
    #[error("bad coordinate: {0}")]
    Coord(#[from] CoordError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackerState {
    Running,
    /// Terminal. No further sentences are accepted.
    Faulted(ParseError),
}

/// What one accepted sentence did to the fix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Applied {
    /// New coordinates were stored.
    Position,
    /// The receiver has no fix; coordinates kept, fix marked invalid.
    NoFix,
    /// None of the fields after the identifier could be extracted.
    Nothing,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerHealth {
    pub sentences: u32,
    pub valid_fixes: u32,
    pub invalid_fixes: u32,
    pub skipped_fields: u32,
    pub coord_rejects: u32,
}

/// Raw field text carried between sentences. A skipped field keeps
/// whatever the last sentence that had it put there.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RmcRecord {
    pub utc_time: FieldText<11>,
    pub latitude: FieldText<11>,
    pub ns: FieldText<2>,
    pub longitude: FieldText<12>,
    pub ew: FieldText<2>,
    pub valid: bool,
}

impl RmcRecord {
    fn merge(&mut self, fields: &parser::ParsedFields<'_>) {
        if let Some(v) = fields.utc_time {
            self.utc_time.set(v);
        }
        match fields.fix_status() {
            Some(FixStatus::Valid) => self.valid = true,
            Some(FixStatus::Invalid) => self.valid = false,
            None => {}
        }
        if let Some(v) = fields.latitude {
            self.latitude.set(v);
        }
        if let Some(v) = fields.ns {
            self.ns.set(v);
        }
        if let Some(v) = fields.longitude {
            self.longitude.set(v);
        }
        if let Some(v) = fields.ew {
            self.ew.set(v);
        }
    }
}

/// Turns completed sentences into a [`PositionFix`]. Sole writer of the fix.
pub struct Tracker {
    config: TrackerConfig,
    state: TrackerState,
    record: RmcRecord,
    fix: PositionFix,
    health: TrackerHealth,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: TrackerState::Running,
            record: RmcRecord::default(),
            fix: PositionFix::new(),
            health: TrackerHealth::default(),
        }
    }

    pub fn fix(&self) -> &PositionFix {
        &self.fix
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn health(&self) -> &TrackerHealth {
        &self.health
    }

    pub fn record(&self) -> &RmcRecord {
        &self.record
    }

    /// Feeds one completed sentence through parsing and conversion.
    pub fn apply(&mut self, sentence: &[u8]) -> Result<Applied, TrackError> {
        if let TrackerState::Faulted(_) = self.state {
            return Err(TrackError::Faulted);
        }

        let fields = match parser::parse(sentence) {
            Ok(fields) => fields,
            Err(e) => {
                error!("gps halted: {:?}", e);
                self.state = TrackerState::Faulted(e);
                return Err(e.into());
            }
        };

        self.health.sentences = self.health.sentences.wrapping_add(1);
        self.health.skipped_fields = self
            .health
            .skipped_fields
            .wrapping_add(u32::from(fields.skipped));
        self.record.merge(&fields);

        if !fields.extracted() {
            return Ok(Applied::Nothing);
        }

        if !self.record.valid {
            self.health.invalid_fixes = self.health.invalid_fixes.wrapping_add(1);
            self.fix.valid = false;
            warn!("receiver reports no fix");
            return Ok(Applied::NoFix);
        }

        let ns = self.record.ns.first_char();
        let ew = self.record.ew.first_char();
        let position = coord::convert(
            self.record.latitude.as_bytes(),
            ns,
            self.record.longitude.as_bytes(),
            ew,
            self.config.sign_rule,
        )
        .map_err(|e| {
            self.health.coord_rejects = self.health.coord_rejects.wrapping_add(1);
            warn!("coordinate rejected: {:?}", e);
            e
        })?;

        self.fix = PositionFix {
            latitude: position.lat,
            longitude: position.lon,
            ns,
            ew,
            valid: true,
            utc: parser::decode_utc(self.record.utc_time.as_bytes()),
        };
        self.health.valid_fixes = self.health.valid_fixes.wrapping_add(1);
        Ok(Applied::Position)
    }
}
