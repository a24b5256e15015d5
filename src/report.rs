use core::fmt::{self, Write};

use chrono::Timelike;

use crate::fix::{PositionFix, TrackerState};

/// Writes the one-line summary the firmware prints for each report.
pub fn write_report<W: Write>(
    out: &mut W,
    fix: &PositionFix,
    state: TrackerState,
) -> fmt::Result {
    if let TrackerState::Faulted(e) = state {
        return write!(out, "gps halted: {}", e);
    }
    if !fix.valid {
        return out.write_str("no valid fix");
    }

    write!(
        out,
        "latitude: {},{:.4} longitude: {},{:.4}",
        fix.ns.unwrap_or('-'),
        fix.latitude,
        fix.ew.unwrap_or('-'),
        fix.longitude,
    )?;
    if let Some(utc) = fix.utc {
        write!(
            out,
            " utc: {:02}:{:02}:{:02}",
            utc.hour(),
            utc.minute(),
            utc.second()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fix::Tracker, nmea::ParseError, FmtBuf};

    fn render(fix: &PositionFix, state: TrackerState) -> FmtBuf<96> {
        let mut buf = FmtBuf::new();
        write_report(&mut buf, fix, state).unwrap();
        buf
    }

    #[test]
    fn reports_valid_fix() {
        let mut tracker = Tracker::default();
        tracker
            .apply(b"$GNRMC,023513.000,A,3113.9430,N,12121.2456,E,\r\n")
            .unwrap();
        let buf = render(tracker.fix(), tracker.state());
        assert_eq!(
            buf.as_str(),
            Some("latitude: N,31.2324 longitude: E,121.3541 utc: 02:35:13")
        );
    }

    #[test]
    fn reports_missing_fix() {
        let buf = render(&PositionFix::new(), TrackerState::Running);
        assert_eq!(buf.as_str(), Some("no valid fix"));
    }

    #[test]
    fn reports_fault() {
        let state = TrackerState::Faulted(ParseError::MalformedSentence);
        let buf = render(&PositionFix::new(), state);
        assert_eq!(
            buf.as_str(),
            Some("gps halted: sentence has no field separator")
        );
    }

    #[test]
    fn long_report_is_cut_at_buffer_size() {
        let fix = PositionFix {
            valid: true,
            ..PositionFix::new()
        };
        let mut buf = FmtBuf::<8>::new();
        write_report(&mut buf, &fix, TrackerState::Running).unwrap();
        assert_eq!(buf.as_str(), Some("latitude"));
    }
}
