use super::*;

const GNRMC: &[u8] = b"$GNRMC,023513.000,A,3113.9430,N,12121.2456,E,0.00,0.00,170324,,,A*7C\r\n";

fn feed(asm: &mut FrameAssembler, bytes: &[u8]) -> Option<RawSentence> {
    asm.push_slice(bytes)
}

#[test]
fn completes_rmc_sentence_on_newline() {
    let mut asm = FrameAssembler::new();
    let (body, last) = GNRMC.split_at(GNRMC.len() - 1);
    for &b in body {
        assert_eq!(asm.push(b), None);
    }
    let sentence = asm.push(last[0]).expect("newline completes the frame");
    assert_eq!(sentence.as_slice(), GNRMC);
    assert_eq!(asm.len(), 0);
    assert_eq!(asm.state(), AssemblerState::Idle);
    assert_eq!(asm.completed(), 1);
}

#[test]
fn accepts_any_talker_id() {
    let mut asm = FrameAssembler::new();
    let gp = b"$GPRMC,1,A,2,N,3,E,\n";
    let bd = b"$BDRMC,1,A,2,N,3,E,\n";
    assert_eq!(feed(&mut asm, gp).map(|s| s.len()), Some(gp.len()));
    assert_eq!(feed(&mut asm, bd).map(|s| s.len()), Some(bd.len()));
}

#[test]
fn ignores_other_sentence_types() {
    let mut asm = FrameAssembler::new();
    let gga = b"$GNGGA,023513.000,3113.9430,N,12121.2456,E,1,08,1.0,10.0,M,0.0,M,,*4B\r\n";
    assert_eq!(feed(&mut asm, gga), None);
    // The GGA bytes stay in the buffer until the next '$'
    assert_eq!(asm.len(), gga.len());
    assert_eq!(asm.completed(), 0);
}

#[test]
fn dollar_resets_index_regardless_of_progress() {
    let mut asm = FrameAssembler::new();
    for prefix_len in [0usize, 1, 5, 6, 50, 199, 200, 260] {
        for _ in 0..prefix_len {
            asm.push(b'x');
        }
        asm.push(b'$');
        assert_eq!(asm.len(), 1, "after {prefix_len} bytes");
        assert_eq!(asm.state(), AssemblerState::Accumulating);
    }
}

#[test]
fn restart_discards_partial_frame() {
    let mut asm = FrameAssembler::new();
    feed(&mut asm, b"$GNRMC,0235");
    let sentence = feed(&mut asm, GNRMC).expect("second frame completes");
    assert_eq!(sentence.as_slice(), GNRMC);
}

#[test]
fn bytes_before_first_dollar_are_dropped() {
    let mut asm = FrameAssembler::new();
    feed(&mut asm, b"\n\r\x00garbage\n");
    assert_eq!(asm.state(), AssemblerState::Idle);
    assert!(asm.is_empty());
}

#[test]
fn newline_before_identifier_does_not_complete() {
    let mut asm = FrameAssembler::new();
    assert_eq!(feed(&mut asm, b"$GNR\n"), None);
    assert_eq!(asm.state(), AssemblerState::Accumulating);
    assert_eq!(asm.len(), 5);
}

#[test]
fn oversized_frame_is_clamped_not_wrapped() {
    let mut asm = FrameAssembler::new();
    feed(&mut asm, b"$GNRMC,");
    for _ in 0..500 {
        assert_eq!(asm.push(b'9'), None);
        assert!(asm.len() <= FRAME_CAPACITY);
    }
    assert_eq!(asm.len(), FRAME_CAPACITY);
    assert_eq!(asm.truncated(), 1);

    // The terminator still completes the truncated frame
    let sentence = asm.push(b'\n').expect("truncated frame still completes");
    assert_eq!(sentence.len(), FRAME_CAPACITY);
    assert!(sentence.is_full());
    assert_eq!(sentence.last(), Some(&b'9'));
}

#[test]
fn every_byte_value_is_accepted() {
    let mut asm = FrameAssembler::new();
    for round in 0..4u16 {
        for b in 0..=255u8 {
            asm.push(b.wrapping_add(round as u8));
            assert!(asm.len() <= FRAME_CAPACITY);
        }
    }
}
