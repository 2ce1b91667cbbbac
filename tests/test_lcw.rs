use cpstool::{decompress_lcw, AddressingMode, ByteStream, Command, LcwDecoder};

fn padded(prefix: &[u8], size: usize) -> Vec<u8> {
    let mut expected = prefix.to_vec();
    expected.resize(size, 0);
    expected
}

#[test]
fn test_literal_run_then_end() {
    let result = decompress_lcw(&[0x83, 0x41, 0x42, 0x43, 0x80], 8);
    assert_eq!(result, padded(&[0x41, 0x42, 0x43], 8));
}

#[test]
fn test_literal_run_then_trailing_zero() {
    // the trailing 0x00 is a short back-reference missing its second byte
    let result = decompress_lcw(&[0x83, 0x41, 0x42, 0x43, 0x00], 8);
    assert_eq!(result, padded(&[0x41, 0x42, 0x43], 8));
}

#[test]
fn test_short_backref_overlaps() {
    // one literal 'A', then copy 5 bytes from 1 byte back
    let result = decompress_lcw(&[0x81, 0x41, 0x20, 0x01, 0x80], 8);
    assert_eq!(result, padded(&[0x41; 6], 8));
}

#[test]
fn test_short_backref_period() {
    let result = decompress_lcw(&[0x82, 0x01, 0x02, 0x40, 0x02, 0x80], 10);
    assert_eq!(result, padded(&[1, 2, 1, 2, 1, 2, 1, 2, 1], 10));
}

#[test]
fn test_exit_stops_immediately() {
    let result = decompress_lcw(&[0x82, 0x01, 0x02, 0x80, 0x83, 0x09, 0x09, 0x09], 6);
    assert_eq!(result, padded(&[1, 2], 6));
}

#[test]
fn test_addressing_modes_differ() {
    let commands = [0x84, b'A', b'B', b'C', b'D', 0xc0, 0x01, 0x00, 0x80];
    let mut relative = vec![0x00];
    relative.extend_from_slice(&commands);

    let absolute = decompress_lcw(&commands, 7);
    let relative = decompress_lcw(&relative, 7);

    assert_eq!(absolute, b"ABCDBCD".to_vec());
    assert_eq!(relative, b"ABCDDDD".to_vec());
}

#[test]
fn test_mode_detection() {
    assert_eq!(LcwDecoder::new(&[0x00, 0x80], 4).mode(), AddressingMode::Relative);
    assert_eq!(LcwDecoder::new(&[0x80], 4).mode(), AddressingMode::Absolute);
    assert_eq!(LcwDecoder::new(&[], 4).mode(), AddressingMode::Absolute);
}

#[test]
fn test_fill_run() {
    let result = decompress_lcw(&[0xfe, 0x04, 0x00, 0x7f, 0x80], 6);
    assert_eq!(result, padded(&[0x7f; 4], 6));
}

#[test]
fn test_fill_run_clamped() {
    let result = decompress_lcw(&[0xfe, 0xff, 0xff, 0x11], 100);
    assert_eq!(result, vec![0x11; 100]);
}

#[test]
fn test_very_large_copy() {
    let result = decompress_lcw(
        &[0x82, 0x01, 0x02, 0xff, 0x06, 0x00, 0x00, 0x00, 0x80],
        10,
    );
    assert_eq!(result, padded(&[1, 2, 1, 2, 1, 2, 1, 2], 10));
}

#[test]
fn test_very_large_copy_clamped() {
    let result = decompress_lcw(&[0x81, 0x05, 0xff, 0xff, 0xff, 0x00, 0x00], 300);
    assert_eq!(result, vec![0x05; 300]);
}

#[test]
fn test_relative_copy_from_write_position_stops() {
    let result = decompress_lcw(&[0x00, 0x81, 0x05, 0xc0, 0x00, 0x00, 0x81, 0x09], 4);
    assert_eq!(result, padded(&[0x05], 4));
}

#[test]
fn test_backref_before_start_stops() {
    let result = decompress_lcw(&[0x30, 0x05, 0x81, 0x09], 4);
    assert_eq!(result, vec![0; 4]);
}

#[test]
fn test_absolute_copy_ahead_of_cursor_stops() {
    let result = decompress_lcw(&[0x81, 0x01, 0xc0, 0x10, 0x00, 0x81, 0x09], 4);
    assert_eq!(result, padded(&[0x01], 4));
}

#[test]
fn test_truncated_literal_keeps_prefix() {
    let result = decompress_lcw(&[0x85, 0x01, 0x02], 8);
    assert_eq!(result, padded(&[1, 2], 8));
}

#[test]
fn test_truncated_operands() {
    assert_eq!(decompress_lcw(&[0x81, 0x03, 0xfe, 0x10], 4), padded(&[3], 4));
    assert_eq!(decompress_lcw(&[0x81, 0x03, 0xff, 0x10, 0x00, 0x00], 4), padded(&[3], 4));
}

#[test]
fn test_output_is_exact_size() {
    assert!(decompress_lcw(&[0x81, 0x01], 0).is_empty());
    assert_eq!(decompress_lcw(&[], 5), vec![0; 5]);
    assert_eq!(decompress_lcw(&[0x83, 1, 2, 3], 2), vec![1, 2]);
}

#[test]
fn test_command_decode() {
    let mut stream = ByteStream::new(&[0x34, 0x12]);
    assert_eq!(
        Command::decode(0xc5, &mut stream),
        Some(Command::MediumCopy {
            count: 8,
            position: 0x1234
        })
    );
    assert!(stream.is_exhausted());

    let mut stream = ByteStream::new(&[0xab]);
    assert_eq!(
        Command::decode(0x7c, &mut stream),
        Some(Command::ShortBackref {
            count: 10,
            distance: 0xcab
        })
    );

    let mut stream = ByteStream::new(&[0x00, 0x01, 0x02, 0x03]);
    assert_eq!(
        Command::decode(0xff, &mut stream),
        Some(Command::VeryLargeCopy {
            count: 0x0100,
            position: 0x0302
        })
    );

    let mut stream = ByteStream::new(&[]);
    assert_eq!(Command::decode(0x80, &mut stream), Some(Command::Exit));
    assert_eq!(
        Command::decode(0xbf, &mut stream),
        Some(Command::LiteralRun { count: 0x3f })
    );
    assert_eq!(Command::decode(0xfe, &mut stream), None);
}

#[test]
fn test_very_large_copy_relative() {
    let result = decompress_lcw(
        &[0x00, 0x82, 0x01, 0x02, 0xff, 0x06, 0x00, 0x02, 0x00, 0x80],
        10,
    );
    assert_eq!(result, padded(&[1, 2, 1, 2, 1, 2, 1, 2], 10));
}

#[test]
fn test_very_large_copy_addressing_modes_differ() {
    let commands = [0x83, 0x01, 0x02, 0x03, 0xff, 0x04, 0x00, 0x01, 0x00, 0x80];
    let mut relative = vec![0x00];
    relative.extend_from_slice(&commands);

    let absolute = decompress_lcw(&commands, 8);
    let relative = decompress_lcw(&relative, 8);

    assert_eq!(absolute, padded(&[1, 2, 3, 2, 3, 2, 3], 8));
    assert_eq!(relative, padded(&[1, 2, 3, 3, 3, 3, 3], 8));
}
