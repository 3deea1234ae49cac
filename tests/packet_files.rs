mod common;

use bbsnet::net::header::HEADER_SIZE;
use bbsnet::net::{read_packets, write_packet, MainType, NetError, PacketHeader};
use common::network_in;

#[test]
fn single_destination_packet_on_disk() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let net = network_in(tmp.path(), 1);
    let text = b"Subject\0SYSOP\r\ndate\r\nbody";
    let mut h = PacketHeader::new(MainType::Email.code(), 1, 5, 1_700_000_000);
    h.to_user = 12;
    h.payload_length = text.len() as u32;

    let path = tmp.path().join("p1-2-0.net");
    write_packet(&path, &net, &h, &[], text).expect("write");

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(raw.len(), HEADER_SIZE + text.len());
    assert_eq!(&raw[0..2], &5u16.to_le_bytes());
    assert_eq!(&raw[2..4], &12u16.to_le_bytes());
    assert_eq!(&raw[HEADER_SIZE..], text);

    let packets = read_packets(&path).unwrap();
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].header, h);
}

#[test]
fn list_packet_carries_recipients_after_header() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let net = network_in(tmp.path(), 1);
    let text = b"post text";
    let mut h = PacketHeader::new(MainType::Post.code(), 1, 0, 1_700_000_000);
    h.payload_length = text.len() as u32;

    let path = tmp.path().join("p1-2-0.net");
    write_packet(&path, &net, &h, &[2, 300, 4], text).expect("write");

    let raw = std::fs::read(&path).unwrap();
    assert_eq!(raw.len(), HEADER_SIZE + 6 + text.len());
    assert_eq!(&raw[12..14], &3u16.to_le_bytes());
    assert_eq!(&raw[HEADER_SIZE..HEADER_SIZE + 6], &[2, 0, 0x2c, 0x01, 4, 0]);

    let p = &read_packets(&path).unwrap()[0];
    assert_eq!(p.recipients, vec![2, 300, 4]);
    assert_eq!(p.header.list_len, 3);
    assert_eq!(p.text, text);
}

#[test]
fn failed_write_keeps_existing_target() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let net = network_in(tmp.path(), 1);
    let path = tmp.path().join("p1-2-0.net");
    std::fs::write(&path, b"previous").unwrap();

    let mut h = PacketHeader::new(MainType::Email.code(), 1, 40000, 0);
    h.payload_length = 1;
    let err = write_packet(&path, &net, &h, &[], b"x").unwrap_err();
    assert!(matches!(err, NetError::InvalidNode { node: 40000, .. }));
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}

#[test]
fn truncated_file_is_malformed() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("short.net");
    std::fs::write(&path, [1u8, 0, 2, 0]).unwrap();
    assert!(matches!(read_packets(&path), Err(NetError::Malformed(_))));
}
