use bbsnet::net::{main_type_name, net_info_minor_type_name, MainType, NetInfoMinor};

#[test]
fn every_known_main_type_has_a_name() {
    for code in (0x01..=0x14).chain(0x1a..=0x1c) {
        let t = MainType::from_code(code).expect("known code");
        assert_eq!(t.code(), code);
        assert!(!main_type_name(code).starts_with("unknown"), "{code}");
    }
}

#[test]
fn unknown_codes_get_a_fallback_name() {
    assert_eq!(main_type_name(0), "unknown type #0");
    assert_eq!(main_type_name(0x15), "unknown type #21");
    assert_eq!(main_type_name(u16::MAX), "unknown type #65535");
    assert_eq!(net_info_minor_type_name(10), "unknown net_info minor type #10");
}

#[test]
fn net_info_minor_names() {
    assert_eq!(NetInfoMinor::from_code(0).map(NetInfoMinor::code), Some(0));
    assert_eq!(net_info_minor_type_name(9), "binkp");
}

#[test]
fn list_capable_types() {
    assert!(MainType::Post.supports_list());
    assert!(MainType::NetInfo.supports_list());
    assert!(!MainType::Email.supports_list());
    assert!(!MainType::EmailName.supports_list());
}
