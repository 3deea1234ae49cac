//! Message type codes carried in the packet header and their display names.
//!
//! Codes are part of the wire format and shared with every other node on the
//! network; never renumber them.

/// Main message types (`message_type` header field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MainType {
    NetInfo = 0x0001,
    Email = 0x0002,
    Post = 0x0003,
    File = 0x0004,
    PrePost = 0x0005,
    External = 0x0006,
    EmailName = 0x0007,
    NetEdit = 0x0008,
    SubList = 0x0009,
    ExtraData = 0x000a,
    GroupBbslist = 0x000b,
    GroupConnect = 0x000c,
    GroupBinkp = 0x000d,
    GroupInfo = 0x000e,
    Ssm = 0x000f,
    SubAddReq = 0x0010,
    SubDropReq = 0x0011,
    SubAddResp = 0x0012,
    SubDropResp = 0x0013,
    SubListInfo = 0x0014,
    NewPost = 0x001a,
    NewExternal = 0x001b,
    GamePack = 0x001c,
}

impl MainType {
    const ALL: [MainType; 23] = [
        MainType::NetInfo,
        MainType::Email,
        MainType::Post,
        MainType::File,
        MainType::PrePost,
        MainType::External,
        MainType::EmailName,
        MainType::NetEdit,
        MainType::SubList,
        MainType::ExtraData,
        MainType::GroupBbslist,
        MainType::GroupConnect,
        MainType::GroupBinkp,
        MainType::GroupInfo,
        MainType::Ssm,
        MainType::SubAddReq,
        MainType::SubDropReq,
        MainType::SubAddResp,
        MainType::SubDropResp,
        MainType::SubListInfo,
        MainType::NewPost,
        MainType::NewExternal,
        MainType::GamePack,
    ];

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Whether one packet may carry a recipient list (`destination_node == 0`
    /// plus `list_len` node ids). Types that return false fan out to one
    /// packet per recipient.
    pub fn supports_list(self) -> bool {
        matches!(
            self,
            MainType::Post
                | MainType::PrePost
                | MainType::NewPost
                | MainType::External
                | MainType::NewExternal
                | MainType::SubList
                | MainType::NetInfo
        )
    }

    fn label(self) -> &'static str {
        match self {
            MainType::NetInfo => "net_info",
            MainType::Email => "email",
            MainType::Post => "post",
            MainType::File => "file",
            MainType::PrePost => "pre_post",
            MainType::External => "external",
            MainType::EmailName => "email_name",
            MainType::NetEdit => "net_edit",
            MainType::SubList => "sub_list",
            MainType::ExtraData => "extra_data",
            MainType::GroupBbslist => "group_bbslist",
            MainType::GroupConnect => "group_connect",
            MainType::GroupBinkp => "group_binkp",
            MainType::GroupInfo => "group_info",
            MainType::Ssm => "ssm",
            MainType::SubAddReq => "sub_add_req",
            MainType::SubDropReq => "sub_drop_req",
            MainType::SubAddResp => "sub_add_resp",
            MainType::SubDropResp => "sub_drop_resp",
            MainType::SubListInfo => "sub_list_info",
            MainType::NewPost => "new_post",
            MainType::NewExternal => "new_external",
            MainType::GamePack => "game_pack",
        }
    }
}

/// Minor types of `MainType::NetInfo` packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NetInfoMinor {
    GeneralMessage = 0x0000,
    Bbslist = 0x0001,
    Connect = 0x0002,
    SubLst = 0x0003,
    WwivnetLst = 0x0004,
    MoreWwivnetLst = 0x0005,
    CategNet = 0x0006,
    NetworkLst = 0x0007,
    File = 0x0008,
    Binkp = 0x0009,
}

impl NetInfoMinor {
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0x0000 => NetInfoMinor::GeneralMessage,
            0x0001 => NetInfoMinor::Bbslist,
            0x0002 => NetInfoMinor::Connect,
            0x0003 => NetInfoMinor::SubLst,
            0x0004 => NetInfoMinor::WwivnetLst,
            0x0005 => NetInfoMinor::MoreWwivnetLst,
            0x0006 => NetInfoMinor::CategNet,
            0x0007 => NetInfoMinor::NetworkLst,
            0x0008 => NetInfoMinor::File,
            0x0009 => NetInfoMinor::Binkp,
            _ => return None,
        })
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    fn label(self) -> &'static str {
        match self {
            NetInfoMinor::GeneralMessage => "general_message",
            NetInfoMinor::Bbslist => "bbslist",
            NetInfoMinor::Connect => "connect",
            NetInfoMinor::SubLst => "sub_lst",
            NetInfoMinor::WwivnetLst => "wwivnet_lst",
            NetInfoMinor::MoreWwivnetLst => "more_wwivnet_lst",
            NetInfoMinor::CategNet => "categ_net",
            NetInfoMinor::NetworkLst => "network_lst",
            NetInfoMinor::File => "file",
            NetInfoMinor::Binkp => "binkp",
        }
    }
}

/// Display name for a main type code. Never fails.
pub fn main_type_name(code: u16) -> String {
    match MainType::from_code(code) {
        Some(t) => t.label().to_string(),
        None => format!("unknown type #{}", code),
    }
}

/// Display name for a net_info minor type code. Never fails.
pub fn net_info_minor_type_name(code: u16) -> String {
    match NetInfoMinor::from_code(code) {
        Some(t) => t.label().to_string(),
        None => format!("unknown net_info minor type #{}", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip() {
        for t in MainType::ALL {
            assert_eq!(MainType::from_code(t.code()), Some(t));
        }
        assert_eq!(MainType::from_code(0x001a), Some(MainType::NewPost));
    }

    #[test]
    fn names_for_known_and_unknown_codes() {
        assert_eq!(main_type_name(2), "email");
        assert_eq!(main_type_name(0x1b), "new_external");
        assert_eq!(main_type_name(0x0015), "unknown type #21");
        assert_eq!(main_type_name(u16::MAX), "unknown type #65535");
        assert_eq!(net_info_minor_type_name(9), "binkp");
        assert_eq!(net_info_minor_type_name(42), "unknown net_info minor type #42");
    }

    #[test]
    fn list_policy_by_type() {
        assert!(MainType::Post.supports_list());
        assert!(MainType::NewPost.supports_list());
        assert!(!MainType::Email.supports_list());
        assert!(!MainType::EmailName.supports_list());
        assert!(!MainType::Ssm.supports_list());
    }
}
