use crate::submenu::SubmenuItem;
use serde::{Deserialize, Serialize};

/// Push messages sent by the host without a preceding request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "messageType", content = "data")]
pub enum HostEvent {
    #[serde(rename = "refreshSubmenuItems")]
    RefreshSubmenuItems,
    #[serde(rename = "updateSubmenuItems", rename_all = "camelCase")]
    UpdateSubmenuItems {
        provider: String,
        submenu_items: Vec<SubmenuItem>,
    },
    #[serde(rename = "jetbrains/isOSREnabled")]
    IsOsrEnabled(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_host_messages() {
        let refresh: HostEvent =
            serde_json::from_str(r#"{"messageType":"refreshSubmenuItems"}"#).unwrap();
        assert_eq!(refresh, HostEvent::RefreshSubmenuItems);

        let update: HostEvent = serde_json::from_str(
            r#"{"messageType":"updateSubmenuItems","data":{"provider":"docs","submenuItems":[]}}"#,
        )
        .unwrap();
        assert_eq!(
            update,
            HostEvent::UpdateSubmenuItems {
                provider: "docs".to_string(),
                submenu_items: vec![],
            }
        );

        let osr: HostEvent =
            serde_json::from_str(r#"{"messageType":"jetbrains/isOSREnabled","data":true}"#)
                .unwrap();
        assert_eq!(osr, HostEvent::IsOsrEnabled(true));
    }
}
