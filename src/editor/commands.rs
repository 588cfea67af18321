use serde::{Deserialize, Serialize};

pub const CONTROL_COMPLETE_POLYGON: &str = "completePolygon";
pub const CONTROL_COPY_POLYGON: &str = "copyPolygon";
pub const CONTROL_RESET: &str = "reset";

/// Actions triggered from UI controls rather than from the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiAction {
    #[serde(rename = "completePolygon")]
    CompletePolygon,
    #[serde(rename = "copyPolygon")]
    CopyPolygon,
    #[serde(rename = "reset")]
    Reset,
}

impl UiAction {
    pub const ALL: [UiAction; 3] = [
        UiAction::CompletePolygon,
        UiAction::CopyPolygon,
        UiAction::Reset,
    ];

    pub fn control_id(self) -> &'static str {
        match self {
            UiAction::CompletePolygon => CONTROL_COMPLETE_POLYGON,
            UiAction::CopyPolygon => CONTROL_COPY_POLYGON,
            UiAction::Reset => CONTROL_RESET,
        }
    }

    pub fn from_control_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.control_id() == id)
    }
}

impl std::fmt::Display for UiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.control_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_ids_resolve_to_actions() {
        assert_eq!(
            UiAction::from_control_id("completePolygon"),
            Some(UiAction::CompletePolygon)
        );
        assert_eq!(UiAction::from_control_id("copyPolygon"), Some(UiAction::CopyPolygon));
        assert_eq!(UiAction::from_control_id("reset"), Some(UiAction::Reset));
        assert_eq!(UiAction::from_control_id("undo"), None);
    }

    #[test]
    fn serde_uses_control_ids() {
        let encoded = serde_json::to_string(&UiAction::CopyPolygon).expect("serialize action");
        assert_eq!(encoded, "\"copyPolygon\"");

        let decoded: UiAction = serde_json::from_str("\"reset\"").expect("decode action");
        assert_eq!(decoded, UiAction::Reset);
    }
}
