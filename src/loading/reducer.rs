use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Action tag that drives the loading flag
pub const SET_LOADING: &str = "SET_LOADING";

/// Loading indicator state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoadingState {
    #[schema(example = false)]
    pub loading: bool,
}

/// Action object as sent by clients: `{ "type": "SET_LOADING", "payload": true }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DispatchedAction {
    #[serde(rename = "type")]
    #[schema(example = "SET_LOADING")]
    pub action_type: String,
    #[schema(example = true)]
    pub payload: bool,
}

/// Actions the reducer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingAction {
    SetLoading(bool),
    /// Any other tag; leaves the state untouched
    Unrecognized,
}

impl From<&DispatchedAction> for LoadingAction {
    fn from(action: &DispatchedAction) -> Self {
        if action.action_type == SET_LOADING {
            LoadingAction::SetLoading(action.payload)
        } else {
            LoadingAction::Unrecognized
        }
    }
}

impl From<DispatchedAction> for LoadingAction {
    fn from(action: DispatchedAction) -> Self {
        LoadingAction::from(&action)
    }
}

/// Compute the next state
///
/// Copies the previous state and overwrites only `loading`, so fields added
/// later carry over unchanged.
pub fn reduce(state: LoadingState, action: LoadingAction) -> LoadingState {
    match action {
        LoadingAction::SetLoading(loading) => {
            let mut next = state;
            next.loading = loading;
            next
        }
        LoadingAction::Unrecognized => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn action(action_type: &str, payload: bool) -> DispatchedAction {
        DispatchedAction {
            action_type: action_type.to_string(),
            payload,
        }
    }

    #[test]
    fn test_initial_state_is_not_loading() {
        assert_eq!(LoadingState::default(), LoadingState { loading: false });
    }

    #[test]
    fn test_set_loading_sequence() {
        let state = LoadingState::default();

        let state = reduce(state, action("SET_LOADING", true).into());
        assert_eq!(state, LoadingState { loading: true });

        let state = reduce(state, action("SET_LOADING", false).into());
        assert_eq!(state, LoadingState { loading: false });
    }

    #[test]
    fn test_other_action_is_ignored() {
        let state = LoadingState { loading: false };
        assert_eq!(reduce(state, action("OTHER", true).into()), state);
    }

    #[test]
    fn test_tag_is_case_sensitive() {
        assert_eq!(
            LoadingAction::from(action("set_loading", true)),
            LoadingAction::Unrecognized
        );
    }

    #[test]
    fn test_action_wire_format() {
        let parsed: DispatchedAction =
            serde_json::from_str(r#"{"type":"SET_LOADING","payload":true}"#).unwrap();

        assert_eq!(parsed.action_type, SET_LOADING);
        assert_eq!(LoadingAction::from(parsed), LoadingAction::SetLoading(true));
    }

    proptest! {
        #[test]
        fn prop_unrecognized_actions_are_identity(
            loading in any::<bool>(),
            payload in any::<bool>(),
            tag in "[A-Z_]{1,20}"
        ) {
            prop_assume!(tag != SET_LOADING);
            let state = LoadingState { loading };
            prop_assert_eq!(reduce(state, action(&tag, payload).into()), state);
        }

        #[test]
        fn prop_set_loading_takes_payload(loading in any::<bool>(), payload in any::<bool>()) {
            let next = reduce(LoadingState { loading }, LoadingAction::SetLoading(payload));
            prop_assert_eq!(next.loading, payload);
        }
    }
}
