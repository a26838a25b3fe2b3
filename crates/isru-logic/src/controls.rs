//! Player-facing converter controls, derived from config and state.
//!
//! Nothing here mutates state implicitly: visibility of the activate and
//! deactivate actions is computed on demand, and always-on converters are
//! enabled by [`ConverterState::is_enabled`] rather than by forcing a flag.

use serde::{Deserialize, Serialize};

use crate::converter::ConverterConfig;
use crate::state::{ConverterState, ConverterStatus};

/// Labels and visibility of the converter's actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterControls {
    pub activate_label: String,
    pub deactivate_label: String,
    pub toggle_label: String,
    pub show_activate: bool,
    pub show_deactivate: bool,
}

pub fn controls(config: &ConverterConfig, state: &ConverterState) -> ConverterControls {
    let enabled = state.is_enabled(config);
    ConverterControls {
        activate_label: format!("Activate {}", config.name),
        deactivate_label: format!("Deactivate {}", config.name),
        toggle_label: format!("Toggle {}", config.name),
        show_activate: !config.always_on && !enabled,
        show_deactivate: !config.always_on && enabled,
    }
}

/// Set the enabled flag. Always-on converters ignore the request.
pub fn set_enabled(config: &ConverterConfig, state: &mut ConverterState, enabled: bool) {
    if config.always_on {
        return;
    }
    state.enabled = enabled;
    if !enabled {
        state.status = ConverterStatus::Inactive;
    }
}

pub fn toggle(config: &ConverterConfig, state: &mut ConverterState) {
    let enabled = !state.enabled;
    set_enabled(config, state, enabled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterDefinition;
    use crate::resources::ResourceLibrary;

    fn config(always_on: bool) -> ConverterConfig {
        let def = ConverterDefinition {
            converter_name: "Electrolyzer".to_string(),
            always_on,
            ..ConverterDefinition::default()
        };
        ConverterConfig::from_definition(&def, &ResourceLibrary::stock())
    }

    #[test]
    fn test_labels_use_converter_name() {
        let c = controls(&config(false), &ConverterState::new());
        assert_eq!(c.activate_label, "Activate Electrolyzer");
        assert_eq!(c.deactivate_label, "Deactivate Electrolyzer");
        assert_eq!(c.toggle_label, "Toggle Electrolyzer");
    }

    #[test]
    fn test_visibility_follows_enabled() {
        let cfg = config(false);
        let mut state = ConverterState::new();
        let c = controls(&cfg, &state);
        assert!(c.show_activate && !c.show_deactivate);

        toggle(&cfg, &mut state);
        let c = controls(&cfg, &state);
        assert!(!c.show_activate && c.show_deactivate);
    }

    #[test]
    fn test_disable_sets_inactive_status() {
        let cfg = config(false);
        let mut state = ConverterState::new();
        set_enabled(&cfg, &mut state, true);
        state.status = ConverterStatus::Running;
        set_enabled(&cfg, &mut state, false);
        assert_eq!(state.status, ConverterStatus::Inactive);
    }

    #[test]
    fn test_always_on_hides_actions_and_stays_enabled() {
        let cfg = config(true);
        let mut state = ConverterState::new();
        assert!(state.is_enabled(&cfg));
        toggle(&cfg, &mut state);
        set_enabled(&cfg, &mut state, false);
        assert!(state.is_enabled(&cfg));
        let c = controls(&cfg, &state);
        assert!(!c.show_activate && !c.show_deactivate);
    }
}
