use serde::{Deserialize, Serialize};

pub const CONFY_APP_NAME: &str = "catalog360";
const CONFY_PREFERENCES: &str = "preferences";

/// The only persisted UI state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Shows purchase cost, margin and payment options in the product dialog.
    pub internal_mode: bool,
}

impl Preferences {
    pub fn load() -> Self {
        match confy::load(CONFY_APP_NAME, CONFY_PREFERENCES) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("preferences unreadable, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, CONFY_PREFERENCES, self) {
            log::error!("cannot save preferences: {e}");
        }
    }

    pub fn set_internal_mode(&mut self, enabled: bool) {
        if self.internal_mode != enabled {
            self.internal_mode = enabled;
            self.save();
        }
    }
}
