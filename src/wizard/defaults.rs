//! Default flag pre-selection.

use crate::wizard::flags::FlagDescriptor;

/// Switches pre-checked in the flag-selection menu, in catalog order.
///
/// A flag is included when it is required, declares `default: true`, or its
/// switch / long name appears in `always` (e.g. `["json", "-u"]`).
pub fn select_defaults(flags: &[FlagDescriptor], always: &[String]) -> Vec<String> {
    flags
        .iter()
        .filter(|f| {
            f.required
                || f.defaults_true()
                || always.iter().any(|a| *a == f.switch || *a == f.long_key)
        })
        .map(|f| f.switch.clone())
        .collect()
}
