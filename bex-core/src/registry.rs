//! Module type registry - maps Phoenix module type codes to names.

/// Known module type codes and their descriptive names.
///
/// The `tcpa_*` entries relate to TCPA (Trusted Computing) modules whose
/// exact purpose is not fully understood; the names keep that uncertainty
/// visible in the output filenames.
pub const MODULE_NAMES: &[(u8, &str)] = &[
    (b'A', "acpi"),
    (b'B', "bioscode"),
    (b'C', "update"),
    (b'D', "display"),
    (b'E', "setup"),
    (b'F', "font"),
    (b'G', "decompcode"),
    (b'I', "bootblock"),
    (b'L', "logo"),
    (b'M', "miser"),
    (b'N', "rompilotload"),
    (b'O', "network"),
    (b'P', "rompilotinit"),
    (b'R', "oprom"),
    (b'S', "strings"),
    (b'T', "template"),
    (b'U', "user"),
    (b'X', "romexec"),
    (b'W', "wav"),
    (b'H', "tcpa_H"),
    (b'K', "tcpa_K"),
    (b'Q', "tcpa_Q"),
    (b'<', "tcpa_<"),
    (b'*', "tcpa_*"),
    (b'?', "tcpa_?"),
    (b'J', "SmartCardPAS"),
];

/// Look up the descriptive name for a module type code.
///
/// Exact match only; unregistered codes return `None` and the caller falls
/// back to hex naming.
pub fn module_name(type_code: u8) -> Option<&'static str> {
    MODULE_NAMES
        .iter()
        .find(|(code, _)| *code == type_code)
        .map(|(_, name)| *name)
}
