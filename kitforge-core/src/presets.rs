use serde_json::json;

use crate::kit::Node;

/// Where the stock AI loadouts live, relative to the content checkout.
pub const LOADOUTS_ROOT: &str = "GroundBranch/Content/GroundBranch/AI/Loadouts";

/// Staging folder the substitution pass runs over by default.
pub const PROCESSING_ROOT: &str = "GroundBranch/Content/GroundBranch/AI/Loadouts/Processing";

/// `(Type, Item, Skin)` overrides making up one variation.
pub(crate) type PresetVariation = &'static [(&'static str, &'static str, &'static str)];

pub(crate) const STANDARD_VARIATIONS: &[PresetVariation] = &[
    // 1
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp", "Green")],
    // 2
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp", "Red")],
    // 3
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp", "Tan")],
    // 4
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp_Plain", "Black")],
    // 5
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp_Plain", "Navy")],
    // 6
    &[
        ("Shirt", "Shirt:BP_Shirt_Under", "Red"),
        ("Pants", "Pants:BP_Pants_Jeans", "Blue"),
    ],
    // 7
    &[
        ("Shirt", "Shirt:BP_Shirt_Under", "Navy"),
        ("Pants", "Pants:BP_Pants_Jeans", "Blue"),
    ],
    // 8
    &[
        ("Shirt", "Shirt:BP_Shirt_Under", "Khaki"),
        ("Pants", "Pants:BP_Pants_Jeans", "Blue"),
    ],
];

pub(crate) const HVT_VARIATIONS: &[PresetVariation] = &[
    // 1
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp_Plain", "Black")],
    // 2
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp", "Tan")],
];

// Older Narcos set with black jeans instead of blue.
pub(crate) const DARK_PANTS_VARIATIONS: &[PresetVariation] = &[
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp", "Green")],
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp", "Red")],
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp", "Tan")],
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp_Plain", "Grey")],
    &[("Shirt", "Shirt:BP_Shirt_ButtonUp_Plain", "Navy")],
    &[
        ("Shirt", "Shirt:BP_Shirt_ButtonUp", "Green"),
        ("Pants", "Pants:BP_Pants_Jeans", "Black"),
    ],
    &[
        ("Shirt", "Shirt:BP_Shirt_ButtonUp_Plain", "Grey"),
        ("Pants", "Pants:BP_Pants_Jeans", "Black"),
    ],
    &[
        ("Shirt", "Shirt:BP_Shirt_ButtonUp", "Tan"),
        ("Pants", "Pants:BP_Pants_Jeans", "Black"),
    ],
];

pub(crate) const PRESET_SETS: &[(&str, &[PresetVariation])] = &[
    ("standard", STANDARD_VARIATIONS),
    ("hvt", HVT_VARIATIONS),
    ("dark_pants", DARK_PANTS_VARIATIONS),
];

/// `(template prefix, variation set)` pairs of the stock plan, relative to
/// [`LOADOUTS_ROOT`].
pub(crate) const BUILTIN_JOBS: &[(&str, &str)] = &[
    ("Narcos/Civ", "standard"),
    ("Narcos/Tango_AR", "standard"),
    ("Narcos/Tango_SMG", "standard"),
    ("Narcos/Tango_SNP", "standard"),
    ("Narcos/Tango_STG", "standard"),
    ("Narcos/Tango_HDG", "standard"),
    ("Narcos/HVT_AR", "hvt"),
];

pub(crate) const BUILTIN_SUBSTITUTIONS: &[(&str, fn() -> Node)] = &[
    ("PrimaryFirearm:BP_SVD_63", ak74_kashtan),
    ("Head:BP_Rebel_Head_01", rebel_head_02),
];

fn ak74_kashtan() -> Node {
    Node::new("PrimaryFirearm")
        .with_item("PrimaryFirearm:BP_AK74")
        .with_attribute(
            "Children",
            json!([
                {
                    "Item": "Magazine:BP_AK545_Magazine",
                    "Well": "MagWell_AK545"
                },
                {
                    "Item": "Sight:BP_1P78_Kashtan_Scope",
                    "Comp": "FirearmMeshComponent0"
                }
            ]),
        )
}

fn rebel_head_02() -> Node {
    Node::new("Head").with_item("Head:BP_Rebel_Head_02")
}
