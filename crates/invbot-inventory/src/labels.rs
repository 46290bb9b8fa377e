//! Human-readable names for upstream facet codes.
//!
//! Unknown codes come back unchanged.

pub(crate) fn paint(code: &str) -> &str {
    match code {
        "PREMIUM_BLACK" | "BLACK" | "SOLID_BLACK" => "Black",
        "PREMIUM_WHITE" | "WHITE" | "PEARL" => "Pearl White",
        "STEALTH_GREY" => "Stealth Grey",
        "ULTRA_RED" | "RED" => "Ultra Red",
        "DEEP_BLUE" | "BLUE" => "Deep Blue",
        "MIDNIGHT_SILVER" => "Midnight Silver",
        "QUICKSILVER" => "Quicksilver",
        "SILVER" => "Silver",
        "GREY" => "Grey",
        other => other,
    }
}

pub(crate) fn interior(code: &str) -> &str {
    match code {
        "PREMIUM_BLACK" => "Black Premium",
        "PREMIUM_WHITE" => "White Premium",
        "BLACK" => "Black",
        "WHITE" => "White",
        "CREAM" => "Cream",
        other => other,
    }
}

pub(crate) fn wheels(code: &str) -> &str {
    match code {
        "NINETEEN" => "19\" Crossflow",
        "TWENTY" | "INDUCTION" => "20\" Induction",
        "TWENTY_ONE" => "21\" Überturbine",
        "PHOTON" => "19\" Photon",
        other => other,
    }
}
