//! Canadian-market trim names by make, in authoring order.
//!
//! Order matters: the substring matcher walks this table top to bottom.

pub(super) const OTHER_TRIMS: &[&str] = &[
    "Base", "Standard", "S", "SE", "SEL", "LE", "LX", "EX", "GT", "Sport", "Limited",
    "Premium", "Luxury", "Platinum", "Touring",
];

pub(super) const BUILTIN_TRIMS: &[(&str, &[&str])] = &[
    ("Acura", &["A-Spec", "Base", "Elite", "Platinum Elite", "Tech", "Type S"]),
    ("Audi", &["Komfort", "Progressiv", "Technik", "S line", "RS"]),
    ("BMW", &["xDrive", "sDrive", "M Sport", "M Performance", "Competition"]),
    ("Buick", &["Preferred", "Essence", "Avenir", "Sport Touring"]),
    ("Cadillac", &["Luxury", "Premium Luxury", "Sport", "Platinum", "V-Series"]),
    (
        "Chevrolet",
        &["LS", "LT", "LTZ", "RS", "Premier", "High Country", "Trail Boss", "ZR2", "Custom", "Z71"],
    ),
    ("Chrysler", &["Touring", "Touring L", "Limited", "Pinnacle", "S"]),
    ("Dodge", &["SXT", "GT", "R/T", "Scat Pack", "SRT", "Hellcat", "Citadel"]),
    (
        "Ford",
        &[
            "XL", "XLT", "Lariat", "King Ranch", "Platinum", "Limited", "Raptor", "Tremor", "SE",
            "SEL", "ST", "ST-Line", "Titanium", "Active", "Outer Banks", "Badlands", "Big Bend",
            "Wildtrak", "GT", "EcoBoost", "Mach 1", "Timberline",
        ],
    ),
    ("GMC", &["Pro", "SLE", "SLT", "Elevation", "AT4", "AT4X", "Denali", "Denali Ultimate"]),
    (
        "Honda",
        &[
            "DX", "LX", "EX", "EX-L", "Sport", "Touring", "Si", "Type R", "SE", "Black Edition",
            "TrailSport",
        ],
    ),
    (
        "Hyundai",
        &["Essential", "Preferred", "Luxury", "Ultimate", "Trend", "N Line", "N", "Urban"],
    ),
    ("Infiniti", &["Pure", "Luxe", "Essential", "Sensory", "Autograph", "ProACTIVE"]),
    (
        "Jeep",
        &["Sport", "Sport S", "North", "Altitude", "Limited", "Trailhawk", "Overland", "Summit", "Rubicon", "Sahara"],
    ),
    ("Kia", &["LX", "EX", "EX Premium", "SX", "SX Limited", "GT-Line", "X-Line"]),
    ("Land Rover", &["S", "SE", "HSE", "Dynamic", "Autobiography", "First Edition"]),
    ("Lexus", &["Premium", "Luxury", "Executive", "F Sport", "F Sport Series 1", "F Sport Series 2"]),
    ("Lincoln", &["Select", "Reserve", "Black Label", "Grand Touring"]),
    ("Mazda", &["GX", "GS", "GT", "Signature", "Kuro", "Sport Design", "Suna"]),
    (
        "Mercedes-Benz",
        &["Avantgarde", "Exclusive", "AMG Line", "4MATIC", "AMG", "Night Edition"],
    ),
    ("Mitsubishi", &["ES", "SE", "LE", "GT", "SEL", "Noir"]),
    ("Nissan", &["S", "SV", "SL", "SR", "Platinum", "PRO-4X", "Midnight Edition"]),
    ("Ram", &["Tradesman", "Big Horn", "Sport", "Rebel", "Laramie", "Limited", "TRX", "Power Wagon"]),
    ("Subaru", &["Convenience", "Touring", "Sport", "Limited", "Premier", "Wilderness", "Onyx"]),
    ("Tesla", &["Standard Range", "Long Range", "Performance", "Plaid"]),
    (
        "Toyota",
        &[
            "CE", "L", "LE", "XLE", "SE", "XSE", "Limited", "Platinum", "TRD Off-Road", "TRD Pro",
            "Nightshade", "Woodland",
        ],
    ),
    (
        "Volkswagen",
        &["Trendline", "Comfortline", "Highline", "Execline", "GTI", "R", "Autobahn"],
    ),
    ("Volvo", &["Core", "Plus", "Ultimate", "Momentum", "Inscription", "R-Design"]),
    ("Other", OTHER_TRIMS),
];

/// Alternate spellings that listings use for catalog makes.
pub(super) const MAKE_ALIASES: &[(&str, &str)] = &[
    ("Chevy", "Chevrolet"),
    ("VW", "Volkswagen"),
    ("Mercedes", "Mercedes-Benz"),
    ("Benz", "Mercedes-Benz"),
    ("Range Rover", "Land Rover"),
];
