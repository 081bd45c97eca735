//! Content-stream operator mnemonics.
//!
//! Operators are resolved once at lex time so the interpreter dispatches
//! over an enum instead of comparing strings per operator.

use smol_str::SmolStr;

/// Content-stream operator. Known operators are zero-allocation variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Operator {
    // Graphics state
    Q,  // restore (uppercase Q)
    Qq, // save (lowercase q)
    Cm, // concat matrix
    Ww, // line width (lowercase w)
    J,  // line cap (uppercase J)
    Jj, // line join (lowercase j)
    M,  // miter limit
    D,  // dash pattern
    Ri, // rendering intent
    I,  // flatness
    Gs, // graphics state dict

    // Path construction
    Mm, // moveto (lowercase m)
    L,  // lineto
    C,  // curveto
    V,
    Y,
    H,  // closepath
    Re, // rectangle

    // Path painting
    S,      // stroke (uppercase)
    Ss,     // close+stroke (lowercase s)
    F,      // fill (uppercase, obsolete)
    Ff,     // fill (lowercase f)
    FStar,  // f*
    FFStar, // F* (obsolete spelling of f*)
    B,      // fill+stroke
    BStar,  // B*
    Bb,     // close+fill+stroke (lowercase b)
    BbStar, // b*
    N,      // end path

    // Clipping
    WClip, // W
    WStar, // W*

    // Text object
    BT,
    ET,

    // Text state
    Tc,
    Tw,
    Tz,
    TL,
    Tf,
    Tr,
    Ts,

    // Text positioning
    Td,
    TD,
    Tm,
    TStar, // T*

    // Text showing
    Tj,
    TJ,
    Quote,       // '
    DoubleQuote, // "

    // Color
    CS,
    Cs, // lowercase
    SC,
    SCN,
    Sc,  // lowercase
    Scn, // lowercase
    G,
    Gg, // lowercase g
    RG,
    Rg, // lowercase
    K,
    Kk, // lowercase k

    // XObject and shading
    Do,
    Sh,

    // Inline image
    BI,
    ID,
    EI,

    // Marked content
    MP,
    DP,
    BMC,
    BDC,
    EMC,

    // Type 3 glyph metrics
    D0,
    D1,

    // Compatibility section
    BX,
    EX,

    /// Anything not in the table above.
    Unknown(SmolStr),
}

impl Operator {
    pub fn from_bytes(b: &[u8]) -> Self {
        match b {
            // Graphics state
            b"Q" => Operator::Q,
            b"q" => Operator::Qq,
            b"cm" => Operator::Cm,
            b"w" => Operator::Ww,
            b"J" => Operator::J,
            b"j" => Operator::Jj,
            b"M" => Operator::M,
            b"d" => Operator::D,
            b"ri" => Operator::Ri,
            b"i" => Operator::I,
            b"gs" => Operator::Gs,

            // Path construction
            b"m" => Operator::Mm,
            b"l" => Operator::L,
            b"c" => Operator::C,
            b"v" => Operator::V,
            b"y" => Operator::Y,
            b"h" => Operator::H,
            b"re" => Operator::Re,

            // Path painting
            b"S" => Operator::S,
            b"s" => Operator::Ss,
            b"F" => Operator::F,
            b"f" => Operator::Ff,
            b"f*" => Operator::FStar,
            b"F*" => Operator::FFStar,
            b"B" => Operator::B,
            b"B*" => Operator::BStar,
            b"b" => Operator::Bb,
            b"b*" => Operator::BbStar,
            b"n" => Operator::N,

            // Clipping (uppercase W)
            b"W" => Operator::WClip,
            b"W*" => Operator::WStar,

            // Text object
            b"BT" => Operator::BT,
            b"ET" => Operator::ET,

            // Text state
            b"Tc" => Operator::Tc,
            b"Tw" => Operator::Tw,
            b"Tz" => Operator::Tz,
            b"TL" => Operator::TL,
            b"Tf" => Operator::Tf,
            b"Tr" => Operator::Tr,
            b"Ts" => Operator::Ts,

            // Text positioning
            b"Td" => Operator::Td,
            b"TD" => Operator::TD,
            b"Tm" => Operator::Tm,
            b"T*" => Operator::TStar,

            // Text showing
            b"Tj" => Operator::Tj,
            b"TJ" => Operator::TJ,
            b"'" => Operator::Quote,
            b"\"" => Operator::DoubleQuote,

            // Color
            b"CS" => Operator::CS,
            b"cs" => Operator::Cs,
            b"SC" => Operator::SC,
            b"SCN" => Operator::SCN,
            b"sc" => Operator::Sc,
            b"scn" => Operator::Scn,
            b"G" => Operator::G,
            b"g" => Operator::Gg,
            b"RG" => Operator::RG,
            b"rg" => Operator::Rg,
            b"K" => Operator::K,
            b"k" => Operator::Kk,

            b"Do" => Operator::Do,
            b"sh" => Operator::Sh,

            // Inline image
            b"BI" => Operator::BI,
            b"ID" => Operator::ID,
            b"EI" => Operator::EI,

            // Marked content
            b"MP" => Operator::MP,
            b"DP" => Operator::DP,
            b"BMC" => Operator::BMC,
            b"BDC" => Operator::BDC,
            b"EMC" => Operator::EMC,

            b"d0" => Operator::D0,
            b"d1" => Operator::D1,
            b"BX" => Operator::BX,
            b"EX" => Operator::EX,

            other => Operator::Unknown(SmolStr::new(String::from_utf8_lossy(other))),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Q => "Q",
            Operator::Qq => "q",
            Operator::Cm => "cm",
            Operator::Ww => "w",
            Operator::J => "J",
            Operator::Jj => "j",
            Operator::M => "M",
            Operator::D => "d",
            Operator::Ri => "ri",
            Operator::I => "i",
            Operator::Gs => "gs",
            Operator::Mm => "m",
            Operator::L => "l",
            Operator::C => "c",
            Operator::V => "v",
            Operator::Y => "y",
            Operator::H => "h",
            Operator::Re => "re",
            Operator::S => "S",
            Operator::Ss => "s",
            Operator::F => "F",
            Operator::Ff => "f",
            Operator::FStar => "f*",
            Operator::FFStar => "F*",
            Operator::B => "B",
            Operator::BStar => "B*",
            Operator::Bb => "b",
            Operator::BbStar => "b*",
            Operator::N => "n",
            Operator::WClip => "W",
            Operator::WStar => "W*",
            Operator::BT => "BT",
            Operator::ET => "ET",
            Operator::Tc => "Tc",
            Operator::Tw => "Tw",
            Operator::Tz => "Tz",
            Operator::TL => "TL",
            Operator::Tf => "Tf",
            Operator::Tr => "Tr",
            Operator::Ts => "Ts",
            Operator::Td => "Td",
            Operator::TD => "TD",
            Operator::Tm => "Tm",
            Operator::TStar => "T*",
            Operator::Tj => "Tj",
            Operator::TJ => "TJ",
            Operator::Quote => "'",
            Operator::DoubleQuote => "\"",
            Operator::CS => "CS",
            Operator::Cs => "cs",
            Operator::SC => "SC",
            Operator::SCN => "SCN",
            Operator::Sc => "sc",
            Operator::Scn => "scn",
            Operator::G => "G",
            Operator::Gg => "g",
            Operator::RG => "RG",
            Operator::Rg => "rg",
            Operator::K => "K",
            Operator::Kk => "k",
            Operator::Do => "Do",
            Operator::Sh => "sh",
            Operator::BI => "BI",
            Operator::ID => "ID",
            Operator::EI => "EI",
            Operator::MP => "MP",
            Operator::DP => "DP",
            Operator::BMC => "BMC",
            Operator::BDC => "BDC",
            Operator::EMC => "EMC",
            Operator::D0 => "d0",
            Operator::D1 => "d1",
            Operator::BX => "BX",
            Operator::EX => "EX",
            Operator::Unknown(name) => name.as_str(),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
